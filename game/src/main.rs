mod config;
mod console;

use std::io::Write;

use clap::Parser;
use common::games::tictactoe::{GameMode, GameSessionConfig, run_session};
use common::{log, logger};

use config::Config;
use console::ConsoleIo;

#[derive(Parser)]
#[command(name = "tictactoe_game")]
struct Args {
    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("TicTacToe".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config = match config::get_config_manager().get_config() {
        Ok(config) => config,
        Err(e) => {
            log!("Failed to load config, falling back to defaults: {}", e);
            Config::default()
        }
    };

    loop {
        println!("Choose a game mode:");
        println!("1. Single Player");
        println!("2. Two Players");
        println!("3. Exit");
        print!("Option: ");
        let _ = std::io::stdout().flush();

        let Some(line) = console::read_line().await else {
            println!();
            break;
        };

        match line.trim().parse::<u32>() {
            Ok(1) => play(GameMode::SinglePlayer, &config).await,
            Ok(2) => play(GameMode::TwoPlayer, &config).await,
            Ok(3) => {
                println!("Exiting the game.");
                break;
            }
            _ => println!("Invalid option. Please choose an option between 1 and 3."),
        }
    }
}

async fn play(mode: GameMode, config: &Config) {
    let (mode_name, player_o_label) = match mode {
        GameMode::SinglePlayer => ("Single Player", config.players.computer_name.clone()),
        GameMode::TwoPlayer => ("Two Players", config.players.player_two_name.clone()),
    };

    println!("Game mode: {}", mode_name);
    println!(
        "{} (X) plays against {} (O).",
        config.players.player_one_name, player_o_label
    );

    let console = ConsoleIo::new(
        config.players.player_one_name.clone(),
        player_o_label.clone(),
        config.board.show_coordinates,
    );
    let session_config = GameSessionConfig {
        mode,
        player_one_label: config.players.player_one_name.clone(),
        player_two_label: player_o_label,
    };

    match run_session(session_config, console).await {
        Ok(status) => log!("Game finished: {:?}", status),
        Err(error) => log!("Game aborted: {}", error),
    }
}
