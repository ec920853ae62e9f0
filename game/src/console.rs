use std::io::Write;

use common::games::tictactoe::{
    BOARD_SIZE, BoardSnapshot, GameConsole, GameStatus, MoveError,
};

/// Reads one line from stdin without holding up the runtime; `None`
/// means end of input.
pub async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}

/// Console frontend for one game. Validation of the entered coordinates
/// is the session's job; this only guarantees integers.
#[derive(Clone)]
pub struct ConsoleIo {
    player_x_label: String,
    player_o_label: String,
    show_coordinates: bool,
}

impl ConsoleIo {
    pub fn new(player_x_label: String, player_o_label: String, show_coordinates: bool) -> Self {
        Self {
            player_x_label,
            player_o_label,
            show_coordinates,
        }
    }

    async fn read_number(&self, prompt: &str) -> i64 {
        loop {
            print!("{}", prompt);
            let _ = std::io::stdout().flush();

            let Some(line) = read_line().await else {
                println!();
                std::process::exit(0);
            };

            match line.trim().parse::<i64>() {
                Ok(value) => return value,
                Err(_) => println!("Please enter a number."),
            }
        }
    }
}

impl GameConsole for ConsoleIo {
    async fn read_move(&self, prompt_label: &str) -> (i64, i64) {
        let row = self
            .read_number(&format!(
                "{}: enter the row number (1-{}): ",
                prompt_label, BOARD_SIZE
            ))
            .await;
        let col = self
            .read_number(&format!(
                "{}: enter the column number (1-{}): ",
                prompt_label, BOARD_SIZE
            ))
            .await;
        (row, col)
    }

    fn report_invalid_move(&self, error: &MoveError) {
        match error {
            MoveError::OutOfRange { .. } => {
                println!("Invalid position! Please enter values within the valid range.");
            }
            MoveError::CellOccupied { .. } => {
                println!("Invalid move! That cell is already occupied.");
            }
        }
    }

    fn render_board(&self, snapshot: &BoardSnapshot) {
        if self.show_coordinates {
            println!("   1   2   3");
        }
        for row in 0..BOARD_SIZE {
            if row > 0 {
                if self.show_coordinates {
                    println!("  ---|---|---");
                } else {
                    println!("---|---|---");
                }
            }
            let guide = if self.show_coordinates {
                format!("{} ", row + 1)
            } else {
                String::new()
            };
            println!(
                "{} {} | {} | {} ",
                guide,
                snapshot.get(row, 0).glyph(),
                snapshot.get(row, 1).glyph(),
                snapshot.get(row, 2).glyph()
            );
        }
        println!();
    }

    fn announce_result(&self, status: GameStatus) {
        match status {
            GameStatus::XWon => println!("{} (X) wins!", self.player_x_label),
            GameStatus::OWon => println!("{} (O) wins!", self.player_o_label),
            GameStatus::Draw => println!("It's a draw!"),
            GameStatus::InProgress => {}
        }
    }
}
