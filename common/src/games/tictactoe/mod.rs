mod board;
mod bot_controller;
mod session;
mod types;
mod validate;
mod win_detector;

pub use board::{BOARD_SIZE, Board, BoardSnapshot};
pub use bot_controller::calculate_best_move;
pub use session::{
    GameConsole, GameMode, GameSessionConfig, SessionError, TurnActor, TurnCoordinator,
    run_session,
};
pub use types::{GameStatus, Mark, MoveError, Position, SearchError};
pub use validate::validate_move;
pub use win_detector::{check_win, evaluate};
