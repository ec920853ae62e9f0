use super::board::{BOARD_SIZE, BoardSnapshot};
use super::types::{Mark, MoveError, Position};

/// Checks a raw human move against a snapshot of the board. Coordinates
/// arrive 1-based from the console and may be any integer; a valid move
/// comes back as a 0-based [`Position`].
pub fn validate_move(
    snapshot: &BoardSnapshot,
    row: i64,
    col: i64,
) -> Result<Position, MoveError> {
    if row < 1 || row > BOARD_SIZE as i64 || col < 1 || col > BOARD_SIZE as i64 {
        return Err(MoveError::OutOfRange { row, col });
    }

    let position = Position::new((row - 1) as usize, (col - 1) as usize);
    if snapshot.get(position.row, position.col) != Mark::Empty {
        return Err(MoveError::CellOccupied {
            row: position.row,
            col: position.col,
        });
    }

    Ok(position)
}
