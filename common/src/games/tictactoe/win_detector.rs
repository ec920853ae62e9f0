use super::board::{BOARD_SIZE, BoardSnapshot};
use super::types::{GameStatus, Mark};

/// The termination oracle. Used by the live session after every applied
/// move and by the search at every explored node.
pub fn evaluate(snapshot: &BoardSnapshot) -> GameStatus {
    if let Some(mark) = check_win(snapshot) {
        return match mark {
            Mark::X => GameStatus::XWon,
            Mark::O => GameStatus::OWon,
            Mark::Empty => unreachable!(),
        };
    }

    if snapshot.is_full() {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}

/// Rows first, then columns, then the two diagonals.
pub fn check_win(snapshot: &BoardSnapshot) -> Option<Mark> {
    check_rows(snapshot)
        .or_else(|| check_columns(snapshot))
        .or_else(|| check_diagonals(snapshot))
}

fn check_rows(snapshot: &BoardSnapshot) -> Option<Mark> {
    for row in 0..BOARD_SIZE {
        let mark = snapshot.get(row, 0);
        if mark != Mark::Empty
            && snapshot.get(row, 1) == mark
            && snapshot.get(row, 2) == mark
        {
            return Some(mark);
        }
    }
    None
}

fn check_columns(snapshot: &BoardSnapshot) -> Option<Mark> {
    for col in 0..BOARD_SIZE {
        let mark = snapshot.get(0, col);
        if mark != Mark::Empty
            && snapshot.get(1, col) == mark
            && snapshot.get(2, col) == mark
        {
            return Some(mark);
        }
    }
    None
}

fn check_diagonals(snapshot: &BoardSnapshot) -> Option<Mark> {
    let center = snapshot.get(1, 1);
    if center == Mark::Empty {
        return None;
    }

    if snapshot.get(0, 0) == center && snapshot.get(2, 2) == center {
        return Some(center);
    }
    if snapshot.get(0, 2) == center && snapshot.get(2, 0) == center {
        return Some(center);
    }
    None
}
