use super::board::BoardSnapshot;
use super::types::{GameStatus, Mark, Position, SearchError};
use super::win_detector::evaluate;

/// Game-theoretically optimal move for `for_mark`, found by exhaustive
/// depth-first minimax over a private copy of the snapshot. Candidate
/// cells are tried in row-major order and ties keep the first candidate
/// encountered. The 3x3 tree is small enough that no pruning or depth
/// limit is needed.
pub fn calculate_best_move(
    snapshot: &BoardSnapshot,
    for_mark: Mark,
) -> Result<Position, SearchError> {
    let moves = snapshot.available_moves();
    if moves.is_empty() {
        return Err(SearchError::NoLegalMove);
    }

    let mut board = *snapshot;
    let mut best_score = i32::MIN;
    let mut best_move = moves[0];

    for position in moves {
        board.place(position, for_mark);
        let score = minimax(&mut board, for_mark, 0, false);
        board.clear(position);

        if score > best_score {
            best_score = score;
            best_move = position;
        }
    }

    Ok(best_move)
}

/// Wins for `bot_mark` score `10 - depth`, opponent wins `depth - 10`,
/// draws 0, so the engine prefers faster wins and slower losses.
fn minimax(board: &mut BoardSnapshot, bot_mark: Mark, depth: i32, is_maximizing: bool) -> i32 {
    match evaluate(board) {
        status if status.winner() == Some(bot_mark) => return 10 - depth,
        GameStatus::XWon | GameStatus::OWon => return depth - 10,
        GameStatus::Draw => return 0,
        GameStatus::InProgress => {}
    }

    if is_maximizing {
        let mut max_eval = i32::MIN;
        for position in board.available_moves() {
            board.place(position, bot_mark);
            let eval = minimax(board, bot_mark, depth + 1, false);
            board.clear(position);
            max_eval = max_eval.max(eval);
        }
        max_eval
    } else {
        let opponent_mark = bot_mark.opponent().unwrap();
        let mut min_eval = i32::MAX;
        for position in board.available_moves() {
            board.place(position, opponent_mark);
            let eval = minimax(board, bot_mark, depth + 1, true);
            board.clear(position);
            min_eval = min_eval.min(eval);
        }
        min_eval
    }
}
