use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::log;
use super::board::{Board, BoardSnapshot};
use super::bot_controller::calculate_best_move;
use super::types::{GameStatus, Mark, MoveError, Position, SearchError};
use super::validate::validate_move;
use super::win_detector::evaluate;

/// The user-facing collaborator. Prompting, rendering and announcements
/// are opaque services; `read_move` may hand back any integers and the
/// session validates them.
pub trait GameConsole: Send + Sync + Clone + 'static {
    /// 1-based (row, column) pair for the prompted player.
    fn read_move(&self, prompt_label: &str) -> impl Future<Output = (i64, i64)> + Send;

    fn report_invalid_move(&self, error: &MoveError);

    fn render_board(&self, snapshot: &BoardSnapshot);

    fn announce_result(&self, status: GameStatus);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    SinglePlayer,
    TwoPlayer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnActor {
    Human { prompt_label: String },
    Computer,
}

#[derive(Debug, Clone)]
pub struct GameSessionConfig {
    pub mode: GameMode,
    pub player_one_label: String,
    pub player_two_label: String,
}

impl GameSessionConfig {
    /// X is always a human and always moves first; O is the computer in
    /// single-player mode and the second human otherwise.
    pub fn actor_for(&self, mark: Mark) -> TurnActor {
        match (mark, self.mode) {
            (Mark::O, GameMode::SinglePlayer) => TurnActor::Computer,
            (Mark::O, GameMode::TwoPlayer) => TurnActor::Human {
                prompt_label: self.player_two_label.clone(),
            },
            _ => TurnActor::Human {
                prompt_label: self.player_one_label.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    Search(SearchError),
    Apply(MoveError),
    TurnTokenClosed,
    MoveChannelClosed,
    Worker(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Search(e) => write!(f, "Search failed: {}", e),
            SessionError::Apply(e) => write!(f, "Failed to apply move: {}", e),
            SessionError::TurnTokenClosed => write!(f, "Turn token closed"),
            SessionError::MoveChannelClosed => {
                write!(f, "Move channel closed before a move was produced")
            }
            SessionError::Worker(message) => write!(f, "Actor task failed: {}", message),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<SearchError> for SessionError {
    fn from(e: SearchError) -> Self {
        SessionError::Search(e)
    }
}

impl From<MoveError> for SessionError {
    fn from(e: MoveError) -> Self {
        SessionError::Apply(e)
    }
}

/// Owns the live board and runs one turn at a time. Each round the
/// entitled actor runs as its own task: it acquires the single-permit
/// turn token, plans its move against a snapshot, and hands
/// `(Position, permit)` back through a capacity-1 channel. The
/// coordinator is the only writer of the board, and the permit is
/// dropped only after the move is applied, so the entitled-actor role
/// rotates strictly round by round.
pub struct TurnCoordinator {
    board: Board,
    current_mark: Mark,
    turn_token: Arc<Semaphore>,
}

impl TurnCoordinator {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_mark: Mark::X,
            turn_token: Arc::new(Semaphore::new(1)),
        }
    }

    #[cfg(test)]
    fn with_state(board: Board, current_mark: Mark) -> Self {
        Self {
            board,
            current_mark,
            turn_token: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_mark(&self) -> Mark {
        self.current_mark
    }

    pub async fn play_round<C: GameConsole>(
        &mut self,
        actor: &TurnActor,
        console: &C,
    ) -> Result<Position, SessionError> {
        let snapshot = self.board.snapshot();
        let mark = self.current_mark;
        let (move_tx, mut move_rx) = mpsc::channel(1);
        let token = Arc::clone(&self.turn_token);

        let worker = match actor {
            TurnActor::Human { prompt_label } => {
                let console = console.clone();
                let prompt_label = prompt_label.clone();
                tokio::spawn(human_turn(console, token, snapshot, prompt_label, move_tx))
            }
            TurnActor::Computer => tokio::spawn(computer_turn(token, snapshot, mark, move_tx)),
        };

        // The recv is the move-ready signal: a received pair is fully
        // written before it becomes visible here.
        let Some((position, turn_permit)) = move_rx.recv().await else {
            return Err(match worker.await {
                Ok(Err(error)) => error,
                Ok(Ok(())) => SessionError::MoveChannelClosed,
                Err(join_error) => SessionError::Worker(join_error.to_string()),
            });
        };

        self.board
            .set(position.row, position.col, mark)
            .map_err(SessionError::Apply)?;

        // Token release strictly after the apply.
        drop(turn_permit);

        if let Err(join_error) = worker.await {
            return Err(SessionError::Worker(join_error.to_string()));
        }

        self.switch_turn();
        Ok(position)
    }

    fn switch_turn(&mut self) {
        self.current_mark = match self.current_mark {
            Mark::X => Mark::O,
            _ => Mark::X,
        };
    }
}

impl Default for TurnCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

async fn human_turn<C: GameConsole>(
    console: C,
    token: Arc<Semaphore>,
    snapshot: BoardSnapshot,
    prompt_label: String,
    move_tx: mpsc::Sender<(Position, OwnedSemaphorePermit)>,
) -> Result<(), SessionError> {
    let permit = token
        .acquire_owned()
        .await
        .map_err(|_| SessionError::TurnTokenClosed)?;

    loop {
        let (row, col) = console.read_move(&prompt_label).await;
        match validate_move(&snapshot, row, col) {
            Ok(position) => {
                move_tx
                    .send((position, permit))
                    .await
                    .map_err(|_| SessionError::MoveChannelClosed)?;
                return Ok(());
            }
            Err(error) => {
                log!("Rejected move ({}, {}) from {}: {}", row, col, prompt_label, error);
                console.report_invalid_move(&error);
            }
        }
    }
}

async fn computer_turn(
    token: Arc<Semaphore>,
    snapshot: BoardSnapshot,
    mark: Mark,
    move_tx: mpsc::Sender<(Position, OwnedSemaphorePermit)>,
) -> Result<(), SessionError> {
    let permit = token
        .acquire_owned()
        .await
        .map_err(|_| SessionError::TurnTokenClosed)?;

    let search_result = tokio::task::spawn_blocking(move || calculate_best_move(&snapshot, mark))
        .await
        .map_err(|join_error| SessionError::Worker(join_error.to_string()))?;

    let position = search_result?;
    move_tx
        .send((position, permit))
        .await
        .map_err(|_| SessionError::MoveChannelClosed)?;
    Ok(())
}

pub async fn run_session<C: GameConsole>(
    config: GameSessionConfig,
    console: C,
) -> Result<GameStatus, SessionError> {
    run_rounds(TurnCoordinator::new(), config, console).await
}

async fn run_rounds<C: GameConsole>(
    mut coordinator: TurnCoordinator,
    config: GameSessionConfig,
    console: C,
) -> Result<GameStatus, SessionError> {
    log!("Starting {:?} game", config.mode);

    loop {
        let snapshot = coordinator.board().snapshot();
        console.render_board(&snapshot);

        let status = evaluate(&snapshot);
        if status != GameStatus::InProgress {
            log!("Game over: {:?}", status);
            console.announce_result(status);
            return Ok(status);
        }

        let mark = coordinator.current_mark();
        let actor = config.actor_for(mark);
        let position = coordinator.play_round(&actor, &console).await?;
        log!(
            "{:?} placed at ({}, {})",
            mark,
            position.row + 1,
            position.col + 1
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::board::BOARD_SIZE;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Console double that replays a scripted move list and records
    /// everything the session shows the user.
    #[derive(Clone, Default)]
    struct ScriptedConsole {
        moves: Arc<Mutex<VecDeque<(i64, i64)>>>,
        renders: Arc<Mutex<Vec<BoardSnapshot>>>,
        rejections: Arc<Mutex<Vec<MoveError>>>,
        results: Arc<Mutex<Vec<GameStatus>>>,
    }

    impl ScriptedConsole {
        fn with_moves(moves: &[(i64, i64)]) -> Self {
            Self {
                moves: Arc::new(Mutex::new(moves.iter().copied().collect())),
                ..Self::default()
            }
        }
    }

    impl GameConsole for ScriptedConsole {
        async fn read_move(&self, _prompt_label: &str) -> (i64, i64) {
            self.moves
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of moves")
        }

        fn report_invalid_move(&self, error: &MoveError) {
            self.rejections.lock().unwrap().push(*error);
        }

        fn render_board(&self, snapshot: &BoardSnapshot) {
            self.renders.lock().unwrap().push(*snapshot);
        }

        fn announce_result(&self, status: GameStatus) {
            self.results.lock().unwrap().push(status);
        }
    }

    /// Console double that always plays the first free cell of the most
    /// recently rendered board.
    #[derive(Clone, Default)]
    struct FirstFreeConsole {
        last_render: Arc<Mutex<Option<BoardSnapshot>>>,
        results: Arc<Mutex<Vec<GameStatus>>>,
    }

    impl GameConsole for FirstFreeConsole {
        async fn read_move(&self, _prompt_label: &str) -> (i64, i64) {
            let guard = self.last_render.lock().unwrap();
            let snapshot = (*guard).expect("no board rendered yet");
            let position = snapshot.available_moves()[0];
            (position.row as i64 + 1, position.col as i64 + 1)
        }

        fn report_invalid_move(&self, _error: &MoveError) {
            panic!("first-free console never plays an invalid move");
        }

        fn render_board(&self, snapshot: &BoardSnapshot) {
            *self.last_render.lock().unwrap() = Some(*snapshot);
        }

        fn announce_result(&self, status: GameStatus) {
            self.results.lock().unwrap().push(status);
        }
    }

    fn two_player_config() -> GameSessionConfig {
        GameSessionConfig {
            mode: GameMode::TwoPlayer,
            player_one_label: "Player 1".to_string(),
            player_two_label: "Player 2".to_string(),
        }
    }

    fn single_player_config() -> GameSessionConfig {
        GameSessionConfig {
            mode: GameMode::SinglePlayer,
            player_one_label: "Player 1".to_string(),
            player_two_label: "Computer".to_string(),
        }
    }

    fn mark_counts(snapshot: &BoardSnapshot) -> (usize, usize) {
        let mut x_count = 0;
        let mut o_count = 0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                match snapshot.get(row, col) {
                    Mark::X => x_count += 1,
                    Mark::O => o_count += 1,
                    Mark::Empty => {}
                }
            }
        }
        (x_count, o_count)
    }

    #[test]
    fn test_actor_assignment_per_mode() {
        let single = single_player_config();
        assert_eq!(
            single.actor_for(Mark::X),
            TurnActor::Human {
                prompt_label: "Player 1".to_string()
            }
        );
        assert_eq!(single.actor_for(Mark::O), TurnActor::Computer);

        let two = two_player_config();
        assert_eq!(
            two.actor_for(Mark::O),
            TurnActor::Human {
                prompt_label: "Player 2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_two_player_game_alternates_strictly_from_player_one() {
        // X takes row 1, O answers in row 2; X wins in five moves.
        let console =
            ScriptedConsole::with_moves(&[(1, 1), (2, 1), (1, 2), (2, 2), (1, 3)]);
        let status = run_session(two_player_config(), console.clone())
            .await
            .unwrap();
        assert_eq!(status, GameStatus::XWon);

        // One render per round plus the terminal one; every observed
        // board has balanced counts with X never behind, and each round
        // adds exactly one mark.
        let renders = console.renders.lock().unwrap();
        assert_eq!(renders.len(), 6);
        for (round, snapshot) in renders.iter().enumerate() {
            let (x_count, o_count) = mark_counts(snapshot);
            assert_eq!(x_count + o_count, round);
            assert!(x_count == o_count || x_count == o_count + 1);
        }

        assert_eq!(*console.results.lock().unwrap(), vec![GameStatus::XWon]);
        assert!(console.rejections.lock().unwrap().is_empty());
        assert!(console.moves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_reprompts_without_losing_turn() {
        let console =
            ScriptedConsole::with_moves(&[(0, 7), (1, 1), (1, 1), (2, 2)]);
        let mut coordinator = TurnCoordinator::new();

        let actor = TurnActor::Human {
            prompt_label: "Player 1".to_string(),
        };
        let position = coordinator.play_round(&actor, &console).await.unwrap();
        assert_eq!(position, Position::new(0, 0));
        assert_eq!(coordinator.current_mark(), Mark::O);

        let actor = TurnActor::Human {
            prompt_label: "Player 2".to_string(),
        };
        let position = coordinator.play_round(&actor, &console).await.unwrap();
        assert_eq!(position, Position::new(1, 1));

        let rejections = console.rejections.lock().unwrap();
        assert_eq!(rejections.len(), 2);
        assert!(matches!(rejections[0], MoveError::OutOfRange { row: 0, col: 7 }));
        assert!(matches!(rejections[1], MoveError::CellOccupied { row: 0, col: 0 }));

        assert_eq!(coordinator.board().get(0, 0).unwrap(), Mark::X);
        assert_eq!(coordinator.board().get(1, 1).unwrap(), Mark::O);
        assert_eq!(coordinator.turn_token.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_human_corner_then_computer_takes_center() {
        let console = ScriptedConsole::with_moves(&[(1, 1)]);
        let mut coordinator = TurnCoordinator::new();

        let human = TurnActor::Human {
            prompt_label: "Player 1".to_string(),
        };
        coordinator.play_round(&human, &console).await.unwrap();

        let position = coordinator
            .play_round(&TurnActor::Computer, &console)
            .await
            .unwrap();
        assert_eq!(position, Position::new(1, 1));

        assert_eq!(coordinator.board().get(0, 0).unwrap(), Mark::X);
        assert_eq!(coordinator.board().get(1, 1).unwrap(), Mark::O);
        assert_eq!(coordinator.board().count_empty(), 7);
        assert_eq!(coordinator.current_mark(), Mark::X);
    }

    #[tokio::test]
    async fn test_preset_position_plays_to_forced_draw() {
        // X O X
        // X O O
        // _ _ _   with X to move; the scripted endgame fills row 3.
        let mut board = Board::new();
        for (row, col, mark) in [
            (0, 0, Mark::X),
            (0, 1, Mark::O),
            (0, 2, Mark::X),
            (1, 0, Mark::X),
            (1, 1, Mark::O),
            (1, 2, Mark::O),
        ] {
            board.set(row, col, mark).unwrap();
        }
        let coordinator = TurnCoordinator::with_state(board, Mark::X);

        let console = ScriptedConsole::with_moves(&[(3, 2), (3, 1), (3, 3)]);
        let status = run_rounds(coordinator, two_player_config(), console.clone())
            .await
            .unwrap();

        assert_eq!(status, GameStatus::Draw);
        let final_board = console.renders.lock().unwrap().last().copied().unwrap();
        assert_eq!(final_board.count_empty(), 0);
    }

    #[tokio::test]
    async fn test_single_player_game_never_ends_in_human_win() {
        // A naive first-free-cell human against the engine: the engine
        // completes the anti-diagonal and wins.
        let console = FirstFreeConsole::default();
        let status = run_session(single_player_config(), console.clone())
            .await
            .unwrap();
        assert_ne!(status, GameStatus::XWon);
        assert_eq!(status, GameStatus::OWon);
        assert_eq!(*console.results.lock().unwrap(), vec![GameStatus::OWon]);
    }

    #[tokio::test]
    async fn test_computer_on_full_board_is_a_hard_error() {
        let mut board = Board::new();
        for (row, col, mark) in [
            (0, 0, Mark::X),
            (0, 1, Mark::O),
            (0, 2, Mark::X),
            (1, 0, Mark::X),
            (1, 1, Mark::O),
            (1, 2, Mark::O),
            (2, 0, Mark::O),
            (2, 1, Mark::X),
            (2, 2, Mark::X),
        ] {
            board.set(row, col, mark).unwrap();
        }
        let mut coordinator = TurnCoordinator::with_state(board, Mark::O);

        let console = ScriptedConsole::default();
        let error = coordinator
            .play_round(&TurnActor::Computer, &console)
            .await
            .unwrap_err();
        assert!(matches!(error, SessionError::Search(SearchError::NoLegalMove)));
    }
}
