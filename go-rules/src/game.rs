use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::{ConfigError, GameConfig, KoRule};
use crate::error::GoError;
use crate::legality;
use crate::moves::Move;
use crate::player::Player;
use crate::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Over,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::InProgress => write!(f, "in_progress"),
            Phase::Over => write!(f, "over"),
        }
    }
}

/// Running prisoner count. `black` holds the white stones black has taken,
/// and `white` the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    /// Stones taken by `player` so far.
    pub fn by(&self, player: Player) -> u32 {
        match player {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    fn credit(&mut self, player: Player, stones: &[Point]) {
        let count = stones.len() as u32;
        match player {
            Player::Black => self.black += count,
            Player::White => self.white += count,
        }
    }
}

/// Serializable view of a single position, for display layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub size: u8,
    pub board: Vec<i8>,
    pub next_player: Player,
    pub captures: Captures,
    pub last_move: Option<Move>,
    pub phase: Phase,
}

/// One node of an immutable game history.
///
/// Every accepted move produces a new `GameState` holding a fresh board and
/// a shared link to its predecessor, so several continuations can branch
/// from the same ancestor without copying the history. States are handed out
/// as `Arc<GameState>` and never change after construction.
pub struct GameState {
    board: Board,
    next_player: Player,
    previous: Option<Arc<GameState>>,
    last_move: Option<Move>,
    config: GameConfig,
    captures: Captures,
    move_number: u32,
}

impl GameState {
    /// Empty `board_size` x `board_size` board with black to move.
    ///
    /// Panics if the size is outside `1..=MAX_BOARD_SIZE`; use
    /// [`GameState::with_config`] for sizes that come from user input.
    pub fn new_game(board_size: u8) -> Arc<GameState> {
        Self::root(Board::new(board_size), Player::Black, GameConfig::new(board_size))
    }

    pub fn with_config(config: &GameConfig) -> Result<Arc<GameState>, ConfigError> {
        config.validate()?;
        Ok(Self::root(
            Board::new(config.board_size),
            Player::Black,
            *config,
        ))
    }

    /// Start a history from an arbitrary setup position.
    pub fn from_position(board: Board, next_player: Player, ko_rule: KoRule) -> Arc<GameState> {
        let config = GameConfig::new(board.size()).with_ko_rule(ko_rule);
        Self::root(board, next_player, config)
    }

    fn root(board: Board, next_player: Player, config: GameConfig) -> Arc<GameState> {
        Arc::new(GameState {
            board,
            next_player,
            previous: None,
            last_move: None,
            config,
            captures: Captures::default(),
            move_number: 0,
        })
    }

    // -- Accessors --

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn previous(&self) -> Option<&GameState> {
        self.previous.as_deref()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Number of moves applied since the root of the history.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    // -- Game flow --

    /// Validate `mv` and return the state it leads to. `self` is untouched.
    pub fn apply_move(self: &Arc<Self>, mv: Move) -> Result<Arc<GameState>, GoError> {
        let player = self.next_player;
        if let Err(e) = legality::check_move(self, mv) {
            tracing::debug!("{player} {mv} rejected: {e}");
            return Err(e);
        }

        let mut board = self.board.clone();
        let mut captures = self.captures;
        if let Some(point) = mv.point() {
            let captured = board.place_stone(point, player)?;
            if !captured.is_empty() {
                tracing::debug!("{player} at {point} captures {} stone(s)", captured.len());
            }
            captures.credit(player, &captured);
        }

        let next = GameState {
            board,
            next_player: player.other(),
            previous: Some(Arc::clone(self)),
            last_move: Some(mv),
            config: self.config,
            captures,
            move_number: self.move_number + 1,
        };
        tracing::trace!("move {}: {player} {mv}", next.move_number);

        if next.is_over() {
            match next.result() {
                Some(result) => tracing::info!("game over after {} moves: {result}", next.move_number),
                None => tracing::info!("game over after {} moves", next.move_number),
            }
        }

        Ok(Arc::new(next))
    }

    pub fn is_valid_move(&self, mv: Move) -> bool {
        legality::check_move(self, mv).is_ok()
    }

    /// Every legal move from this position: plays in row-major order, then
    /// pass and resign. Empty once the game is over.
    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        let over = self.is_over();
        self.board
            .points()
            .map(Move::Play)
            .chain([Move::Pass, Move::Resign])
            .filter(move |&mv| !over && self.is_valid_move(mv))
    }

    /// Two passes in a row, or a resignation.
    pub fn is_over(&self) -> bool {
        match self.last_move {
            Some(mv) if mv.is_resign() => true,
            Some(mv) if mv.is_pass() => self
                .previous
                .as_ref()
                .and_then(|prev| prev.last_move)
                .is_some_and(|prev| prev.is_pass()),
            _ => false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_over() {
            Phase::Over
        } else {
            Phase::InProgress
        }
    }

    /// The winner by resignation. Games ended by passing have no winner
    /// here; scoring them is left to the caller.
    pub fn winner(&self) -> Option<Player> {
        // The resigner was the previous mover, so the player "to move" won.
        self.last_move
            .filter(Move::is_resign)
            .map(|_| self.next_player)
    }

    /// Result string such as `W+R`, once decided.
    pub fn result(&self) -> Option<String> {
        self.winner().map(|w| format!("{}+R", w.letter()))
    }

    // -- History --

    /// This state followed by each predecessor back to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Moves from the root to this state, oldest first.
    pub fn moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self.ancestors().filter_map(|s| s.last_move).collect();
        moves.reverse();
        moves
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.board.size(),
            board: self.board.cells().to_vec(),
            next_player: self.next_player,
            captures: self.captures,
            last_move: self.last_move,
            phase: self.phase(),
        }
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("board", &self.board)
            .field("next_player", &self.next_player)
            .field("last_move", &self.last_move)
            .field("move_number", &self.move_number)
            .finish_non_exhaustive()
    }
}

// Unlink the history iteratively so dropping a long game can't overflow the stack.
impl Drop for GameState {
    fn drop(&mut self) {
        let mut previous = self.previous.take();
        while let Some(state) = previous {
            match Arc::try_unwrap(state) {
                Ok(mut inner) => previous = inner.previous.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a GameState>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a GameState;

    fn next(&mut self) -> Option<&'a GameState> {
        let current = self.next?;
        self.next = current.previous();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_from_layout;
    use crate::error::Violation;
    use crate::point::Point;

    fn p(row: u8, col: u8) -> Point {
        Point::new(row, col)
    }

    fn play_all(state: &Arc<GameState>, moves: &[Move]) -> Arc<GameState> {
        moves
            .iter()
            .fold(Arc::clone(state), |s, &mv| s.apply_move(mv).unwrap())
    }

    // -- Initialization --

    #[test]
    fn new_game_is_empty_black_to_move() {
        let state = GameState::new_game(9);
        assert!(state.board().is_empty());
        assert_eq!(state.board().size(), 9);
        assert_eq!(state.next_player(), Player::Black);
        assert!(state.previous().is_none());
        assert_eq!(state.last_move(), None);
        assert_eq!(state.move_number(), 0);
        assert_eq!(state.phase(), Phase::InProgress);
    }

    #[test]
    #[should_panic(expected = "board size")]
    fn new_game_rejects_zero_size() {
        GameState::new_game(0);
    }

    #[test]
    fn with_config_validates() {
        let state = GameState::with_config(&GameConfig::new(13)).unwrap();
        assert_eq!(state.board().size(), 13);
        assert_eq!(
            GameState::with_config(&GameConfig::new(0)).unwrap_err(),
            ConfigError::InvalidBoardSize(0)
        );
    }

    // -- Turn management --

    #[test]
    fn alternates_turns() {
        let state = GameState::new_game(4);
        let state = state.apply_move(Move::play(0, 0)).unwrap();
        assert_eq!(state.next_player(), Player::White);
        let state = state.apply_move(Move::play(1, 0)).unwrap();
        assert_eq!(state.next_player(), Player::Black);
        let state = state.apply_move(Move::Pass).unwrap();
        assert_eq!(state.next_player(), Player::White);
    }

    #[test]
    fn apply_leaves_predecessor_untouched() {
        let root = GameState::new_game(4);
        let next = root.apply_move(Move::play(2, 2)).unwrap();
        assert!(root.board().is_empty());
        assert_eq!(next.board().get(p(2, 2)), Some(Player::Black));
        assert!(std::ptr::eq(next.previous().unwrap(), Arc::as_ptr(&root)));
    }

    #[test]
    fn branches_share_an_ancestor() {
        let root = GameState::new_game(4);
        let a = root.apply_move(Move::play(0, 0)).unwrap();
        let b = root.apply_move(Move::play(3, 3)).unwrap();
        assert_eq!(a.board().get(p(3, 3)), None);
        assert_eq!(b.board().get(p(0, 0)), None);
        assert_eq!(Arc::strong_count(&root), 3);
    }

    #[test]
    fn failed_move_has_no_effect() {
        let state = GameState::new_game(4).apply_move(Move::play(1, 1)).unwrap();
        let before = state.snapshot();
        assert_eq!(state.apply_move(Move::play(1, 1)).unwrap_err(), GoError::Occupied);
        assert_eq!(state.apply_move(Move::play(4, 1)).unwrap_err(), GoError::OutOfBounds);
        assert_eq!(state.snapshot(), before);
    }

    // -- Game over --

    #[test]
    fn single_pass_does_not_end_game() {
        let state = play_all(&GameState::new_game(4), &[Move::play(0, 0), Move::Pass]);
        assert!(!state.is_over());
        let state = play_all(&state, &[Move::play(1, 1), Move::Pass]);
        assert!(!state.is_over());
    }

    #[test]
    fn two_passes_end_game() {
        let state = play_all(&GameState::new_game(4), &[Move::play(0, 0), Move::Pass, Move::Pass]);
        assert!(state.is_over());
        assert_eq!(state.phase(), Phase::Over);
        assert_eq!(state.winner(), None);
        assert_eq!(state.result(), None);
        assert_eq!(
            state.apply_move(Move::play(2, 2)).unwrap_err(),
            GoError::IllegalMove(Violation::GameOver)
        );
        assert_eq!(
            state.apply_move(Move::Pass).unwrap_err(),
            GoError::IllegalMove(Violation::GameOver)
        );
    }

    #[test]
    fn resign_ends_game() {
        let state = play_all(&GameState::new_game(4), &[Move::play(0, 0), Move::Resign]);
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Player::Black));
        assert_eq!(state.result().as_deref(), Some("B+R"));
        assert_eq!(
            state.apply_move(Move::Resign).unwrap_err(),
            GoError::IllegalMove(Violation::GameOver)
        );

        let state = GameState::new_game(4).apply_move(Move::Resign).unwrap();
        assert_eq!(state.winner(), Some(Player::White));
        assert_eq!(state.result().as_deref(), Some("W+R"));
    }

    #[test]
    fn no_winner_in_progress() {
        let state = GameState::new_game(4).apply_move(Move::play(0, 0)).unwrap();
        assert_eq!(state.winner(), None);
    }

    // -- Legal moves --

    #[test]
    fn legal_moves_on_empty_board() {
        let state = GameState::new_game(3);
        let moves: Vec<Move> = state.legal_moves().collect();
        assert_eq!(moves.len(), 9 + 2);
        assert_eq!(moves[0], Move::play(0, 0));
        assert_eq!(moves[8], Move::play(2, 2));
        assert_eq!(&moves[9..], &[Move::Pass, Move::Resign]);
    }

    #[test]
    fn legal_moves_skip_occupied_and_self_capture() {
        let board = board_from_layout(&["+B+", "B++", "+++"]);
        let state = GameState::from_position(board, Player::White, KoRule::Positional);
        let moves: Vec<Move> = state.legal_moves().collect();
        assert!(!moves.contains(&Move::play(0, 0)));
        assert!(!moves.contains(&Move::play(0, 1)));
        assert!(!moves.contains(&Move::play(1, 0)));
        assert!(moves.contains(&Move::play(1, 1)));
        assert_eq!(moves.len(), 6 + 2);
    }

    #[test]
    fn legal_moves_are_restartable() {
        let state = play_all(&GameState::new_game(3), &[Move::play(1, 1)]);
        let first: Vec<Move> = state.legal_moves().collect();
        let second: Vec<Move> = state.legal_moves().collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|&mv| state.is_valid_move(mv)));
    }

    #[test]
    fn no_legal_moves_when_over() {
        let state = play_all(&GameState::new_game(3), &[Move::Pass, Move::Pass]);
        assert_eq!(state.legal_moves().count(), 0);
    }

    // -- Captures --

    #[test]
    fn tracks_captures() {
        let state = play_all(
            &GameState::new_game(4),
            &[Move::play(1, 0), Move::play(0, 0), Move::play(0, 1)],
        );
        assert_eq!(state.board().get(p(0, 0)), None);
        assert_eq!(state.captures().black, 1);
        assert_eq!(state.captures().by(Player::White), 0);
    }

    #[test]
    fn ko_retake_after_exchange_elsewhere() {
        let board = board_from_layout(&["+BW+", "BW+W", "+BW+", "++++"]);
        let state = GameState::from_position(board, Player::Black, KoRule::Positional);
        let state = state.apply_move(Move::play(1, 2)).unwrap();
        assert_eq!(
            state.apply_move(Move::play(1, 1)).unwrap_err(),
            GoError::IllegalMove(Violation::Ko)
        );

        let state = play_all(&state, &[Move::play(3, 3), Move::play(3, 0)]);
        let state = state.apply_move(Move::play(1, 1)).unwrap();
        assert_eq!(state.board().get(p(1, 2)), None);
        assert_eq!(state.captures().white, 1);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn take(&self) -> String {
            let bytes = std::mem::take(&mut *self.0.lock().unwrap());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    #[test]
    fn captures_are_logged_only_when_played() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            // White can take the black stone at (1,1) by playing (1,2).
            let board = board_from_layout(&["+WB+", "WB+B", "+WB+", "++++"]);
            let state = GameState::from_position(board, Player::White, KoRule::Positional);

            assert!(state.legal_moves().any(|mv| mv == Move::play(1, 2)));
            assert!(!logs.take().contains("captures"));

            let state = state.apply_move(Move::play(1, 2)).unwrap();
            assert!(logs.take().contains("White at 1,2 captures 1 stone(s)"));

            // Black's ko retake is only tried on a scratch board.
            assert!(!state.is_valid_move(Move::play(1, 1)));
            assert!(state.legal_moves().count() > 0);
            assert!(!logs.take().contains("captures"));
        });
    }

    // -- History --

    #[test]
    fn ancestors_and_moves() {
        let played = [Move::play(0, 0), Move::Pass, Move::play(2, 2)];
        let state = play_all(&GameState::new_game(3), &played);
        assert_eq!(state.ancestors().count(), 4);
        assert_eq!(state.move_number(), 3);
        assert_eq!(state.moves(), played.to_vec());
        assert_eq!(state.ancestors().last().unwrap().move_number(), 0);
    }

    #[test]
    fn dropping_a_long_history() {
        let mut state = GameState::new_game(2);
        for i in 0..200_000u32 {
            state = Arc::new(GameState {
                board: state.board.clone(),
                next_player: state.next_player.other(),
                previous: Some(Arc::clone(&state)),
                last_move: Some(if i % 2 == 0 { Move::Pass } else { Move::play(0, 0) }),
                config: state.config,
                captures: Captures::default(),
                move_number: i + 1,
            });
        }
        assert_eq!(state.move_number(), 200_000);
        drop(state);
    }

    #[test]
    fn states_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GameState>();
        assert_send_sync::<Arc<GameState>>();
    }

    // -- Serialization --

    #[test]
    fn snapshot_json_shape() {
        let state = play_all(&GameState::new_game(2), &[Move::play(0, 1)]);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["size"], 2);
        assert_eq!(json["board"], serde_json::json!([0, 1, 0, 0]));
        assert_eq!(json["next_player"], -1);
        assert_eq!(json["captures"]["black"], 0);
        assert_eq!(json["last_move"]["kind"], "play");
        assert_eq!(json["phase"], "in_progress");

        let restored: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state.snapshot());
    }

    #[test]
    fn phase_text() {
        assert_eq!(Phase::InProgress.to_string(), "in_progress");
        assert_eq!(Phase::Over.to_string(), "over");
    }
}
