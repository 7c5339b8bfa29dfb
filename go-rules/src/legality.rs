//! Move legality, checked without mutating the state under test.
//!
//! Order of checks: game over, then pass/resign (always fine), then for a
//! play: bounds, occupancy, self-capture (after captures are accounted
//! for), and finally the ko rule from the game's [`KoRule`].

use crate::config::KoRule;
use crate::error::{GoError, Violation};
use crate::game::GameState;
use crate::moves::Move;
use crate::point::Point;

/// Check `mv` for the player to move in `state`.
pub fn check_move(state: &GameState, mv: Move) -> Result<(), GoError> {
    if state.is_over() {
        return Err(Violation::GameOver.into());
    }

    match mv {
        Move::Pass | Move::Resign => Ok(()),
        Move::Play(point) => check_play(state, point),
    }
}

fn check_play(state: &GameState, point: Point) -> Result<(), GoError> {
    let board = state.board();
    let player = state.next_player();

    if !board.is_on_grid(point) {
        return Err(GoError::OutOfBounds);
    }
    if board.get(point).is_some() {
        return Err(GoError::Occupied);
    }

    let captured = board.capture_candidates(player, point);
    if captured.is_empty() && board.is_self_capture(player, point) {
        return Err(Violation::SelfCapture.into());
    }

    if repeats_position(state, point, &captured) {
        return Err(Violation::Ko.into());
    }

    Ok(())
}

/// Would playing `point` recreate a position the ko rule forbids?
fn repeats_position(state: &GameState, point: Point, captured: &[Point]) -> bool {
    let board = state.board();
    let player = state.next_player();
    let hash = board.hash_after(player, point, captured);

    let earlier: Box<dyn Iterator<Item = &GameState> + '_> = match state.config().ko_rule {
        KoRule::Positional => Box::new(state.previous().into_iter()),
        KoRule::Superko => Box::new(state.ancestors()),
    };
    let mut suspects = earlier
        .filter(|s| s.board().zobrist_hash() == hash)
        .peekable();
    if suspects.peek().is_none() {
        return false;
    }

    // Hashes matched; confirm against the real resulting board.
    let mut next = board.clone();
    if next.place_stone(point, player).is_err() {
        return false;
    }
    suspects.any(|s| s.board() == &next)
}
