use std::sync::OnceLock;

use crate::player::Player;

/// Largest supported board edge.
pub const MAX_BOARD_SIZE: u8 = 25;

const SEED: u64 = 0x9e37_79b9_7f4a_7c15;

static TABLE: OnceLock<Vec<[u64; 2]>> = OnceLock::new();

fn table() -> &'static [[u64; 2]] {
    TABLE.get_or_init(|| {
        let mut rng = fastrand::Rng::with_seed(SEED);
        let cells = MAX_BOARD_SIZE as usize * MAX_BOARD_SIZE as usize;
        (0..cells).map(|_| [rng.u64(..), rng.u64(..)]).collect()
    })
}

/// Hash key for a stone of `player` on the flat cell `idx`.
/// XOR it in when a stone is placed and again when it is removed.
#[inline]
pub(crate) fn key(idx: usize, player: Player) -> u64 {
    let slot = match player {
        Player::Black => 0,
        Player::White => 1,
    };
    table()[idx][slot]
}
