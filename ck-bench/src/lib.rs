//! ck-bench: criterion micro-benchmarks for the rules engine and search.

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use ck_core::{Board, GameSession};

/// Deterministic midgame position: play the first legal move for `plies`
/// plies from the opening.
pub fn midgame_board(plies: u32) -> Board {
    let mut session = GameSession::new();
    for _ in 0..plies {
        if session.is_over() {
            break;
        }
        let mv = session.legal_moves()[0].clone();
        if session.apply(&mv).is_err() {
            break;
        }
    }
    session.board().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn midgame_board_is_reachable_and_stable() {
        assert_eq!(midgame_board(12).state_key(), midgame_board(12).state_key());
    }
}
