//! ck-core: Checkers rules, board/move representation, game session, and
//! configuration.

pub mod board;
pub mod config;
pub mod game;
pub mod moves;

pub use board::{Board, Piece, Rank, Side, BOARD_SIZE};
pub use config::{Config, ConfigError, FitnessConfig, HarnessConfig, SearchConfig};
pub use game::{ApplyError, GameSession, Status};
pub use moves::{Move, Square};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}

#[cfg(test)]
mod moves_tests;
