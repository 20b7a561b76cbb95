//! Typed failures for the few engine operations that can fail.

use shared::PlayerId;
use thiserror::Error;

/// Placement failures reported by the grid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid saturated: no free cell found after {attempts} attempts")]
    Saturated { attempts: usize },
    #[error("snakes already cover {occupied} of {capacity} interior cells")]
    Crowded { occupied: usize, capacity: usize },
}

/// Reasons a player cannot join a game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game is full ({max_players} players)")]
    Full { max_players: usize },
    #[error("player {0} already joined this game")]
    AlreadyJoined(PlayerId),
    #[error("could not place snake: {0}")]
    Placement(#[from] GridError),
}

/// Rejected configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must be between 3x3 and {max}x{max}, got {rows}x{cols}")]
    GridSize { rows: u16, cols: u16, max: u16 },
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("snake length {length} does not fit inside a {rows}x{cols} grid")]
    SnakeLength { length: usize, rows: u16, cols: u16 },
    #[error("placement attempts must be non-zero")]
    NoPlacementAttempts,
    #[error("snapshots of up to {bytes} bytes would not fit a {max}-byte datagram")]
    SnapshotTooLarge { bytes: usize, max: usize },
}
