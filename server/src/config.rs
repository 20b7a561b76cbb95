use crate::error::ConfigError;
use shared::{
    snapshot_size_bound, DEFAULT_GRID_SIZE, DEFAULT_MAX_PLAYERS, DEFAULT_SNAKE_LENGTH,
    DEFAULT_TICK_INTERVAL_MS, MAX_DATAGRAM_SIZE, MAX_GRID_SIZE,
};
use std::time::Duration;

/// Per-game tuning shared by every game the registry creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Players needed before the first food spawns and ticks can run
    pub max_players: usize,
    pub rows: u16,
    pub cols: u16,
    /// Body length of a freshly spawned snake
    pub snake_length: usize,
    /// Minimum spacing between two outbound snapshots
    pub tick_interval: Duration,
    /// Rejection-sampling bound for every random placement
    pub placement_attempts: usize,
    /// Fixed RNG seed; games derive their own seed from it
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            rows: DEFAULT_GRID_SIZE,
            cols: DEFAULT_GRID_SIZE,
            snake_length: DEFAULT_SNAKE_LENGTH,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            placement_attempts: 1000,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < 3 || self.cols < 3 || self.rows > MAX_GRID_SIZE || self.cols > MAX_GRID_SIZE
        {
            return Err(ConfigError::GridSize {
                rows: self.rows,
                cols: self.cols,
                max: MAX_GRID_SIZE,
            });
        }

        if self.max_players == 0 {
            return Err(ConfigError::NoPlayers);
        }

        // The interior excludes the boundary ring on both sides
        let interior = (self.rows.min(self.cols) - 2) as usize;
        if self.snake_length == 0 || self.snake_length > interior {
            return Err(ConfigError::SnakeLength {
                length: self.snake_length,
                rows: self.rows,
                cols: self.cols,
            });
        }

        if self.placement_attempts == 0 {
            return Err(ConfigError::NoPlacementAttempts);
        }

        let bytes = snapshot_size_bound(self.rows, self.cols, self.max_players);
        if bytes > MAX_DATAGRAM_SIZE {
            return Err(ConfigError::SnapshotTooLarge {
                bytes,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.max_players, 2);
        assert_eq!(config.snake_length, 5);
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let config = GameConfig {
            rows: MAX_GRID_SIZE + 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridSize { .. })
        ));
    }

    #[test]
    fn test_rejects_snake_longer_than_interior() {
        let config = GameConfig {
            rows: 6,
            cols: 6,
            snake_length: 5,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SnakeLength {
                length: 5,
                rows: 6,
                cols: 6
            })
        );
    }

    #[test]
    fn test_largest_grid_is_valid() {
        let config = GameConfig {
            rows: MAX_GRID_SIZE,
            cols: MAX_GRID_SIZE,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_player_count_overflowing_datagram() {
        let config = GameConfig {
            rows: MAX_GRID_SIZE,
            cols: MAX_GRID_SIZE,
            max_players: 200,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SnapshotTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_players() {
        let config = GameConfig {
            max_players: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoPlayers));
    }
}
