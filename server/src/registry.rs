//! Ownership of every running game.
//!
//! The transport never creates games itself: it asks the registry for a game
//! with a free seat, looks games up by id when packets arrive, and lets the
//! registry evict games once nobody is connected to them anymore.

use crate::config::GameConfig;
use crate::game::{Game, GameChannels};
use crate::player::Player;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{GameId, PlayerId};
use std::collections::BTreeMap;

pub struct GameRegistry {
    games: BTreeMap<GameId, Game>,
    next_game_id: GameId,
    next_player_id: PlayerId,
    config: GameConfig,
    channels: GameChannels,
    rng: StdRng,
}

impl GameRegistry {
    pub fn new(config: GameConfig, channels: GameChannels) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            games: BTreeMap::new(),
            next_game_id: 1,
            next_player_id: 1,
            config,
            channels,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates the identity for a newly connected client.
    pub fn new_player(&mut self) -> Player {
        let id = self.next_player_id;
        self.next_player_id += 1;
        Player::random(id, &mut self.rng)
    }

    /// Returns the oldest game with a free seat, creating one if every game
    /// is full.
    pub fn find_or_create_game(&mut self) -> &mut Game {
        let open = self
            .games
            .iter()
            .find(|(_, game)| game.has_capacity())
            .map(|(id, _)| *id);

        let id = match open {
            Some(id) => id,
            None => {
                let id = self.next_game_id;
                self.next_game_id += 1;
                info!("Creating game {}", id);
                id
            }
        };

        let (config, channels) = (&self.config, &self.channels);
        self.games
            .entry(id)
            .or_insert_with(|| Game::new(id, config.clone(), channels.clone()))
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// Drops every game that has no open connection left and returns their ids.
    pub fn evict_abandoned(&mut self) -> Vec<GameId> {
        let abandoned: Vec<GameId> = self
            .games
            .iter()
            .filter(|(_, game)| game.connections().is_empty())
            .map(|(id, _)| *id)
            .collect();

        for id in &abandoned {
            self.games.remove(id);
            info!("Evicted game {}", id);
        }

        abandoned
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
