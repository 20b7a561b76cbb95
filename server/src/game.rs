//! One match: its players, their shared grid, and the turn loop.
//!
//! A game waits until every joined player has submitted an action for the
//! current round, then runs a tick synchronously and schedules a throttled
//! snapshot broadcast:
//!
//! ```text
//! AwaitingActions --(all slots filled)--> Ticking --> BroadcastScheduled --> AwaitingActions
//! ```
//!
//! A connection that closes is dropped from the broadcast targets only. Its
//! player keeps its seat in the turn barrier, so the game stops advancing
//! until the process (or the registry) discards it.

use crate::broadcast::{BroadcastThrottle, DeferredBroadcast};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::grid::{Collision, Grid, GridId};
use crate::network::GameMessage;
use crate::player::Player;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Action, GameId, Packet, PlayerId, Response, Snapshot};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Broadcast target handed over by the transport.
pub type Connection = SocketAddr;

/// Senders a game uses to reach the transport.
#[derive(Debug, Clone)]
pub struct GameChannels {
    /// Outgoing packets for the network sender task
    pub outbound: mpsc::UnboundedSender<GameMessage>,
    /// Fired deferred broadcasts, identified by game
    pub broadcast_due: mpsc::UnboundedSender<GameId>,
}

impl GameChannels {
    pub fn new() -> (
        Self,
        mpsc::UnboundedReceiver<GameMessage>,
        mpsc::UnboundedReceiver<GameId>,
    ) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (broadcast_due, due_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound,
                broadcast_due,
            },
            outbound_rx,
            due_rx,
        )
    }
}

pub struct Game {
    id: GameId,
    config: GameConfig,
    players: Vec<Player>,
    grid: Grid,
    tick: u64,
    started: bool,
    /// Set when a snake could not be placed; the game takes no more seats
    seating_failed: bool,
    /// One slot per player for the current round
    pending_actions: HashMap<PlayerId, Action>,
    responses: Vec<Response>,
    connections: Vec<Connection>,
    throttle: BroadcastThrottle,
    deferred: DeferredBroadcast,
    channels: GameChannels,
}

impl Game {
    pub fn new(id: GameId, config: GameConfig, channels: GameChannels) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        let grid = Grid::new(
            GridId(id),
            config.rows,
            config.cols,
            config.placement_attempts,
            rng,
        );

        Self {
            id,
            players: Vec::new(),
            grid,
            tick: 0,
            started: false,
            seating_failed: false,
            pending_actions: HashMap::new(),
            responses: Vec::new(),
            connections: Vec::new(),
            throttle: BroadcastThrottle::new(config.tick_interval),
            deferred: DeferredBroadcast::new(),
            channels,
            config,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn max_players(&self) -> usize {
        self.config.max_players
    }

    /// True while the game still accepts new players.
    pub fn has_capacity(&self) -> bool {
        !self.seating_failed && !self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.config.max_players
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn pending_action_count(&self) -> usize {
        self.pending_actions.len()
    }

    pub fn has_pending_broadcast(&self) -> bool {
        self.deferred.is_pending()
    }

    pub fn last_broadcast(&self) -> Option<Instant> {
        self.throttle.last_broadcast()
    }

    /// Registers `connection` as a broadcast target and seats `player` with a
    /// freshly placed snake.
    pub fn join(&mut self, connection: Connection, player: Player) -> Result<(), GameError> {
        if self.is_full() {
            return Err(GameError::Full {
                max_players: self.config.max_players,
            });
        }
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(GameError::AlreadyJoined(player.id));
        }

        if let Err(e) = self.grid.add_snake(&player, self.config.snake_length) {
            self.seating_failed = true;
            return Err(e.into());
        }
        self.players.push(player);
        self.connections.push(connection);

        info!(
            "Game {}: player {} joined from {} ({}/{})",
            self.id,
            player.id,
            connection,
            self.players.len(),
            self.config.max_players
        );
        Ok(())
    }

    /// Starts the game once every seat is taken: spawns the first food and
    /// sends the opening snapshot. Returns true if the game started now.
    pub fn maybe_start(&mut self, now: Instant) -> bool {
        if self.started || !self.is_full() {
            return false;
        }

        self.started = true;
        if let Err(e) = self.grid.add_food() {
            warn!("Game {}: no room for the first food: {}", self.id, e);
        }

        info!("Game {}: all {} players joined, starting", self.id, self.players.len());
        self.broadcast_state(now);
        true
    }

    /// Buffers `player`'s action for this round. Returns true if it completed
    /// the round and a tick ran.
    pub fn receive(&mut self, player: PlayerId, action: Action) -> bool {
        self.receive_at(player, action, Instant::now())
    }

    pub fn receive_at(&mut self, player: PlayerId, action: Action, now: Instant) -> bool {
        if !self.players.iter().any(|p| p.id == player) {
            warn!("Game {}: dropping action from unknown player {}", self.id, player);
            return false;
        }
        if !self.started {
            debug!("Game {}: action from player {} before start", self.id, player);
            return false;
        }

        if let Some(previous) = self.pending_actions.insert(player, action) {
            debug!(
                "Game {}: player {} replaced pending action {:?} with {:?}",
                self.id, player, previous, action
            );
        }

        self.maybe_tick(now)
    }

    fn ready_to_tick(&self) -> bool {
        !self.players.is_empty()
            && self
                .players
                .iter()
                .all(|p| self.pending_actions.contains_key(&p.id))
    }

    fn maybe_tick(&mut self, now: Instant) -> bool {
        if !self.ready_to_tick() {
            return false;
        }

        self.tick();
        self.pending_actions.clear();
        self.schedule_broadcast(now);
        true
    }

    /// Advances the world by one step using the buffered actions.
    pub fn tick(&mut self) {
        for (player, action) in &self.pending_actions {
            if let Some(direction) = action.direction {
                if let Some(snake) = self.grid.snake_mut(*player) {
                    snake.set_direction(direction);
                }
            }
        }

        self.grid.grow_snakes();

        let mut fed = HashSet::new();
        let mut eaten = 0;
        let players: Vec<PlayerId> = self.grid.snakes().iter().map(|s| s.player()).collect();

        for player in players {
            let collisions = match self.grid.snake(player) {
                Some(snake) => snake.head_collision(&self.grid),
                None => continue,
            };

            if collisions.iter().any(Collision::deadly) {
                info!("Game {}: player {} crashed on tick {}", self.id, player, self.tick + 1);
                let game_over = Response::game_over();
                if !self.responses.contains(&game_over) {
                    self.responses.push(game_over);
                }
            }

            for collision in collisions {
                if let Collision::Food(food) = collision {
                    fed.insert(player);
                    if self.grid.remove_food(food) {
                        eaten += 1;
                    }
                }
            }
        }

        self.grid.settle_snakes(&fed);

        // Respawn only once growth has settled so the length cap sees it
        for _ in 0..eaten {
            if let Err(e) = self.grid.add_food() {
                warn!("Game {}: could not respawn food: {}", self.id, e);
            }
        }
        self.tick += 1;
        debug!("Game {}: tick {} ({} fed)", self.id, self.tick, fed.len());
    }

    /// Sends a snapshot now if the throttle allows it, otherwise (re)arms the
    /// deferred broadcast for the remaining interval.
    pub fn schedule_broadcast(&mut self, now: Instant) {
        match self.throttle.wait(now) {
            None => self.broadcast_state(now),
            Some(wait) => {
                self.deferred
                    .schedule(self.id, wait, self.channels.broadcast_due.clone());
            }
        }
    }

    /// Handles a fired deferred broadcast. Stale firings are ignored.
    pub fn fire_deferred_broadcast(&mut self, now: Instant) -> bool {
        if !self.deferred.is_pending() {
            debug!("Game {}: ignoring superseded broadcast timer", self.id);
            return false;
        }
        // A replaced timer can fire before its successor; the successor stays armed
        if self.throttle.wait(now).is_some() {
            debug!("Game {}: ignoring early broadcast timer", self.id);
            return false;
        }
        self.deferred.take_fired();
        self.broadcast_state(now);
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            grid: self.grid.snapshot(),
            responses: self.responses.clone(),
        }
    }

    /// Sends the current snapshot to every connection and clears the
    /// response queue.
    pub fn broadcast_state(&mut self, now: Instant) {
        self.deferred.cancel();

        let packet = Packet::GameState {
            snapshot: self.snapshot(),
        };
        let message = GameMessage::BroadcastPacket {
            packet,
            targets: self.connections.clone(),
        };
        if let Err(e) = self.channels.outbound.send(message) {
            warn!("Game {}: failed to queue broadcast: {}", self.id, e);
        }

        self.responses.clear();
        self.throttle.record(now);
    }

    /// Stops broadcasting to `connection`. The player stays seated.
    pub fn close_socket(&mut self, connection: Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| *c != connection);
        let removed = self.connections.len() != before;
        if removed {
            info!("Game {}: connection {} closed", self.id, connection);
        }
        removed
    }
}
