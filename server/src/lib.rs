//! # Grid Snake Server Library
//!
//! This library provides the authoritative server for a turn-synchronized,
//! multiplayer snake game played on a bounded grid. Clients submit one action
//! per round; once every seated player has acted the server advances the
//! simulation by a single tick and broadcasts the resulting state.
//!
//! ## Core Responsibilities
//!
//! ### Lockstep Simulation
//! A game only advances when all of its players have submitted an action for
//! the current round. Each tick applies directions, grows every snake by one
//! cell, resolves head collisions (boundary, snakes, food) and then shrinks
//! every snake that did not eat.
//!
//! ### Game Routing
//! New clients are seated in the oldest game with a free seat. A game starts
//! as soon as it is full and is evicted once no connection is left open.
//!
//! ### Rate-Limited Broadcasting
//! Snapshots are sent at most once per tick interval per game. A broadcast
//! requested too early is deferred, and later requests replace the pending one
//! so clients always receive the latest state.
//!
//! ## Module Organization
//!
//! - `grid`: board cells, occupants and collision queries
//! - `snake` / `food`: the two kinds of grid occupants
//! - `game`: turn barrier, tick pipeline and broadcast scheduling
//! - `broadcast`: throttle and the cancellable deferred-send timer
//! - `registry`: ownership of every running game
//! - `client_manager`: address to player mapping and idle timeouts
//! - `network`: the UDP transport and main event loop
//! - `config` / `error` / `player`: supporting types
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Two-player games on a 40x40 grid, at most 64 connected clients
//!     let mut server = Server::new("127.0.0.1:8080", GameConfig::default(), 64).await?;
//!
//!     // Runs until the process is stopped:
//!     // - routes connecting clients into games
//!     // - forwards actions to their game's turn barrier
//!     // - flushes deferred broadcasts when they come due
//!     // - drops clients that stay silent for too long
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod client_manager;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod network;
pub mod player;
pub mod registry;
pub mod snake;
