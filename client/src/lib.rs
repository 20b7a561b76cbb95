//! # Grid Snake Bot Client
//!
//! A headless player for the grid snake server. It connects over UDP, waits
//! for its seat to be confirmed and then answers every snapshot with exactly
//! one action, which is what the server's turn barrier expects.
//!
//! ## Module Organization
//!
//! ### Bot Module (`bot`)
//! The direction policy. It is a pure function of the latest snapshot: keep
//! the current heading while the cell ahead is safe, otherwise turn towards
//! the first neighbour that is not deadly.
//!
//! ### Network Module (`network`)
//! Connection handling and the receive loop:
//! - Connect handshake and protocol version
//! - One action per received snapshot
//! - Periodic heartbeats so the seat survives while the game fills up
//! - Session end on `gameOver`, disconnect, or an optional tick limit
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:8080", None).await?;
//!     let outcome = client.run().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod network;
