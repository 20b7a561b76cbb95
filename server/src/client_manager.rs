//! Connection tracking for the UDP transport
//!
//! This module maps network addresses to the player and game they belong to:
//! - Client connection lifecycle (connect, disconnect, timeout)
//! - Activity tracking so silent clients can be dropped
//! - A server-wide cap on concurrent connections
//!
//! Game membership itself lives in the registry; this module only knows
//! which address speaks for which player.

use log::info;
use shared::{GameId, PlayerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Represents a connected client and the seat it holds
#[derive(Debug, Clone)]
pub struct Client {
    /// Player identity assigned on connect
    pub player_id: PlayerId,
    /// Game the player was routed to
    pub game_id: GameId,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(player_id: PlayerId, game_id: GameId, addr: SocketAddr) -> Self {
        Self {
            player_id,
            game_id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Checks if the client has exceeded the connection timeout
    ///
    /// Returns true if no packets have been received from this client
    /// within the specified timeout duration, indicating a likely disconnect.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients
///
/// Enforces the server's connection cap and lets the network layer resolve
/// an incoming datagram's address to its player and game.
pub struct ClientManager {
    /// Connected clients indexed by player ID
    clients: HashMap<PlayerId, Client>,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.clients.len() < self.max_clients
    }

    /// Records a new connection. Returns false if the server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr, player_id: PlayerId, game_id: GameId) -> bool {
        if !self.has_capacity() {
            return false;
        }

        info!(
            "Client {} connected as player {} in game {}",
            addr, player_id, game_id
        );
        self.clients
            .insert(player_id, Client::new(player_id, game_id, addr));
        true
    }

    /// Removes a client and returns it, if it was still connected
    pub fn remove_client(&mut self, player_id: &PlayerId) -> Option<Client> {
        let client = self.clients.remove(player_id)?;
        info!("Client {} (player {}) disconnected", client.addr, client.player_id);
        Some(client)
    }

    /// Finds the client speaking from the given network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<&Client> {
        self.clients.values().find(|client| client.addr == addr)
    }

    /// Refreshes the activity timestamp of the client at `addr`
    ///
    /// Returns the refreshed client, or None for unknown addresses.
    pub fn touch(&mut self, addr: SocketAddr) -> Option<&Client> {
        let client = self.clients.values_mut().find(|client| client.addr == addr)?;
        client.last_seen = Instant::now();
        Some(&*client)
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns the removed clients so their connections can be closed in
    /// the games they belonged to.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<Client> {
        let timed_out: Vec<PlayerId> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .iter()
            .filter_map(|id| self.remove_client(id))
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_client_creation() {
        let addr = test_addr();
        let client = Client::new(1, 3, addr);

        assert_eq!(client.player_id, 1);
        assert_eq!(client.game_id, 3);
        assert_eq!(client.addr, addr);
    }

    #[test]
    fn test_client_timeout() {
        let mut client = Client::new(1, 1, test_addr());

        assert!(!client.is_timed_out(Duration::from_secs(1)));

        client.last_seen = Instant::now() - Duration::from_secs(2);

        assert!(client.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new(5);
        assert_eq!(manager.max_clients, 5);
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_add_client_max_capacity() {
        let mut manager = ClientManager::new(1);

        assert!(manager.add_client(test_addr(), 1, 1));
        assert_eq!(manager.len(), 1);

        assert!(!manager.add_client(test_addr2(), 2, 1));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_remove_client() {
        let mut manager = ClientManager::new(2);
        manager.add_client(test_addr(), 7, 2);

        let removed = manager.remove_client(&7).unwrap();
        assert_eq!(removed.game_id, 2);
        assert!(manager.is_empty());
        assert!(manager.remove_client(&7).is_none());
    }

    #[test]
    fn test_find_client_by_addr() {
        let mut manager = ClientManager::new(2);
        manager.add_client(test_addr(), 1, 1);
        manager.add_client(test_addr2(), 2, 1);

        let found = manager.find_client_by_addr(test_addr()).unwrap();
        assert_eq!(found.player_id, 1);

        let unknown_addr: SocketAddr = "192.168.1.1:9999".parse().unwrap();
        assert!(manager.find_client_by_addr(unknown_addr).is_none());
    }

    #[test]
    fn test_touch_refreshes_last_seen() {
        let mut manager = ClientManager::new(2);
        manager.add_client(test_addr(), 1, 1);
        manager.clients.get_mut(&1).unwrap().last_seen = Instant::now() - Duration::from_secs(10);

        assert!(manager.touch(test_addr()).is_some());
        assert!(manager.touch(test_addr2()).is_none());
        assert!(manager.check_timeouts(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_check_timeouts_removes_silent_clients() {
        let mut manager = ClientManager::new(3);
        manager.add_client(test_addr(), 1, 1);
        manager.add_client(test_addr2(), 2, 1);
        manager.clients.get_mut(&2).unwrap().last_seen = Instant::now() - Duration::from_secs(10);

        let removed = manager.check_timeouts(Duration::from_secs(5));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].player_id, 2);
        assert_eq!(manager.len(), 1);
    }
}
