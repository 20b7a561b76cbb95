use crate::bot::choose_direction;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{GameId, Packet, PlayerId, Snapshot, MAX_DATAGRAM_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::interval;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// How a bot's session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A snapshot carried a `gameOver` response
    GameOver { tick: u64 },
    /// The server refused or dropped the connection
    Disconnected { reason: String },
    /// The configured tick limit was reached first
    TickLimit { tick: u64 },
}

pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    player_id: Option<PlayerId>,
    game_id: Option<GameId>,
    max_ticks: Option<u64>,
    snapshots_received: u64,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        max_ticks: Option<u64>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            player_id: None,
            game_id: None,
            max_ticks,
            snapshots_received: 0,
        })
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Replies to a snapshot with one action, unless the session is over
    async fn handle_snapshot(
        &mut self,
        snapshot: Snapshot,
    ) -> Result<Option<Outcome>, Box<dyn std::error::Error>> {
        self.snapshots_received += 1;

        if snapshot.is_game_over() {
            info!("Game over at tick {}", snapshot.tick);
            return Ok(Some(Outcome::GameOver { tick: snapshot.tick }));
        }

        if let Some(limit) = self.max_ticks {
            if snapshot.tick >= limit {
                info!("Tick limit {} reached", limit);
                return Ok(Some(Outcome::TickLimit { tick: snapshot.tick }));
            }
        }

        let Some(player_id) = self.player_id else {
            warn!("Snapshot arrived before the connection was confirmed");
            return Ok(None);
        };

        let direction = choose_direction(&snapshot, player_id);
        debug!("Tick {}: sending {:?}", snapshot.tick, direction);
        self.send_packet(&Packet::Action { direction }).await?;

        Ok(None)
    }

    async fn handle_packet(
        &mut self,
        packet: Packet,
    ) -> Result<Option<Outcome>, Box<dyn std::error::Error>> {
        match packet {
            Packet::Connected {
                player_id,
                game_id,
                color,
            } => {
                info!(
                    "Connected as player {} ({:?}) in game {}",
                    player_id, color, game_id
                );
                self.player_id = Some(player_id);
                self.game_id = Some(game_id);
                Ok(None)
            }

            Packet::GameState { snapshot } => self.handle_snapshot(snapshot).await,

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.player_id = None;
                Ok(Some(Outcome::Disconnected { reason }))
            }

            _ => {
                warn!("Unexpected packet type");
                Ok(None)
            }
        }
    }

    /// Plays one game and reports how it ended
    pub async fn run(&mut self) -> Result<Outcome, Box<dyn std::error::Error>> {
        info!("Connecting to server at {}...", self.server_addr);
        self.send_packet(&Packet::Connect {
            client_version: PROTOCOL_VERSION,
        })
        .await?;

        let mut heartbeat_interval = interval(HEARTBEAT_INTERVAL);
        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

        let outcome = loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => {
                                if let Some(outcome) = self.handle_packet(packet).await? {
                                    break outcome;
                                }
                            }
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        },
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                _ = heartbeat_interval.tick() => {
                    if self.player_id.is_some() {
                        self.send_packet(&Packet::Heartbeat).await?;
                    }
                },
            }
        };

        if matches!(outcome, Outcome::TickLimit { .. }) {
            let _ = self.send_packet(&Packet::Disconnect).await;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Color, GridSnapshot, Response};
    use tokio_test::{assert_err, assert_ok, block_on};

    fn snapshot(tick: u64, responses: Vec<Response>) -> Snapshot {
        Snapshot {
            tick,
            grid: GridSnapshot {
                rows: 0,
                cols: 0,
                grid: vec![],
                snakes: vec![],
                foods: vec![],
            },
            responses,
        }
    }

    #[test]
    fn test_new_rejects_invalid_server_address() {
        assert_err!(block_on(Client::new("not-an-address", None)).map(|_| ()));
    }

    #[test]
    fn test_packets_drive_session_outcome() {
        block_on(async {
            let mut client = assert_ok!(Client::new("127.0.0.1:9", Some(5)).await);
            assert_eq!(client.player_id(), None);

            let connected = Packet::Connected {
                player_id: 3,
                game_id: 1,
                color: Color::Blue,
            };
            assert_eq!(assert_ok!(client.handle_packet(connected).await), None);
            assert_eq!(client.player_id(), Some(3));
            assert_eq!(client.game_id(), Some(1));

            let limit = Packet::GameState {
                snapshot: snapshot(5, vec![]),
            };
            assert_eq!(
                assert_ok!(client.handle_packet(limit).await),
                Some(Outcome::TickLimit { tick: 5 })
            );

            let over = Packet::GameState {
                snapshot: snapshot(2, vec![Response::game_over()]),
            };
            assert_eq!(
                assert_ok!(client.handle_packet(over).await),
                Some(Outcome::GameOver { tick: 2 })
            );
            assert_eq!(client.snapshots_received(), 2);

            let reason = "Server full".to_string();
            let dropped = Packet::Disconnected {
                reason: reason.clone(),
            };
            assert_eq!(
                assert_ok!(client.handle_packet(dropped).await),
                Some(Outcome::Disconnected { reason })
            );
            assert_eq!(client.player_id(), None);
        });
    }
}
