//! Server network layer handling UDP communications and game routing

use crate::client_manager::ClientManager;
use crate::config::GameConfig;
use crate::game::GameChannels;
use crate::registry::GameRegistry;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Action, GameId, Packet, MAX_DATAGRAM_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, Instant};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);
const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    ClientTimeout {
        addr: SocketAddr,
        game_id: GameId,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from games to the network sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        targets: Vec<SocketAddr>,
    },
}

/// Main server routing clients into games and relaying their traffic
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    registry: GameRegistry,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
    due_rx: mpsc::UnboundedReceiver<GameId>,
}

impl Server {
    pub async fn new(
        addr: &str,
        config: GameConfig,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (channels, game_rx, due_rx) = GameChannels::new();
        let game_tx = channels.outbound.clone();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            registry: GameRegistry::new(config, channels),
            server_tx,
            server_rx,
            game_tx,
            game_rx,
            due_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, &[addr]).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, targets } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, &targets).await {
                            error!("Failed to broadcast to {} clients: {}", targets.len(), e);
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    async fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts(CLIENT_TIMEOUT)
                };

                for client in timed_out {
                    let message = ServerMessage::ClientTimeout {
                        addr: client.addr,
                        game_id: client.game_id,
                    };
                    if let Err(e) = server_tx.send(message) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    /// Serializes once and sends the datagram to every target
    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        targets: &[SocketAddr],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(format!("packet of {} bytes exceeds datagram limit", data.len()).into());
        }

        for addr in targets {
            // A slow or gone client must not stop the others from receiving
            if let Err(e) = socket.send_to(&data, addr).await {
                warn!("Failed to send to {}: {}", addr, e);
            }
        }
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Closes the connection in its game and drops games nobody watches
    fn close_connection(&mut self, addr: SocketAddr, game_id: GameId) {
        if let Some(game) = self.registry.game_mut(game_id) {
            game.close_socket(addr);
        }
        self.registry.evict_abandoned();
    }

    /// Routes a new client into a game with a free seat
    async fn handle_connect(&mut self, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            let reason = "Protocol version mismatch".to_string();
            self.send_packet(Packet::Disconnected { reason }, addr);
            return;
        }

        // Remove existing connection if present
        let existing = {
            let clients = self.clients.read().await;
            clients.find_client_by_addr(addr).cloned()
        };

        if let Some(existing) = existing {
            info!(
                "Removing existing player {} from {}",
                existing.player_id, addr
            );
            self.clients.write().await.remove_client(&existing.player_id);
            self.close_connection(addr, existing.game_id);
        }

        if !self.clients.read().await.has_capacity() {
            let reason = "Server full".to_string();
            self.send_packet(Packet::Disconnected { reason }, addr);
            return;
        }

        let player = self.registry.new_player();
        let game = self.registry.find_or_create_game();
        let game_id = game.id();

        match game.join(addr, player) {
            Ok(()) => {
                self.clients
                    .write()
                    .await
                    .add_client(addr, player.id, game_id);
                let connected = Packet::Connected {
                    player_id: player.id,
                    game_id,
                    color: player.color,
                };
                self.send_packet(connected, addr);

                if let Some(game) = self.registry.game_mut(game_id) {
                    game.maybe_start(Instant::now());
                }
            }
            Err(e) => {
                error!("Player {} could not join game {}: {}", player.id, game_id, e);
                self.send_packet(
                    Packet::Disconnected {
                        reason: e.to_string(),
                    },
                    addr,
                );
                self.registry.evict_abandoned();
            }
        }
    }

    /// Processes incoming packets and forwards them to the owning game
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                self.handle_connect(client_version, addr).await;
            }

            Packet::Action { direction } => {
                let client = {
                    let mut clients = self.clients.write().await;
                    clients.touch(addr).cloned()
                };

                match client {
                    Some(client) => match self.registry.game_mut(client.game_id) {
                        Some(game) => {
                            game.receive(client.player_id, Action { direction });
                        }
                        None => warn!("Action for missing game {}", client.game_id),
                    },
                    None => debug!("Action from unknown address {}", addr),
                }
            }

            Packet::Heartbeat => {
                self.clients.write().await.touch(addr);
            }

            Packet::Disconnect => {
                let client = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr).cloned()
                };

                if let Some(client) = client {
                    self.clients.write().await.remove_client(&client.player_id);
                    self.close_connection(addr, client.game_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut stats_interval = interval(STATS_INTERVAL);

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { addr, game_id }) => {
                            info!("Client {} timed out", addr);
                            self.close_connection(addr, game_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Deferred broadcasts coming due
                Some(game_id) = self.due_rx.recv() => {
                    if let Some(game) = self.registry.game_mut(game_id) {
                        game.fire_deferred_broadcast(Instant::now());
                    }
                },

                // Periodic monitoring
                _ = stats_interval.tick() => {
                    let client_count = self.clients.read().await.len();
                    if client_count > 0 {
                        debug!("{} clients across {} games", client_count, self.registry.len());
                    }
                },
            }
        }

        Ok(())
    }
}
