use clap::Parser;
use log::info;
use server::config::GameConfig;
use server::network::Server;
use shared::{
    DEFAULT_GRID_SIZE, DEFAULT_MAX_PLAYERS, DEFAULT_SNAKE_LENGTH, DEFAULT_TICK_INTERVAL_MS,
};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Players per game; a game starts once it is full
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_PLAYERS)]
    max_players: usize,

    /// Side length of the square grid, boundary included
    #[arg(short, long, default_value_t = DEFAULT_GRID_SIZE)]
    grid_size: u16,

    /// Body length of a freshly spawned snake
    #[arg(short = 'l', long, default_value_t = DEFAULT_SNAKE_LENGTH)]
    snake_length: usize,

    /// Minimum milliseconds between two snapshots of the same game
    #[arg(short, long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_interval_ms: u64,

    /// Maximum number of concurrently connected clients
    #[arg(short = 'c', long, default_value = "64")]
    max_clients: usize,

    /// Fixed RNG seed for reproducible placements
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = GameConfig {
        max_players: args.max_players,
        rows: args.grid_size,
        cols: args.grid_size,
        snake_length: args.snake_length,
        tick_interval: Duration::from_millis(args.tick_interval_ms),
        seed: args.seed,
        ..GameConfig::default()
    };

    info!(
        "Starting server: {} players per game, {}x{} grid, {}ms tick interval",
        config.max_players, config.rows, config.cols, args.tick_interval_ms
    );

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, config, args.max_clients).await?;

    server.run().await?;

    Ok(())
}
