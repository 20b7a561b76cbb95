use clap::Parser;
use client::network::{Client, Outcome};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Leave the game after this many ticks
    #[arg(short = 't', long)]
    max_ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting bot...");
    info!("Connecting to: {}", args.server);

    let mut client = Client::new(&args.server, args.max_ticks).await?;

    match client.run().await? {
        Outcome::GameOver { tick } => info!("Game ended at tick {}", tick),
        Outcome::TickLimit { tick } => info!("Left the game at tick {}", tick),
        Outcome::Disconnected { reason } => {
            return Err(format!("server closed the connection: {}", reason).into())
        }
    }

    Ok(())
}
