//! Performance benchmarks for critical game systems

use rand::rngs::StdRng;
use rand::SeedableRng;
use server::config::GameConfig;
use server::game::{Game, GameChannels};
use server::grid::{Grid, GridId};
use server::player::Player;
use shared::{Action, Color, MAX_GRID_SIZE};
use std::time::Instant;

fn crowded_grid(size: u16, players: u32) -> Grid {
    let mut grid = Grid::new(GridId(1), size, size, 1000, StdRng::seed_from_u64(42));
    for id in 1..=players {
        grid.add_snake(&Player::new(id, Color::Blue), 5).unwrap();
    }
    grid.add_food().unwrap();
    grid
}

/// Benchmarks collision queries across the whole board
#[test]
fn benchmark_collision_queries() {
    let grid = crowded_grid(MAX_GRID_SIZE, 6);

    let start = Instant::now();
    let mut hits = 0usize;

    for row in 0..MAX_GRID_SIZE {
        for col in 0..MAX_GRID_SIZE {
            hits += grid.get_collisions(row, col, Some(1)).len();
        }
    }

    let duration = start.elapsed();
    println!(
        "Collision queries: {} cells in {:?} ({} hits)",
        MAX_GRID_SIZE as usize * MAX_GRID_SIZE as usize,
        duration,
        hits
    );

    // Boundary ring alone accounts for this many hits
    assert!(hits >= 4 * (MAX_GRID_SIZE as usize - 1));
    assert!(duration.as_millis() < 500);
}

/// Benchmarks random placement on a nearly empty board
#[test]
fn benchmark_food_placement() {
    let mut grid = crowded_grid(40, 4);

    let iterations = 500;
    let start = Instant::now();

    for _ in 0..iterations {
        let id = grid.add_food().unwrap();
        grid.remove_food(id);
    }

    let duration = start.elapsed();
    println!(
        "Food placement: {} placements in {:?} ({:.2} μs/placement)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 1000);
}

/// Benchmarks full rounds of a six-player game
#[test]
fn benchmark_game_rounds() {
    let (channels, mut outbound, _due) = GameChannels::new();
    let config = GameConfig {
        max_players: 6,
        tick_interval: std::time::Duration::ZERO,
        seed: Some(7),
        ..GameConfig::default()
    };
    let mut game = Game::new(1, config, channels);

    for id in 1..=6u32 {
        let addr = format!("127.0.0.1:{}", 9000 + id).parse().unwrap();
        game.join(addr, Player::new(id, Color::Pink)).unwrap();
    }
    assert!(game.maybe_start(tokio::time::Instant::now()));

    let rounds = 200;
    let start = Instant::now();

    for _ in 0..rounds {
        for id in 1..=6u32 {
            game.receive(id, Action::keep());
        }
        while outbound.try_recv().is_ok() {}
    }

    let duration = start.elapsed();
    println!(
        "Game rounds: {} rounds in {:?} ({:.2} μs/round)",
        rounds,
        duration,
        duration.as_micros() as f64 / rounds as f64
    );

    assert_eq!(game.tick_count(), rounds);
    assert!(duration.as_secs() < 5);
}

/// Benchmarks snapshot encoding of the largest grid
#[test]
fn benchmark_snapshot_serialization() {
    use bincode::{deserialize, serialize};
    use shared::{Packet, Snapshot};

    let grid = crowded_grid(MAX_GRID_SIZE, 6);
    let packet = Packet::GameState {
        snapshot: Snapshot {
            tick: 12345,
            grid: grid.snapshot(),
            responses: vec![],
        },
    };

    let iterations = 100;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot processing: {} roundtrips in {:?} ({:.2} μs/roundtrip)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 5);
}
