use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_MAX_PLAYERS: usize = 2;
pub const DEFAULT_GRID_SIZE: u16 = 40;
pub const DEFAULT_SNAKE_LENGTH: usize = 5;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
/// Largest grid side whose fully packed snapshot still fits in a single UDP
/// datagram (see [`snapshot_size_bound`]).
pub const MAX_GRID_SIZE: u16 = 50;
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

// Encoded sizes of the snapshot parts (bincode, fixed-width integers)
const PACKET_TAG_SIZE: usize = 4;
const VEC_LEN_SIZE: usize = 8;
const PLAIN_CELL_SIZE: usize = 11;
const TYPED_CELL_SIZE: usize = 15;
const SNAKE_HEADER_SIZE: usize = 26;
const FOOD_STATE_SIZE: usize = 22 + TYPED_CELL_SIZE;
const RESPONSE_SIZE: usize = 4;

/// Largest encoded `Packet::GameState` a game on a `rows` x `cols` grid with
/// `players` snakes can produce.
///
/// Relies on what a game guarantees about its snapshots: the summed body
/// length never exceeds the interior cell count, at most one food is on the
/// board and at most one response is queued. Every body cell is assumed to be
/// an edge-typed cell, the largest encoding a cell has.
pub fn snapshot_size_bound(rows: u16, cols: u16, players: usize) -> usize {
    let (rows, cols) = (rows as usize, cols as usize);
    let interior = rows.saturating_sub(2) * cols.saturating_sub(2);
    let edge = rows * cols - interior;

    let board =
        VEC_LEN_SIZE + rows * VEC_LEN_SIZE + edge * TYPED_CELL_SIZE + interior * PLAIN_CELL_SIZE;
    let snakes = VEC_LEN_SIZE + players * SNAKE_HEADER_SIZE + interior * TYPED_CELL_SIZE;
    let foods = VEC_LEN_SIZE + FOOD_STATE_SIZE;
    let responses = VEC_LEN_SIZE + RESPONSE_SIZE;

    // tag, tick, rows, cols
    PACKET_TAG_SIZE + 8 + 2 + 2 + board + snakes + foods + responses
}

pub type PlayerId = u32;
pub type GameId = u32;
pub type FoodId = u64;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step as `(row, col)` deltas.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
    Red,
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Skyblue,
}

impl Color {
    pub const PLAYER_PALETTE: [Color; 6] = [
        Color::Blue,
        Color::Green,
        Color::Purple,
        Color::Orange,
        Color::Pink,
        Color::Skyblue,
    ];
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CollideType {
    Edge,
    Snake,
    Food,
}

/// One grid position. Only boundary cells carry static collision flags.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: u16,
    pub col: u16,
    pub collideable: bool,
    pub collide_type: Option<CollideType>,
    pub deadly: bool,
    pub color: Color,
}

impl Cell {
    pub fn new(row: u16, col: u16) -> Self {
        Self {
            row,
            col,
            collideable: false,
            collide_type: None,
            deadly: false,
            color: Color::White,
        }
    }

    pub fn edge(row: u16, col: u16) -> Self {
        Self {
            row,
            col,
            collideable: true,
            collide_type: Some(CollideType::Edge),
            deadly: true,
            color: Color::Black,
        }
    }

    pub fn at(&self, row: u16, col: u16) -> bool {
        self.row == row && self.col == col
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnakeState {
    pub player: PlayerId,
    pub color: Color,
    /// Tail first, head last.
    pub body: Vec<Cell>,
    pub direction: Direction,
    pub collideable: bool,
    pub collide_type: CollideType,
    pub deadly: bool,
}

impl SnakeState {
    pub fn head(&self) -> Option<&Cell> {
        self.body.last()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FoodState {
    pub id: FoodId,
    #[serde(rename = "box")]
    pub position: Cell,
    pub row: u16,
    pub col: u16,
    pub color: Color,
    pub collideable: bool,
    pub collide_type: CollideType,
    pub deadly: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    pub rows: u16,
    pub cols: u16,
    pub grid: Vec<Vec<Cell>>,
    pub snakes: Vec<SnakeState>,
    pub foods: Vec<FoodState>,
}

impl GridSnapshot {
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        self.grid.get(row as usize)?.get(col as usize)
    }

    pub fn snake(&self, player: PlayerId) -> Option<&SnakeState> {
        self.snakes.iter().find(|s| s.player == player)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResponseKind {
    GameOver,
}

/// Game-wide event produced during a tick, delivered with the next snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
}

impl Response {
    pub fn game_over() -> Self {
        Self {
            kind: ResponseKind::GameOver,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: u64,
    pub grid: GridSnapshot,
    pub responses: Vec<Response>,
}

impl Snapshot {
    pub fn is_game_over(&self) -> bool {
        self.responses
            .iter()
            .any(|r| r.kind == ResponseKind::GameOver)
    }
}

/// A player's move for one round. `None` keeps the current heading.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Action {
    pub direction: Option<Direction>,
}

impl Action {
    pub fn turn(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
        }
    }

    pub fn keep() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    Action {
        direction: Option<Direction>,
    },
    /// Keeps an idle connection alive while a game waits for players
    Heartbeat,
    Disconnect,

    Connected {
        player_id: PlayerId,
        game_id: GameId,
        color: Color,
    },
    GameState {
        snapshot: Snapshot,
    },
    Disconnected {
        reason: String,
    },
}
