//! The shared board and its dynamic occupants.
//!
//! A [`Grid`] owns the static [`Board`] of cells together with every snake and
//! food currently placed on it, and answers the collision and placement
//! queries the tick loop relies on. Occupants never hold a handle to their
//! grid; they carry the grid's [`GridId`] and receive the grid (or its board)
//! as an argument whenever they need to look something up.

use crate::error::GridError;
use crate::food::Food;
use crate::player::Player;
use crate::snake::Snake;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Cell, CollideType, FoodId, GridSnapshot, PlayerId};
use std::collections::HashSet;

/// Identifier an occupant stores instead of a reference to its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridId(pub u32);

/// Something found at a queried position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// A statically collideable board cell
    Wall(Cell),
    Snake(PlayerId),
    Food(FoodId),
}

impl Collision {
    pub fn collide_type(&self) -> CollideType {
        match self {
            Collision::Wall(cell) => cell.collide_type.unwrap_or(CollideType::Edge),
            Collision::Snake(_) => CollideType::Snake,
            Collision::Food(_) => CollideType::Food,
        }
    }

    pub fn deadly(&self) -> bool {
        match self {
            Collision::Wall(cell) => cell.deadly,
            Collision::Snake(_) => true,
            Collision::Food(_) => false,
        }
    }
}

/// Fixed arrangement of cells; the outer ring is a deadly wall.
#[derive(Debug, Clone)]
pub struct Board {
    rows: u16,
    cols: u16,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(rows: u16, cols: u16) -> Self {
        let cells = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        let boundary = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
                        if boundary {
                            Cell::edge(row, col)
                        } else {
                            Cell::new(row, col)
                        }
                    })
                    .collect()
            })
            .collect();

        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Returns the cell at `(row, col)`, or `None` when either index is off the board.
    pub fn from_coords(&self, row: i32, col: i32) -> Option<Cell> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.cells.get(row)?.get(col).copied()
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.from_coords(row as i32, col as i32)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }
}

pub struct Grid {
    id: GridId,
    board: Board,
    snakes: Vec<Snake>,
    foods: Vec<Food>,
    next_food_id: FoodId,
    placement_attempts: usize,
    rng: StdRng,
}

impl Grid {
    pub fn new(id: GridId, rows: u16, cols: u16, placement_attempts: usize, rng: StdRng) -> Self {
        Self {
            id,
            board: Board::new(rows, cols),
            snakes: Vec::new(),
            foods: Vec::new(),
            next_food_id: 1,
            placement_attempts,
            rng,
        }
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn rows(&self) -> u16 {
        self.board.rows()
    }

    pub fn cols(&self) -> u16 {
        self.board.cols()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn snake(&self, player: PlayerId) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.player() == player)
    }

    pub fn snake_mut(&mut self, player: PlayerId) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.player() == player)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn placement_attempts(&self) -> usize {
        self.placement_attempts
    }

    /// Places a new snake for `player` on free cells.
    pub fn add_snake(&mut self, player: &Player, length: usize) -> Result<(), GridError> {
        let snake = Snake::place(self, player, length)?;
        debug!(
            "Grid {:?}: placed snake for player {} heading {:?}",
            self.id,
            player.id,
            snake.direction()
        );
        self.snakes.push(snake);
        Ok(())
    }

    /// Number of cells inside the boundary ring.
    pub fn interior_capacity(&self) -> usize {
        let rows = self.rows().saturating_sub(2) as usize;
        let cols = self.cols().saturating_sub(2) as usize;
        rows * cols
    }

    /// Summed body length of every snake. Bodies may overlap after crashes,
    /// so this can exceed the number of distinct occupied cells.
    pub fn occupied_len(&self) -> usize {
        self.snakes.iter().map(Snake::len).sum()
    }

    /// Places a new food on a free cell and returns its id.
    ///
    /// No food is placed once the snakes' summed length reaches the interior
    /// capacity, which keeps every snapshot within `snapshot_size_bound`.
    pub fn add_food(&mut self) -> Result<FoodId, GridError> {
        let (occupied, capacity) = (self.occupied_len(), self.interior_capacity());
        if occupied >= capacity {
            return Err(GridError::Crowded { occupied, capacity });
        }

        let id = self.next_food_id;
        let food = Food::place(self, id)?;
        self.next_food_id += 1;
        debug!(
            "Grid {:?}: food {} at ({}, {})",
            self.id,
            id,
            food.row(),
            food.col()
        );
        self.foods.push(food);
        Ok(id)
    }

    /// Removes a food by id. Returns false if it was already gone.
    pub fn remove_food(&mut self, id: FoodId) -> bool {
        let before = self.foods.len();
        self.foods.retain(|f| f.id() != id);
        self.foods.len() != before
    }

    /// Returns every occupant overlapping `(row, col)`.
    ///
    /// The snake owned by `requester` is tested with its self-exclusion rule
    /// (head and vacating tail ignored); every other occupant uses plain
    /// containment. Coordinates off the board yield no collisions.
    pub fn get_collisions(&self, row: u16, col: u16, requester: Option<PlayerId>) -> Vec<Collision> {
        let mut collisions = Vec::new();

        match self.board.cell(row, col) {
            Some(cell) if cell.collideable => collisions.push(Collision::Wall(cell)),
            Some(_) => {}
            None => return collisions,
        }

        for snake in &self.snakes {
            let hit = if Some(snake.player()) == requester {
                snake.overlaps_self(row, col)
            } else {
                snake.contains(row, col)
            };
            if hit {
                collisions.push(Collision::Snake(snake.player()));
            }
        }

        collisions.extend(
            self.foods
                .iter()
                .filter(|f| f.contains(row, col))
                .map(|f| Collision::Food(f.id())),
        );

        collisions
    }

    pub fn box_available(&self, row: u16, col: u16) -> bool {
        self.get_collisions(row, col, None).is_empty()
    }

    /// Draws a uniformly random free cell.
    ///
    /// Rejection sampling runs for at most `placement_attempts` draws; after
    /// that the remaining free cells are enumerated and one is picked
    /// uniformly, so a nearly full grid still places and a full one reports
    /// [`GridError::Saturated`].
    pub fn random_box(&mut self) -> Result<Cell, GridError> {
        let (rows, cols) = (self.rows(), self.cols());

        for _ in 0..self.placement_attempts {
            let row = self.rng.gen_range(0..rows);
            let col = self.rng.gen_range(0..cols);
            if self.box_available(row, col) {
                if let Some(cell) = self.board.cell(row, col) {
                    return Ok(cell);
                }
            }
        }

        let free: Vec<Cell> = self
            .board
            .iter()
            .filter(|c| self.box_available(c.row, c.col))
            .copied()
            .collect();

        free.choose(&mut self.rng)
            .copied()
            .ok_or(GridError::Saturated {
                attempts: self.placement_attempts,
            })
    }

    pub fn from_coords(&self, row: i32, col: i32) -> Option<Cell> {
        self.board.from_coords(row, col)
    }

    /// Advances every snake one cell along its heading.
    pub(crate) fn grow_snakes(&mut self) {
        for snake in &mut self.snakes {
            if !snake.grow(&self.board) {
                debug!(
                    "Snake of player {} blocked by the board edge",
                    snake.player()
                );
            }
        }
    }

    /// Completes the tick for every snake: fed snakes keep their new length,
    /// the rest drop the tail they grew past.
    pub(crate) fn settle_snakes(&mut self, fed: &HashSet<PlayerId>) {
        for snake in &mut self.snakes {
            if fed.contains(&snake.player()) {
                snake.feed();
            } else if snake.has_pending_growth() {
                snake.shrink();
            }
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            rows: self.rows(),
            cols: self.cols(),
            grid: self.board.cells.clone(),
            snakes: self.snakes.iter().map(Snake::state).collect(),
            foods: self.foods.iter().map(Food::state).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_snake(&mut self, snake: Snake) {
        self.snakes.push(snake);
    }

    #[cfg(test)]
    pub(crate) fn insert_food_at(&mut self, row: u16, col: u16) -> FoodId {
        let id = self.next_food_id;
        self.next_food_id += 1;
        let cell = self.board.cell(row, col).expect("food cell inside the board");
        self.foods.push(Food::at(id, cell));
        id
    }
}
