use crate::error::GridError;
use crate::grid::{Board, Collision, Grid, GridId};
use crate::player::Player;
use rand::seq::SliceRandom;
use shared::{Cell, CollideType, Color, Direction, PlayerId, SnakeState};
use std::collections::VecDeque;

/// One player's body on the grid, tail at the front and head at the back.
///
/// The body always holds at least the head: it starts with one cell and
/// `shrink` never drops the last one.
#[derive(Debug, Clone)]
pub struct Snake {
    player: PlayerId,
    grid: GridId,
    color: Color,
    body: VecDeque<Cell>,
    direction: Direction,
    /// Set by a successful `grow` until the matching `shrink` or `feed`
    pending_growth: bool,
}

impl Snake {
    fn new(grid: GridId, player: &Player, head: Cell, direction: Direction) -> Self {
        Self {
            player: player.id,
            grid,
            color: player.color,
            body: VecDeque::from([head]),
            direction,
            pending_growth: false,
        }
    }

    /// Builds a snake of `length` cells on free cells of `grid`.
    ///
    /// Each attempt picks a free head and a random heading, extends the body
    /// forward, and is discarded if any resulting cell is occupied.
    pub fn place(grid: &mut Grid, player: &Player, length: usize) -> Result<Self, GridError> {
        let attempts = grid.placement_attempts();

        for _ in 0..attempts {
            let head = grid.random_box()?;
            let direction = *Direction::ALL
                .choose(grid.rng_mut())
                .unwrap_or(&Direction::Right);

            let mut snake = Snake::new(grid.id(), player, head, direction);
            for _ in 1..length {
                snake.grow(grid.board());
            }
            snake.pending_growth = false;

            let free = snake.body.iter().all(|c| grid.box_available(c.row, c.col));
            if free && snake.len() == length {
                return Ok(snake);
            }
        }

        Err(GridError::Saturated { attempts })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn grid_id(&self) -> GridId {
        self.grid
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false for a placed snake; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn body(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    /// The body is never empty, so the head always exists.
    pub fn head(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn tail(&self) -> Cell {
        self.body[0]
    }

    pub fn has_pending_growth(&self) -> bool {
        self.pending_growth
    }

    /// Extends the head one cell along the current heading.
    ///
    /// Returns false and leaves the body untouched when the next position is
    /// off the board.
    pub fn grow(&mut self, board: &Board) -> bool {
        let head = self.head();
        let (dr, dc) = self.direction.offset();

        match board.from_coords(head.row as i32 + dr, head.col as i32 + dc) {
            Some(next) => {
                self.body.push_back(next);
                self.pending_growth = true;
                true
            }
            None => false,
        }
    }

    /// Drops the tail cell. A single-cell snake keeps its only cell.
    pub fn shrink(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_front();
        }
        self.pending_growth = false;
    }

    /// Keeps the cell gained by the last `grow`.
    pub fn feed(&mut self) {
        self.pending_growth = false;
    }

    pub fn contains(&self, row: u16, col: u16) -> bool {
        self.body.iter().any(|c| c.at(row, col))
    }

    pub fn contains_without_head(&self, row: u16, col: u16) -> bool {
        let end = self.body.len().saturating_sub(1);
        self.body.range(..end).any(|c| c.at(row, col))
    }

    /// Occupancy test a snake applies to itself: the head never counts, and
    /// while a growth step is pending the tail is about to be vacated and does
    /// not count either.
    pub fn overlaps_self(&self, row: u16, col: u16) -> bool {
        if !self.pending_growth {
            return self.contains_without_head(row, col);
        }
        let end = self.body.len().saturating_sub(1);
        self.body.range(1usize.min(end)..end).any(|c| c.at(row, col))
    }

    /// Everything the head currently overlaps, including the snake's own body.
    pub fn head_collision(&self, grid: &Grid) -> Vec<Collision> {
        debug_assert_eq!(self.grid, grid.id());
        let head = self.head();
        grid.get_collisions(head.row, head.col, Some(self.player))
    }

    pub fn state(&self) -> SnakeState {
        SnakeState {
            player: self.player,
            color: self.color,
            body: self.body.iter().copied().collect(),
            direction: self.direction,
            collideable: true,
            collide_type: CollideType::Snake,
            deadly: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_cells(
        grid: GridId,
        player: &Player,
        cells: &[(u16, u16)],
        direction: Direction,
    ) -> Self {
        Self {
            player: player.id,
            grid,
            color: player.color,
            body: cells.iter().map(|&(row, col)| Cell::new(row, col)).collect(),
            direction,
            pending_growth: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_grid() -> Grid {
        Grid::new(GridId(3), 10, 10, 100, StdRng::seed_from_u64(21))
    }

    fn player() -> Player {
        Player::new(1, Color::Purple)
    }

    #[test]
    fn test_grow_moves_head_along_heading() {
        let grid = test_grid();
        let mut snake = Snake::from_cells(grid.id(), &player(), &[(4, 4)], Direction::Right);

        assert!(snake.grow(grid.board()));
        assert_eq!((snake.head().row, snake.head().col), (4, 5));

        snake.set_direction(Direction::Down);
        assert!(snake.grow(grid.board()));
        assert_eq!((snake.head().row, snake.head().col), (5, 5));

        snake.set_direction(Direction::Left);
        assert!(snake.grow(grid.board()));
        assert_eq!((snake.head().row, snake.head().col), (5, 4));

        snake.set_direction(Direction::Up);
        assert!(snake.grow(grid.board()));
        assert_eq!((snake.head().row, snake.head().col), (4, 4));
        assert_eq!(snake.len(), 5);
    }

    #[test]
    fn test_grow_off_board_is_noop() {
        let grid = test_grid();
        let mut snake = Snake::from_cells(grid.id(), &player(), &[(1, 0), (0, 0)], Direction::Up);

        assert!(!snake.grow(grid.board()));
        assert_eq!(snake.len(), 2);
        assert!(!snake.has_pending_growth());
        assert_eq!((snake.head().row, snake.head().col), (0, 0));
    }

    #[test]
    fn test_shrink_drops_tail() {
        let grid = test_grid();
        let mut snake = Snake::from_cells(grid.id(), &player(), &[(2, 2), (2, 3)], Direction::Right);
        snake.grow(grid.board());
        snake.shrink();

        let cells: Vec<(u16, u16)> = snake.body().map(|c| (c.row, c.col)).collect();
        assert_eq!(cells, vec![(2, 3), (2, 4)]);

        snake.shrink();
        snake.shrink();
        assert_eq!(snake.len(), 1);
        assert!(!snake.is_empty());
        assert_eq!((snake.head().row, snake.head().col), (2, 4));
    }

    #[test]
    fn test_contains_without_head() {
        let snake = Snake::from_cells(
            GridId(3),
            &player(),
            &[(2, 2), (2, 3), (2, 4)],
            Direction::Right,
        );
        assert!(snake.contains(2, 4));
        assert!(!snake.contains_without_head(2, 4));
        assert!(snake.contains_without_head(2, 2));
        assert!(snake.contains_without_head(2, 3));
        assert!(!snake.contains(3, 3));
    }

    #[test]
    fn test_head_onto_vacating_tail_is_not_self_collision() {
        let mut grid = test_grid();
        // 2x2 loop: the head moves into the cell the tail leaves this tick
        let mut snake = Snake::from_cells(
            grid.id(),
            &player(),
            &[(3, 3), (3, 4), (4, 4), (4, 3)],
            Direction::Up,
        );
        assert!(snake.grow(grid.board()));
        assert_eq!(snake.head(), snake.tail());
        grid.insert_snake(snake);

        let collisions = grid.snake(1).unwrap().head_collision(&grid);
        assert!(collisions.is_empty());
    }

    #[test]
    fn test_head_onto_own_body_is_self_collision() {
        let mut grid = test_grid();
        let mut snake = Snake::from_cells(
            grid.id(),
            &player(),
            &[(2, 3), (3, 3), (3, 4), (4, 4), (4, 3)],
            Direction::Up,
        );
        assert!(snake.grow(grid.board()));
        grid.insert_snake(snake);

        let collisions = grid.snake(1).unwrap().head_collision(&grid);
        assert_eq!(collisions, vec![Collision::Snake(1)]);
        assert!(collisions[0].deadly());
    }

    #[test]
    fn test_head_collision_with_wall() {
        let mut grid = test_grid();
        let mut snake = Snake::from_cells(grid.id(), &player(), &[(2, 1), (1, 1)], Direction::Up);
        assert!(snake.grow(grid.board()));
        grid.insert_snake(snake);

        let collisions = grid.snake(1).unwrap().head_collision(&grid);
        assert_eq!(collisions.len(), 1);
        assert!(matches!(collisions[0], Collision::Wall(_)));
        assert!(collisions[0].deadly());
    }

    #[test]
    fn test_place_builds_straight_free_body() {
        let mut grid = test_grid();
        let snake = Snake::place(&mut grid, &player(), 5).unwrap();

        assert_eq!(snake.len(), 5);
        assert!(!snake.has_pending_growth());
        assert_eq!(snake.grid_id(), grid.id());

        let cells: Vec<Cell> = snake.body().copied().collect();
        let (dr, dc) = snake.direction().offset();
        for pair in cells.windows(2) {
            assert_eq!(pair[1].row as i32 - pair[0].row as i32, dr);
            assert_eq!(pair[1].col as i32 - pair[0].col as i32, dc);
            assert!(!pair[1].collideable);
        }
    }

    #[test]
    fn test_place_fails_when_no_room() {
        // 5x5 has a 3x3 interior, so a length-4 body can never fit
        let mut grid = Grid::new(GridId(1), 5, 5, 25, StdRng::seed_from_u64(2));
        assert_eq!(
            Snake::place(&mut grid, &player(), 4).unwrap_err(),
            GridError::Saturated { attempts: 25 }
        );
    }

    #[test]
    fn test_state_omits_grid_link() {
        let snake = Snake::from_cells(GridId(8), &player(), &[(1, 1), (1, 2)], Direction::Right);
        let state = snake.state();
        assert_eq!(state.player, 1);
        assert_eq!(state.color, Color::Purple);
        assert_eq!(state.body.len(), 2);
        assert_eq!(state.collide_type, CollideType::Snake);
        assert!(state.deadly);
    }
}
