use crate::error::GridError;
use crate::grid::{Grid, GridId};
use shared::{Cell, CollideType, Color, FoodId, FoodState};

/// A single-cell pickup. Eating it replaces it with a fresh one elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Food {
    id: FoodId,
    grid: GridId,
    position: Cell,
}

impl Food {
    /// Samples a free cell of `grid` for a new food.
    pub fn place(grid: &mut Grid, id: FoodId) -> Result<Self, GridError> {
        let position = grid.random_box()?;
        Ok(Self {
            id,
            grid: grid.id(),
            position,
        })
    }

    pub fn id(&self) -> FoodId {
        self.id
    }

    pub fn grid_id(&self) -> GridId {
        self.grid
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn row(&self) -> u16 {
        self.position.row
    }

    pub fn col(&self) -> u16 {
        self.position.col
    }

    pub fn contains(&self, row: u16, col: u16) -> bool {
        self.position.at(row, col)
    }

    pub fn state(&self) -> FoodState {
        FoodState {
            id: self.id,
            position: self.position,
            row: self.position.row,
            col: self.position.col,
            color: Color::Red,
            collideable: true,
            collide_type: CollideType::Food,
            deadly: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn at(id: FoodId, position: Cell) -> Self {
        Self {
            id,
            grid: GridId::default(),
            position,
        }
    }
}
