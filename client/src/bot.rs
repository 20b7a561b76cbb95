//! Direction policy for the headless player

use shared::{Direction, GridSnapshot, PlayerId, Snapshot};

/// Returns true if stepping onto `(row, col)` would end the game.
///
/// Off-board coordinates, boundary cells and every snake body cell count as
/// deadly. Tails that are about to move away are treated as occupied too.
pub fn is_deadly(grid: &GridSnapshot, row: i32, col: i32) -> bool {
    if row < 0 || col < 0 || row >= grid.rows as i32 || col >= grid.cols as i32 {
        return true;
    }

    let (row, col) = (row as u16, col as u16);
    if grid.cell(row, col).map_or(true, |cell| cell.deadly) {
        return true;
    }

    grid.snakes
        .iter()
        .any(|snake| snake.body.iter().any(|cell| cell.at(row, col)))
}

/// Picks the action for the next round.
///
/// Keeps the current heading (`None`) while the cell ahead is safe, otherwise
/// turns to the first safe direction. Returns `None` when the player has no
/// snake in the snapshot or every neighbour is deadly.
pub fn choose_direction(snapshot: &Snapshot, player: PlayerId) -> Option<Direction> {
    let grid = &snapshot.grid;
    let snake = grid.snake(player)?;
    let head = snake.head()?;

    let is_safe = |direction: Direction| {
        let (dr, dc) = direction.offset();
        !is_deadly(grid, head.row as i32 + dr, head.col as i32 + dc)
    };

    if is_safe(snake.direction) {
        return None;
    }

    Direction::ALL
        .into_iter()
        .filter(|&direction| direction != snake.direction.opposite())
        .find(|&direction| is_safe(direction))
}
