use crate::error::{GridError, Result};
use rand::Rng;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance between two positions.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
}

/// Fixed-size board of cells with a distinguished source and target.
///
/// Rows are shared between clones. Editing a cell copies only the row that
/// holds it, so a clone handed to a running playback never changes under it.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Arc<Vec<Cell>>>,
    source: Position,
    target: Position,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, source: Position, target: Position) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidConfiguration(format!(
                "grid dimensions must be non-zero, got {}x{}",
                rows, cols
            )));
        }
        for (name, pos) in [("source", source), ("target", target)] {
            if pos.row >= rows || pos.col >= cols {
                return Err(GridError::InvalidConfiguration(format!(
                    "{} {} lies outside the {}x{} grid",
                    name, pos, rows, cols
                )));
            }
        }
        if source == target {
            return Err(GridError::InvalidConfiguration(format!(
                "source and target coincide at {}",
                source
            )));
        }

        let row = Arc::new(vec![Cell::Empty; cols]);
        Ok(Grid {
            rows,
            cols,
            cells: vec![row; rows],
            source,
            target,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn source(&self) -> Position {
        self.source
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Number of cells on the board, never zero.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major index of a position, `None` when out of bounds.
    pub fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.cols + pos.col)
    }

    pub fn position(&self, index: usize) -> Position {
        Position::new(index / self.cols, index % self.cols)
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.cells.get(pos.row)?.get(pos.col).copied()
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.cell(pos) == Some(Cell::Wall)
    }

    pub fn is_endpoint(&self, pos: Position) -> bool {
        pos == self.source || pos == self.target
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| **c == Cell::Wall).count())
            .sum()
    }

    /// Returns a grid with the wall at `(row, col)` flipped.
    ///
    /// The source, the target and out-of-bounds coordinates are left alone.
    pub fn toggle_obstacle(&self, row: usize, col: usize) -> Grid {
        let pos = Position::new(row, col);
        let mut next = self.clone();
        if !self.contains(pos) || self.is_endpoint(pos) {
            return next;
        }
        let cells = Arc::make_mut(&mut next.cells[row]);
        cells[col] = match cells[col] {
            Cell::Empty => Cell::Wall,
            Cell::Wall => Cell::Empty,
        };
        next
    }

    /// Fresh board with the same dimensions and endpoints.
    pub fn reset(&self) -> Grid {
        let row = Arc::new(vec![Cell::Empty; self.cols]);
        Grid {
            cells: vec![row; self.rows],
            ..self.clone()
        }
    }

    /// Fresh board where every cell other than the endpoints is a wall with
    /// probability `density`.
    pub fn randomized<R: Rng + ?Sized>(&self, density: f64, rng: &mut R) -> Grid {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        let cells = (0..self.rows)
            .map(|row| {
                let cells = (0..self.cols)
                    .map(|col| {
                        let pos = Position::new(row, col);
                        if !self.is_endpoint(pos) && rng.gen_bool(density) {
                            Cell::Wall
                        } else {
                            Cell::Empty
                        }
                    })
                    .collect();
                Arc::new(cells)
            })
            .collect();
        Grid {
            cells,
            ..self.clone()
        }
    }

    /// In-bounds, non-wall neighbours in the order up, down, left, right.
    pub fn neighbors(&self, pos: &Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(4);
        let (row, col) = (pos.row as isize, pos.col as isize);

        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let nr = row + dr;
            let nc = col + dc;

            if nr >= 0 && nr < self.rows as isize && nc >= 0 && nc < self.cols as isize {
                let next_pos = Position::new(nr as usize, nc as usize);
                if !self.is_obstacle(next_pos) {
                    neighbors.push(next_pos);
                }
            }
        }
        neighbors
    }

    /// Whether two grids share the storage of a row.
    pub fn shares_row(&self, other: &Grid, row: usize) -> bool {
        match (self.cells.get(row), other.cells.get(row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = Position::new(row, col);
                let c = if pos == self.source {
                    'S'
                } else if pos == self.target {
                    'T'
                } else {
                    match self.cells[row][col] {
                        Cell::Wall => '#',
                        Cell::Empty => '.',
                    }
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small() -> Grid {
        Grid::new(5, 5, Position::new(0, 0), Position::new(0, 4)).unwrap()
    }

    #[test]
    fn rejects_bad_endpoints() {
        let origin = Position::new(0, 0);
        assert!(matches!(
            Grid::new(5, 5, origin, origin),
            Err(GridError::InvalidConfiguration(_))
        ));
        assert!(Grid::new(5, 5, origin, Position::new(5, 0)).is_err());
        assert!(Grid::new(5, 5, Position::new(0, 9), origin).is_err());
        assert!(Grid::new(0, 5, origin, Position::new(0, 1)).is_err());
    }

    #[test]
    fn new_grid_has_no_walls() {
        let grid = small();
        assert_eq!(grid.obstacle_count(), 0);
        assert_eq!(grid.cell_count(), 25);
    }

    #[test]
    fn toggle_flips_and_flips_back() {
        let grid = small().toggle_obstacle(2, 3);
        assert!(grid.is_obstacle(Position::new(2, 3)));
        let grid = grid.toggle_obstacle(2, 3);
        assert!(!grid.is_obstacle(Position::new(2, 3)));
    }

    #[test]
    fn toggle_on_endpoints_is_noop() {
        let grid = small().toggle_obstacle(0, 0).toggle_obstacle(0, 4);
        assert!(!grid.is_obstacle(grid.source()));
        assert!(!grid.is_obstacle(grid.target()));
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn toggle_out_of_bounds_is_noop() {
        let grid = small().toggle_obstacle(7, 1);
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn toggle_copies_only_the_touched_row() {
        let before = small();
        let after = before.toggle_obstacle(3, 1);
        assert!(!before.is_obstacle(Position::new(3, 1)));
        assert!(after.is_obstacle(Position::new(3, 1)));
        assert!(!before.shares_row(&after, 3));
        assert!(before.shares_row(&after, 2));
    }

    #[test]
    fn randomized_never_walls_endpoints() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = small().randomized(1.0, &mut rng);
        assert_eq!(grid.obstacle_count(), 23);
        assert!(!grid.is_obstacle(grid.source()));
        assert!(!grid.is_obstacle(grid.target()));

        let cleared = grid.randomized(0.0, &mut rng);
        assert_eq!(cleared.obstacle_count(), 0);
    }

    #[test]
    fn neighbors_skip_walls_and_edges() {
        let grid = small().toggle_obstacle(1, 0);
        assert_eq!(grid.neighbors(&Position::new(0, 0)), vec![Position::new(0, 1)]);
        assert_eq!(grid.neighbors(&Position::new(2, 2)).len(), 4);
    }

    #[test]
    fn display_marks_endpoints_and_walls() {
        let grid = Grid::new(2, 3, Position::new(0, 0), Position::new(1, 2))
            .unwrap()
            .toggle_obstacle(0, 1);
        assert_eq!(grid.to_string(), "S#.\n..T\n");
    }
}
