use crate::error::Result;
use crate::grid::{Grid, Position};

/// Distance of a cell the search never reached.
pub const UNREACHED: u32 = u32::MAX;

pub trait ShortestPathEngine {
    fn search(&self, grid: &Grid, source: Position, target: Position) -> Result<SearchResult>;
}

/// Per-cell bookkeeping of one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    pub distance: u32,
    pub visited: bool,
    /// Row-major index of the cell this one was reached from.
    pub predecessor: Option<usize>,
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState {
            distance: UNREACHED,
            visited: false,
            predecessor: None,
        }
    }
}

/// Outcome of one search: the finalization order, the path, and the table
/// the search filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub visited_order: Vec<Position>,
    /// Source to target inclusive, empty when the target is unreachable.
    pub path_order: Vec<Position>,
    cols: usize,
    states: Vec<SearchState>,
}

impl SearchResult {
    pub(crate) fn new(
        visited_order: Vec<Position>,
        path_order: Vec<Position>,
        cols: usize,
        states: Vec<SearchState>,
    ) -> Self {
        SearchResult {
            visited_order,
            path_order,
            cols,
            states,
        }
    }

    fn state(&self, pos: Position) -> Option<&SearchState> {
        if pos.col >= self.cols {
            return None;
        }
        self.states.get(pos.row * self.cols + pos.col)
    }

    pub fn distance(&self, pos: Position) -> Option<u32> {
        self.state(pos)
            .map(|s| s.distance)
            .filter(|d| *d != UNREACHED)
    }

    pub fn is_visited(&self, pos: Position) -> bool {
        self.state(pos).is_some_and(|s| s.visited)
    }

    pub fn predecessor(&self, pos: Position) -> Option<Position> {
        let index = self.state(pos)?.predecessor?;
        Some(Position::new(index / self.cols, index % self.cols))
    }

    pub fn is_reachable(&self) -> bool {
        !self.path_order.is_empty()
    }

    /// Path length in edges, `None` when the target was not reached.
    pub fn path_length(&self) -> Option<usize> {
        self.path_order.len().checked_sub(1)
    }

    pub fn visited_count(&self) -> usize {
        self.visited_order.len()
    }
}
