use crate::grid::{Grid, Position};
use pathfinding::prelude::astar;

/// Source-to-target path length in edges computed with the `pathfinding`
/// crate's A*, `None` when walls cut the target off.
///
/// Used to cross-check the engine's result.
pub fn reference_path_length(grid: &Grid) -> Option<usize> {
    let goal = grid.target();
    astar(
        &grid.source(),
        |p: &Position| {
            grid.neighbors(p)
                .into_iter()
                .map(|successor| (successor, 1usize))
                .collect::<Vec<_>>()
        },
        |p| p.manhattan(&goal),
        |p| *p == goal,
    )
    .map(|(_, cost)| cost)
}
