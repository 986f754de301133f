use crate::algorithms::common::{SearchResult, SearchState, ShortestPathEngine};
use crate::error::{GridError, Result};
use crate::grid::{Grid, Position};
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Frontier entry. `Ord` is reversed so the `BinaryHeap` pops the smallest
/// distance first, and among equal distances the earliest discovered cell.
/// Equality follows the same (distance, sequence) pair; `index` is payload.
#[derive(Clone, Copy)]
struct Key {
    distance: u32,
    sequence: u64,
    index: usize,
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Uniform-cost search over a 4-connected grid with unit edge weights.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dijkstra;

impl Dijkstra {
    pub fn new() -> Self {
        Dijkstra
    }
}

impl ShortestPathEngine for Dijkstra {
    fn search(&self, grid: &Grid, source: Position, target: Position) -> Result<SearchResult> {
        search(grid, source, target)
    }
}

fn check_endpoint(grid: &Grid, name: &str, pos: Position) -> Result<usize> {
    let index = grid.index(pos).ok_or_else(|| {
        GridError::InvalidConfiguration(format!(
            "{} {} lies outside the {}x{} grid",
            name,
            pos,
            grid.rows(),
            grid.cols()
        ))
    })?;
    if grid.is_obstacle(pos) {
        return Err(GridError::InvalidConfiguration(format!(
            "{} {} is a wall",
            name, pos
        )));
    }
    Ok(index)
}

/// Finds a shortest path from `source` to `target`.
///
/// Returns every finalized cell in finalization order and the path, which is
/// empty when walls cut the target off. The grid is only read.
pub fn search(grid: &Grid, source: Position, target: Position) -> Result<SearchResult> {
    let source_index = check_endpoint(grid, "source", source)?;
    let target_index = check_endpoint(grid, "target", target)?;
    if source_index == target_index {
        return Err(GridError::InvalidConfiguration(format!(
            "source and target coincide at {}",
            source
        )));
    }

    let mut states = vec![SearchState::default(); grid.cell_count()];
    let mut visited_order = Vec::new();
    let mut frontier = BinaryHeap::new();
    let mut sequence = 0u64;

    states[source_index].distance = 0;
    frontier.push(Key {
        distance: 0,
        sequence,
        index: source_index,
    });

    let mut found = false;
    while let Some(current) = frontier.pop() {
        let state = &mut states[current.index];
        // Stale entry left behind by a later improvement.
        if state.visited || current.distance != state.distance {
            continue;
        }
        state.visited = true;

        let pos = grid.position(current.index);
        visited_order.push(pos);
        if current.index == target_index {
            found = true;
            break;
        }

        let candidate = current.distance + 1;
        for neighbor in grid.neighbors(&pos) {
            let Some(ni) = grid.index(neighbor) else {
                continue;
            };
            let next = &mut states[ni];
            if next.visited || candidate >= next.distance {
                continue;
            }
            next.distance = candidate;
            next.predecessor = Some(current.index);
            sequence += 1;
            frontier.push(Key {
                distance: candidate,
                sequence,
                index: ni,
            });
        }
    }

    let path_order = if found {
        reconstruct_path(grid, &states, target_index)
    } else {
        Vec::new()
    };

    debug!(
        "search {} -> {}: {} cells finalized, path of {} cells",
        source,
        target,
        visited_order.len(),
        path_order.len()
    );

    Ok(SearchResult::new(
        visited_order,
        path_order,
        grid.cols(),
        states,
    ))
}

fn reconstruct_path(grid: &Grid, states: &[SearchState], target_index: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = Some(target_index);
    while let Some(index) = current {
        path.push(grid.position(index));
        current = states[index].predecessor;
    }
    path.reverse();
    path
}
