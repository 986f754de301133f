use crate::algorithms::SearchResult;
use std::fmt;
use std::time::Duration;

/// Metrics of the last completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub visited_count: usize,
    /// Edges on the shortest path, `None` when the target was unreachable.
    pub path_length: Option<usize>,
    /// Wall-clock time of the synchronous search call.
    pub search_time: Duration,
}

impl RunSummary {
    pub fn new(result: &SearchResult, search_time: Duration) -> Self {
        RunSummary {
            visited_count: result.visited_count(),
            path_length: result.path_length(),
            search_time,
        }
    }

    /// Search time in fractional milliseconds.
    pub fn search_millis(&self) -> f64 {
        self.search_time.as_secs_f64() * 1000.0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path_length {
            Some(steps) => writeln!(f, "Shortest path length: {} steps", steps)?,
            None => writeln!(f, "No path found")?,
        }
        writeln!(f, "Nodes explored: {}", self.visited_count)?;
        writeln!(f, "Algorithm execution time: {:.2}ms", self.search_millis())?;
        Ok(())
    }
}
