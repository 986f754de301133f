//! Shortest-path search on an editable grid, replayed as a timed animation.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod grid;
pub mod playback;
pub mod simulation;
pub mod statistics;

pub use error::{GridError, VisualizerError};
pub use grid::{Cell, Grid, Position};
