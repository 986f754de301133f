//! Error types for pathviz

use thiserror::Error;

/// Errors raised at the grid and search boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors raised by the visualizer session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisualizerError {
    #[error("A playback is still running")]
    Busy,

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type Result<T> = std::result::Result<T, GridError>;
