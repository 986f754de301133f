pub mod common;
pub mod dijkstra;
pub mod reference;

pub use common::{SearchResult, SearchState, ShortestPathEngine, UNREACHED};
pub use dijkstra::{search, Dijkstra};
pub use reference::reference_path_length;
