mod node;

// Modules
pub mod classifier;
pub mod combiner;
pub mod constants;
pub mod data;
pub mod drift;
pub mod ensemble;
pub mod errors;
pub mod evaluation;
pub mod index;
pub mod metric;
pub mod prune;
pub mod selection;
pub mod utils;
pub mod window;

// Individual classes, and functions
pub use data::Point;
pub use ensemble::{EnsembleConfig, EnsembleController};
pub use index::{AdaptiveIndex, NeighborIndex};
