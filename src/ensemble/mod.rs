// public modules
pub mod config;
pub mod core;
pub mod predict;
pub mod state;

pub use self::config::{ConfigIO, EnsembleConfig};
pub use self::core::EnsembleController;
pub use self::state::{ControllerState, IndexStatus, Phase};
