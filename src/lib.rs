pub mod config;
pub mod error;
pub mod procgen;
pub mod world;

pub use config::WorldConfig;
pub use error::{Result, WorldError};
pub use world::{build_world, WorldDescription, WorldExport, WorldStats};
