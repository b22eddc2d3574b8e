/// Procedural world generation for the delivery game
///
/// This module provides terrain generation, district layout, the road
/// network, and environment object placement.

pub mod catalog;
pub mod noise;
pub mod routes;
pub mod scatter;
pub mod terrain;
pub mod world_data;
pub mod zones;

// Re-export main types for convenience
pub use catalog::{DecorationKind, TreeKind, ZoneType};
pub use noise::{NoiseSource, PerlinNoise};
pub use routes::{Location, Node, NodeId, PathConnection, PathHit, RoadClass, RouteNetwork, RoutePlan};
pub use scatter::{Decoration, Plant, Rock, Scatter, ScatterEngine, ScatterSettings, Tree};
pub use terrain::{FlatSite, Heightfield, HeightfieldSettings};
pub use world_data::{ElevationGrid, Point2, Point3, Rgb, TerrainClass};
pub use zones::{District, ZoneManager};
