/// World assembly: runs every generation stage and exposes the read-only result
use crate::config::WorldConfig;
use crate::error::Result;
use crate::procgen::routes::{
    Location, Node, PathConnection, PathHit, RouteNetwork, RoutePlan, RouteSettings,
};
use crate::procgen::scatter::{Decoration, Plant, Rock, Scatter, ScatterEngine, ScatterSettings, Tree};
use crate::procgen::terrain::Heightfield;
use crate::procgen::world_data::{ElevationGrid, Point2, Point3, TerrainClass};
use crate::procgen::zones::{District, ZoneManager};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Serializer};
use std::time::Instant;
use tracing::info;

// Per-stage offsets into the seed space
const ZONE_STREAM: u64 = 0x5A0E;
const ROUTE_STREAM: u64 = 0x2011_7E;
const SCATTER_STREAM: u64 = 0x5CA7_7E2;

/// Summary counts and ranges for a generated world
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldStats {
    pub seed: u64,
    pub size: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub districts: usize,
    pub locations: usize,
    pub nodes: usize,
    pub connections: usize,
    pub trees: usize,
    pub rocks: usize,
    pub plants: usize,
    pub decorations: usize,
    /// Cells per terrain class, in `TerrainClass` declaration order
    pub class_histogram: [usize; 6],
}

/// A fully generated world. Built once by [`build_world`], read-only after.
#[derive(Debug)]
pub struct WorldDescription {
    config: WorldConfig,
    terrain: Heightfield,
    zones: ZoneManager,
    routes: RouteNetwork,
    scatter: Scatter,
    stats: WorldStats,
}

/// Borrowed snapshot of a world in the shape the renderer reads
#[derive(Debug, Serialize)]
pub struct WorldExport<'a> {
    pub config: &'a WorldConfig,
    pub stats: &'a WorldStats,
    pub elevation: &'a ElevationGrid,
    pub districts: &'a [District],
    pub locations: &'a [Location],
    pub nodes: &'a [Node],
    pub connections: &'a [PathConnection],
    pub trees: &'a [Tree],
    pub rocks: &'a [Rock],
    pub plants: &'a [Plant],
    pub decorations: &'a [Decoration],
}

/// Generate a world. Invalid configs are rejected before any generation work.
pub fn build_world(config: &WorldConfig) -> Result<WorldDescription> {
    config.validate()?;
    let started = Instant::now();

    let terrain = Heightfield::generate(config.seed, config.size, config.resolution, config.max_height)?
        .with_slope_sample_distance(config.slope_sample_distance)?;
    info!(
        "Generated {}x{} elevation grid (heights {:.2}..{:.2})",
        config.resolution,
        config.resolution,
        terrain.grid().min_height(),
        terrain.grid().max_height()
    );

    let mut zone_rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(ZONE_STREAM));
    let zones = ZoneManager::new(&terrain, config.district_count, &mut zone_rng)?;

    let mut route_rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(ROUTE_STREAM));
    let routes = RouteNetwork::build(
        &terrain,
        &zones,
        RouteSettings {
            path_width: config.path_width,
            main_road_width: config.main_road_width,
        },
        &mut route_rng,
    )?;

    let engine = ScatterEngine::new(ScatterSettings {
        tree_density: config.tree_density,
        rock_density: config.rock_density,
        plant_density: config.plant_density,
        decoration_density: config.decoration_density,
        grid_size: config.grid_size,
    });
    let scatter = engine.scatter(&terrain, Some(&zones), config.seed.wrapping_add(SCATTER_STREAM))?;

    let stats = compute_stats(config, &terrain, &zones, &routes, &scatter);
    info!(
        "World {} built in {:.1?}: {} districts, {} paths, {} objects",
        config.seed,
        started.elapsed(),
        stats.districts,
        stats.connections,
        scatter.len()
    );

    Ok(WorldDescription {
        config: config.clone(),
        terrain,
        zones,
        routes,
        scatter,
        stats,
    })
}

fn compute_stats(
    config: &WorldConfig,
    terrain: &Heightfield,
    zones: &ZoneManager,
    routes: &RouteNetwork,
    scatter: &Scatter,
) -> WorldStats {
    let grid = terrain.grid();
    let mut class_histogram = [0usize; 6];
    for j in 0..grid.resolution {
        for i in 0..grid.resolution {
            let class = terrain.terrain_class_at(grid.world_coord(i), grid.world_coord(j));
            class_histogram[class as usize] += 1;
        }
    }

    WorldStats {
        seed: config.seed,
        size: config.size,
        min_height: grid.min_height(),
        max_height: grid.max_height(),
        districts: zones.districts().len(),
        locations: routes.locations().len(),
        nodes: routes.nodes().len(),
        connections: routes.connections().len(),
        trees: scatter.trees.len(),
        rocks: scatter.rocks.len(),
        plants: scatter.plants.len(),
        decorations: scatter.decorations.len(),
        class_histogram,
    }
}

impl WorldDescription {
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &Heightfield {
        &self.terrain
    }

    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.terrain.height_at(x, z)
    }

    pub fn terrain_class_at(&self, x: f64, z: f64) -> TerrainClass {
        self.terrain.terrain_class_at(x, z)
    }

    pub fn moisture_at(&self, x: f64, z: f64) -> f64 {
        self.terrain.moisture_at(x, z)
    }

    pub fn normal_at(&self, x: f64, z: f64) -> Point3 {
        self.terrain.normal_at(x, z)
    }

    pub fn slope_at(&self, x: f64, z: f64) -> f64 {
        self.terrain.slope_at(x, z)
    }

    /// The district owning a point. Every point has one.
    pub fn district_at(&self, x: f64, z: f64) -> &District {
        self.zones.district_at(Point2::new(x, z))
    }

    pub fn nearest_path_point(&self, position: Point3) -> Option<PathHit> {
        self.routes.nearest_path_point(position)
    }

    /// Cheapest path between two locations over the existing road network
    pub fn shortest_route(&self, start_id: &str, end_id: &str) -> Option<RoutePlan> {
        self.routes.shortest_route(start_id, end_id)
    }

    pub fn elevation_grid(&self) -> &ElevationGrid {
        self.terrain.grid()
    }

    pub fn districts(&self) -> &[District] {
        self.zones.districts()
    }

    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.routes.location(id)
    }

    pub fn locations(&self) -> &[Location] {
        self.routes.locations()
    }

    pub fn nodes(&self) -> &[Node] {
        self.routes.nodes()
    }

    pub fn connections(&self) -> &[PathConnection] {
        self.routes.connections()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.scatter.trees
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.scatter.rocks
    }

    pub fn plants(&self) -> &[Plant] {
        &self.scatter.plants
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.scatter.decorations
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    pub fn export(&self) -> WorldExport<'_> {
        WorldExport {
            config: &self.config,
            stats: &self.stats,
            elevation: self.terrain.grid(),
            districts: self.zones.districts(),
            locations: self.routes.locations(),
            nodes: self.routes.nodes(),
            connections: self.routes.connections(),
            trees: &self.scatter.trees,
            rocks: &self.scatter.rocks,
            plants: &self.scatter.plants,
            decorations: &self.scatter.decorations,
        }
    }
}

impl Serialize for WorldDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.export().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorldError;
    use crate::procgen::routes::{RoadClass, POST_OFFICE_ID};

    fn small_config() -> WorldConfig {
        WorldConfig {
            seed: 7,
            resolution: 48,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_build_world_default_layout() {
        let world = build_world(&small_config()).unwrap();

        assert_eq!(world.districts().len(), 5);
        assert_eq!(world.locations().len(), 6);
        assert!(world.location(POST_OFFICE_ID).is_some());

        let main_roads = world
            .connections()
            .iter()
            .filter(|c| c.road_class == RoadClass::MainRoad)
            .count();
        let ring_roads = world
            .connections()
            .iter()
            .filter(|c| c.road_class == RoadClass::SecondaryRoad)
            .count();
        assert_eq!(main_roads, 5);
        assert_eq!(ring_roads, 4);
    }

    #[test]
    fn test_build_world_rejects_bad_config() {
        let config = WorldConfig {
            grid_size: 0.0,
            ..small_config()
        };
        assert!(matches!(build_world(&config), Err(WorldError::InvalidConfig(_))));
    }

    #[test]
    fn test_stats_match_contents() {
        let world = build_world(&small_config()).unwrap();
        let stats = world.stats();

        assert_eq!(stats.trees, world.trees().len());
        assert_eq!(stats.rocks, world.rocks().len());
        assert_eq!(stats.connections, world.connections().len());
        assert_eq!(stats.class_histogram.iter().sum::<usize>(), 48 * 48);
        assert!(stats.min_height >= 0.0 && stats.max_height <= 5.0);
    }

    #[test]
    fn test_export_serializes() {
        let world = build_world(&small_config()).unwrap();
        let json = serde_json::to_value(&world).unwrap();

        assert_eq!(json["stats"]["seed"], 7);
        assert_eq!(json["districts"].as_array().unwrap().len(), 5);
        assert_eq!(
            json["elevation"]["heights"].as_array().unwrap().len(),
            48 * 48
        );
    }

    #[test]
    fn test_queries_delegate() {
        let world = build_world(&small_config()).unwrap();
        let (x, z) = (3.0, -12.0);

        assert_eq!(world.height_at(x, z), world.elevation_grid().sample(x, z));
        assert_eq!(world.terrain_class_at(x, z), world.terrain().terrain_class_at(x, z));
        assert!(world.district_at(x, z).radius > 0.0);
        assert!(world.shortest_route(POST_OFFICE_ID, "district_park").is_some());
    }
}
