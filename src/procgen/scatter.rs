/// Grid-walk placement of trees, rocks, plants and decorations
use super::catalog::{
    CrownShape, DecorationKind, PlantShape, RockShape, TreeKind, PLANT_ARCHETYPES, ROCK_ARCHETYPES,
};
use super::terrain::Heightfield;
use super::world_data::{Point3, Rgb, TerrainClass};
use super::zones::ZoneManager;
use crate::error::{Result, WorldError};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::{PI, TAU};
use tracing::info;

/// Decorations are not placed on slopes steeper than this
pub const MAX_DECORATION_SLOPE: f64 = 0.2;

/// Largest accepted scatter grid, in cells per side
pub const MAX_CELLS_PER_SIDE: usize = 4096;

/// Fraction of a cell the sample point may wander from the cell corner, each way
const CELL_JITTER: f64 = 0.4;

// Per-channel colour shifts, in 8-bit units
const TREE_COLOR_JITTER: u8 = 10;
const ROCK_COLOR_JITTER: u8 = 20;
const PLANT_COLOR_JITTER: u8 = 20;
const DECORATION_COLOR_JITTER: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree {
    pub position: Point3,
    pub kind: TreeKind,
    pub trunk_height: f64,
    pub trunk_radius: f64,
    pub leaves_radius: f64,
    pub trunk_color: Rgb,
    pub leaves_color: Rgb,
    pub crown: CrownShape,
    /// Phase offset for wind sway, in `[0, 1)`
    pub animation_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rock {
    pub position: Point3,
    pub size: f64,
    pub color: Rgb,
    pub shape: RockShape,
    /// Euler angles (x, y, z) in radians
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plant {
    pub position: Point3,
    pub shape: PlantShape,
    pub size: f64,
    pub color: Rgb,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoration {
    pub position: Point3,
    pub kind: DecorationKind,
    pub size: f64,
    pub color: Rgb,
    pub rotation: f64,
    pub district_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EnvironmentElement {
    Tree(Tree),
    Rock(Rock),
    Plant(Plant),
    Decoration(Decoration),
}

impl EnvironmentElement {
    pub fn position(&self) -> Point3 {
        match self {
            EnvironmentElement::Tree(t) => t.position,
            EnvironmentElement::Rock(r) => r.position,
            EnvironmentElement::Plant(p) => p.position,
            EnvironmentElement::Decoration(d) => d.position,
        }
    }
}

/// Output of a scatter pass, one ordered list per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scatter {
    pub trees: Vec<Tree>,
    pub rocks: Vec<Rock>,
    pub plants: Vec<Plant>,
    pub decorations: Vec<Decoration>,
}

impl Scatter {
    pub fn len(&self) -> usize {
        self.trees.len() + self.rocks.len() + self.plants.len() + self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, element: EnvironmentElement) {
        match element {
            EnvironmentElement::Tree(t) => self.trees.push(t),
            EnvironmentElement::Rock(r) => self.rocks.push(r),
            EnvironmentElement::Plant(p) => self.plants.push(p),
            EnvironmentElement::Decoration(d) => self.decorations.push(d),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSettings {
    pub tree_density: f64,
    pub rock_density: f64,
    pub plant_density: f64,
    pub decoration_density: f64,
    pub grid_size: f64,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            tree_density: 0.5,
            rock_density: 0.3,
            plant_density: 0.6,
            decoration_density: 0.4,
            grid_size: 5.0,
        }
    }
}

pub struct ScatterEngine {
    settings: ScatterSettings,
}

impl ScatterEngine {
    pub fn new(settings: ScatterSettings) -> Self {
        Self { settings }
    }

    /// Walk the world grid and place objects.
    ///
    /// Every cell draws from its own generator seeded by `(seed, i, j)`, so
    /// the parallel walk yields exactly what a sequential one would.
    pub fn scatter(&self, terrain: &Heightfield, zones: Option<&ZoneManager>, seed: u64) -> Result<Scatter> {
        let size = terrain.size();
        let grid = self.settings.grid_size;
        let half = size / 2.0;
        let cells = cells_per_side(size, grid)?;
        let total = cells.checked_mul(cells).ok_or_else(|| {
            WorldError::InvalidConfig(format!("scatter grid of {} cells per side is too large", cells))
        })?;

        let per_cell: Vec<Vec<EnvironmentElement>> = (0..total)
            .into_par_iter()
            .map(|index| {
                let (i, j) = (index / cells, index % cells);
                let x = -half + i as f64 * grid;
                let z = -half + j as f64 * grid;
                if x >= half || z >= half {
                    return Vec::new();
                }

                let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(seed, i, j));
                self.populate_cell(terrain, zones, x, z, &mut rng)
            })
            .collect();

        let mut scatter = Scatter::default();
        for element in per_cell.into_iter().flatten() {
            scatter.push(element);
        }

        info!(
            "Scattered {} trees, {} rocks, {} plants, {} decorations",
            scatter.trees.len(),
            scatter.rocks.len(),
            scatter.plants.len(),
            scatter.decorations.len()
        );
        Ok(scatter)
    }

    fn populate_cell(
        &self,
        terrain: &Heightfield,
        zones: Option<&ZoneManager>,
        x: f64,
        z: f64,
        rng: &mut ChaCha8Rng,
    ) -> Vec<EnvironmentElement> {
        let grid = self.settings.grid_size;
        let px = x + rng.gen_range(-CELL_JITTER..CELL_JITTER) * grid;
        let pz = z + rng.gen_range(-CELL_JITTER..CELL_JITTER) * grid;
        let position = Point3::new(px, terrain.height_at(px, pz), pz);
        let class = terrain.terrain_class_at(px, pz);

        let mut placed = Vec::new();
        if let Some(tree) = self.try_tree(terrain, zones, position, class, rng) {
            placed.push(EnvironmentElement::Tree(tree));
        }
        if let Some(rock) = self.try_rock(position, class, rng) {
            placed.push(EnvironmentElement::Rock(rock));
        }
        if let Some(plant) = self.try_plant(position, class, rng) {
            placed.push(EnvironmentElement::Plant(plant));
        }
        if let Some(decoration) = self.try_decoration(terrain, zones, position, class, rng) {
            placed.push(EnvironmentElement::Decoration(decoration));
        }
        placed
    }

    fn try_tree(
        &self,
        terrain: &Heightfield,
        zones: Option<&ZoneManager>,
        position: Point3,
        class: TerrainClass,
        rng: &mut ChaCha8Rng,
    ) -> Option<Tree> {
        if class == TerrainClass::Water {
            return None;
        }

        let flat = position.flat();
        let accepted = match zones {
            Some(zones) => zones.should_place_tree_at(flat, terrain),
            None => rng.gen::<f64>() < self.settings.tree_density,
        };
        if !accepted {
            return None;
        }

        let kind = match zones {
            Some(zones) => zones.tree_kind_at(flat, rng),
            None => *TreeKind::ALL.choose(rng)?,
        };
        let archetype = kind.archetype();

        Some(Tree {
            position,
            kind,
            trunk_height: archetype.trunk_height.sample(rng),
            trunk_radius: archetype.trunk_radius.sample(rng),
            leaves_radius: archetype.leaves_radius.sample(rng),
            trunk_color: archetype.trunk_color.jitter(rng, TREE_COLOR_JITTER),
            leaves_color: archetype.leaves_color.jitter(rng, TREE_COLOR_JITTER),
            crown: archetype.crown,
            animation_offset: rng.gen(),
        })
    }

    fn try_rock(&self, position: Point3, class: TerrainClass, rng: &mut ChaCha8Rng) -> Option<Rock> {
        if class.is_wet() {
            return None;
        }

        let mut density = self.settings.rock_density;
        if class == TerrainClass::Mountain {
            density *= 3.0;
        }
        if rng.gen::<f64>() > density {
            return None;
        }

        let archetype = ROCK_ARCHETYPES.choose(rng)?;
        Some(Rock {
            position,
            size: archetype.size.sample(rng),
            color: archetype.color.jitter(rng, ROCK_COLOR_JITTER),
            shape: archetype.shape,
            rotation: [rng.gen::<f64>() * PI, rng.gen::<f64>() * TAU, rng.gen::<f64>() * PI],
        })
    }

    fn try_plant(&self, position: Point3, class: TerrainClass, rng: &mut ChaCha8Rng) -> Option<Plant> {
        if class == TerrainClass::Water {
            return None;
        }

        let density = match class {
            TerrainClass::Grass | TerrainClass::Forest => self.settings.plant_density * 2.0,
            TerrainClass::Mountain | TerrainClass::Beach => self.settings.plant_density * 0.5,
            _ => self.settings.plant_density,
        };
        if rng.gen::<f64>() > density {
            return None;
        }

        let archetype = PLANT_ARCHETYPES.choose(rng)?;
        Some(Plant {
            position,
            shape: archetype.shape,
            size: archetype.size.sample(rng),
            color: archetype.color.jitter(rng, PLANT_COLOR_JITTER),
            rotation: rng.gen::<f64>() * TAU,
        })
    }

    fn try_decoration(
        &self,
        terrain: &Heightfield,
        zones: Option<&ZoneManager>,
        position: Point3,
        class: TerrainClass,
        rng: &mut ChaCha8Rng,
    ) -> Option<Decoration> {
        if class == TerrainClass::Water {
            return None;
        }
        let zones = zones?;

        let params = zones.decoration_params_at(position.flat(), rng);
        if terrain.slope_at(position.x, position.z) > MAX_DECORATION_SLOPE {
            return None;
        }
        // Catalog entries without a style are skipped
        let style = params.kind.style()?;
        if rng.gen::<f64>() > self.settings.decoration_density {
            return None;
        }

        Some(Decoration {
            position,
            kind: params.kind,
            size: style.size * params.scale,
            color: style.color.jitter(rng, DECORATION_COLOR_JITTER),
            rotation: params.rotation,
            district_id: params.district_id,
        })
    }
}

/// Number of scatter cells along each side of a world of `size`.
///
/// Fails when `grid_size` is not a positive number or the grid would exceed
/// [`MAX_CELLS_PER_SIDE`].
pub fn cells_per_side(size: f64, grid_size: f64) -> Result<usize> {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Err(WorldError::InvalidConfig(format!(
            "grid_size must be a positive number, got {}",
            grid_size
        )));
    }
    let cells = (size / grid_size).ceil();
    if !(cells.is_finite() && cells <= MAX_CELLS_PER_SIDE as f64) {
        return Err(WorldError::InvalidConfig(format!(
            "size / grid_size must give at most {} cells per side, got {}",
            MAX_CELLS_PER_SIDE, cells
        )));
    }
    Ok(cells.max(0.0) as usize)
}

/// Stable per-cell seed (splitmix64 finalizer over the cell coordinates)
fn cell_seed(seed: u64, i: usize, j: usize) -> u64 {
    let mut h = seed
        ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (j as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}
