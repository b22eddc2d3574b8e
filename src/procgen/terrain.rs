/// Core terrain generation logic
use super::noise::{normalized, NoiseChannel, NoiseSource, PerlinNoise};
use super::world_data::{ElevationGrid, Point3, TerrainClass};
use crate::config::require_positive;
use crate::error::{Result, WorldError};
use rand::Rng;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Fraction of `max_height` below which terrain is water
pub const WATER_LEVEL: f64 = 0.25;
/// Width of the beach band above the water line, as a fraction of `max_height`
pub const BEACH_BAND: f64 = 0.04;
pub const MOUNTAIN_LEVEL: f64 = 0.7;
pub const SNOW_LEVEL: f64 = 0.8;
/// Moisture above which grassland becomes forest
pub const FOREST_MOISTURE: f64 = 0.6;

/// Largest accepted grid resolution (samples per side)
pub const MAX_RESOLUTION: usize = 4096;

/// Candidate budget for [`Heightfield::find_flat_site`]
pub const FLAT_SITE_ATTEMPTS: usize = 100;

const BASE_FREQUENCY: f64 = 0.01;
const MOISTURE_FREQUENCY: f64 = 0.02;

const CONTINENTAL_WEIGHT: f64 = 0.70;
const HILL_WEIGHT: f64 = 0.25;
const DETAIL_WEIGHT: f64 = 0.05;

/// Continental values above this are pulled toward the plateau height
const PLATEAU_THRESHOLD: f64 = 0.6;
const PLATEAU_HEIGHT: f64 = 0.7;
/// Heights below the water line are compressed toward this fraction of it
const SHALLOW_BAND: f64 = 0.8;

/// Parameters for a heightfield build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightfieldSettings {
    pub size: f64,
    pub resolution: usize,
    pub max_height: f64,
    pub slope_sample_distance: f64,
}

impl HeightfieldSettings {
    pub fn new(size: f64, resolution: usize, max_height: f64) -> Self {
        Self {
            size,
            resolution,
            max_height,
            slope_sample_distance: 1.0,
        }
    }

    fn validate(&self) -> Result<()> {
        require_positive("size", self.size)?;
        require_positive("max_height", self.max_height)?;
        require_positive("slope_sample_distance", self.slope_sample_distance)?;
        if !(2..=MAX_RESOLUTION).contains(&self.resolution) {
            return Err(WorldError::InvalidConfig(format!(
                "resolution must be within 2..={}, got {}",
                MAX_RESOLUTION, self.resolution
            )));
        }
        Ok(())
    }
}

/// A site suitable for building placement.
///
/// `fallback` is set when the search budget ran out and the world origin was
/// returned instead. The position is still valid, just not verified flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSite {
    pub position: Point3,
    pub fallback: bool,
}

/// Continuous elevation and terrain classification over the world plane
pub struct Heightfield {
    settings: HeightfieldSettings,
    noise: Arc<dyn NoiseSource>,
    grid: ElevationGrid,
}

impl std::fmt::Debug for Heightfield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heightfield")
            .field("settings", &self.settings)
            .field("grid_resolution", &self.grid.resolution)
            .finish()
    }
}

impl Heightfield {
    /// Generate a heightfield from a world seed using Perlin noise.
    pub fn generate(seed: u64, size: f64, resolution: usize, max_height: f64) -> Result<Self> {
        Self::with_noise(
            Arc::new(PerlinNoise::from_world_seed(seed)),
            HeightfieldSettings::new(size, resolution, max_height),
        )
    }

    /// Generate a heightfield from any noise source.
    pub fn with_noise(noise: Arc<dyn NoiseSource>, settings: HeightfieldSettings) -> Result<Self> {
        settings.validate()?;

        let HeightfieldSettings { size, resolution, max_height, .. } = settings;
        let cell = size / (resolution - 1) as f64;
        let origin = -size / 2.0;

        info!(
            "Generating terrain heightmap: {}x{} samples ({:.1} x {:.1} units)",
            resolution, resolution, size, size
        );

        // Rows are independent, so the parallel fill equals a sequential one
        let source: &dyn NoiseSource = noise.as_ref();
        let heights: Vec<f64> = (0..resolution)
            .into_par_iter()
            .flat_map_iter(|z| {
                let world_z = origin + z as f64 * cell;
                (0..resolution).map(move |x| {
                    let world_x = origin + x as f64 * cell;
                    raw_height(source, world_x, world_z, max_height)
                })
            })
            .collect();

        let grid = ElevationGrid::from_heights(resolution, size, heights);
        debug!(
            "Heightmap range: {:.3}..{:.3}",
            grid.min_height(),
            grid.max_height()
        );

        Ok(Self { settings, noise, grid })
    }

    /// Wrap a precomputed grid, e.g. a hand-built ramp.
    #[cfg(test)]
    pub(crate) fn from_grid(noise: Arc<dyn NoiseSource>, grid: ElevationGrid, max_height: f64) -> Self {
        let settings = HeightfieldSettings::new(grid.size, grid.resolution, max_height);
        Self { settings, noise, grid }
    }

    /// Override the distance used for slope and normal estimates.
    pub fn with_slope_sample_distance(mut self, distance: f64) -> Result<Self> {
        require_positive("slope_sample_distance", distance)?;
        self.settings.slope_sample_distance = distance;
        Ok(self)
    }

    pub fn settings(&self) -> &HeightfieldSettings {
        &self.settings
    }

    pub fn size(&self) -> f64 {
        self.settings.size
    }

    pub fn max_height(&self) -> f64 {
        self.settings.max_height
    }

    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    pub fn noise(&self) -> &dyn NoiseSource {
        self.noise.as_ref()
    }

    /// Whether a point lies inside the square world extent
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let half = self.settings.size / 2.0;
        x.abs() <= half && z.abs() <= half
    }

    /// Interpolated height at any world position
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.grid.sample(x, z)
    }

    /// Moisture in `[0, 1]`, used to split grassland from forest
    pub fn moisture_at(&self, x: f64, z: f64) -> f64 {
        normalized(self.noise.noise_2d(
            NoiseChannel::Moisture,
            x * MOISTURE_FREQUENCY,
            z * MOISTURE_FREQUENCY,
        ))
    }

    pub fn terrain_class_at(&self, x: f64, z: f64) -> TerrainClass {
        classify(self.height_at(x, z), self.moisture_at(x, z), self.settings.max_height)
    }

    /// Gradient magnitude using the configured sample distance
    pub fn slope_at(&self, x: f64, z: f64) -> f64 {
        self.slope_at_with_distance(x, z, self.settings.slope_sample_distance)
    }

    pub fn slope_at_with_distance(&self, x: f64, z: f64, d: f64) -> f64 {
        let (grad_x, grad_z) = self.gradient(x, z, d);
        (grad_x * grad_x + grad_z * grad_z).sqrt()
    }

    /// Unit surface normal using the configured sample distance
    pub fn normal_at(&self, x: f64, z: f64) -> Point3 {
        self.normal_at_with_distance(x, z, self.settings.slope_sample_distance)
    }

    pub fn normal_at_with_distance(&self, x: f64, z: f64, d: f64) -> Point3 {
        let h_n = self.height_at(x, z - d);
        let h_s = self.height_at(x, z + d);
        let h_e = self.height_at(x + d, z);
        let h_w = self.height_at(x - d, z);

        let nx = h_w - h_e;
        let ny = 2.0 * d;
        let nz = h_n - h_s;
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        Point3::new(nx / len, ny / len, nz / len)
    }

    fn gradient(&self, x: f64, z: f64, d: f64) -> (f64, f64) {
        let h_n = self.height_at(x, z - d);
        let h_s = self.height_at(x, z + d);
        let h_e = self.height_at(x + d, z);
        let h_w = self.height_at(x - d, z);
        ((h_e - h_w) / (2.0 * d), (h_s - h_n) / (2.0 * d))
    }

    /// Search for a flat, dry area of roughly `min_size` across.
    ///
    /// At most [`FLAT_SITE_ATTEMPTS`] candidates are tried. When none
    /// qualifies, the world origin is returned with `fallback` set; callers
    /// treat that as a valid but unverified site.
    pub fn find_flat_site<R: Rng + ?Sized>(&self, min_size: f64, max_slope: f64, rng: &mut R) -> FlatSite {
        let extent = self.settings.size * 0.8;

        for _ in 0..FLAT_SITE_ATTEMPTS {
            let x = (rng.gen::<f64>() - 0.5) * extent;
            let z = (rng.gen::<f64>() - 0.5) * extent;

            if self.slope_at(x, z) < max_slope
                && !self.terrain_class_at(x, z).is_wet()
                && self.neighbourhood_is_flat(x, z, min_size, max_slope)
            {
                return FlatSite {
                    position: Point3::new(x, self.height_at(x, z), z),
                    fallback: false,
                };
            }
        }

        debug!(
            "No flat site (size {}, slope < {}) in {} attempts, using origin",
            min_size, max_slope, FLAT_SITE_ATTEMPTS
        );
        FlatSite {
            position: Point3::new(0.0, self.height_at(0.0, 0.0), 0.0),
            fallback: true,
        }
    }

    // 5x5 samples spaced min_size/4 apart, centred on (x, z)
    fn neighbourhood_is_flat(&self, x: f64, z: f64, min_size: f64, max_slope: f64) -> bool {
        let step = min_size / 4.0;
        (-2..=2).all(|i| {
            (-2..=2).all(|j| {
                let sx = x + i as f64 * step;
                let sz = z + j as f64 * step;
                self.slope_at(sx, sz) <= max_slope && !self.terrain_class_at(sx, sz).is_wet()
            })
        })
    }
}

/// Classify a surface point. Pure function of its inputs.
pub fn classify(height: f64, moisture: f64, max_height: f64) -> TerrainClass {
    let water_level = max_height * WATER_LEVEL;
    let beach_level = water_level + max_height * BEACH_BAND;
    let mountain_level = max_height * MOUNTAIN_LEVEL;
    let snow_level = max_height * SNOW_LEVEL;

    if height < water_level {
        TerrainClass::Water
    } else if height < beach_level {
        TerrainClass::Beach
    } else if height > snow_level {
        TerrainClass::Snow
    } else if height > mountain_level {
        TerrainClass::Mountain
    } else if moisture > FOREST_MOISTURE {
        TerrainClass::Forest
    } else {
        TerrainClass::Grass
    }
}

/// Layered height at a world position, clamped to `[0, max_height]`
pub fn raw_height(noise: &dyn NoiseSource, x: f64, z: f64, max_height: f64) -> f64 {
    let nx = x * BASE_FREQUENCY;
    let nz = z * BASE_FREQUENCY;

    let continental = normalized(noise.noise_2d(NoiseChannel::Elevation, nx * 0.5, nz * 0.5));
    let hills = normalized(noise.noise_2d(NoiseChannel::Roughness, nx, nz)) * 0.5;
    let detail = noise.noise_2d(NoiseChannel::Detail, nx * 2.0, nz * 2.0).clamp(-1.0, 1.0) * 0.25;

    let mut height = continental * max_height * CONTINENTAL_WEIGHT
        + hills * max_height * HILL_WEIGHT
        + detail * max_height * DETAIL_WEIGHT;

    if continental > PLATEAU_THRESHOLD {
        let flattening = (continental - PLATEAU_THRESHOLD) / (1.0 - PLATEAU_THRESHOLD);
        height = height * (1.0 - flattening * 0.4) + flattening * max_height * PLATEAU_HEIGHT;
    }

    let water_level = max_height * WATER_LEVEL;
    if height < water_level {
        let water = 1.0 - height / water_level;
        height = height * (1.0 - water * 0.5) + water * (water_level * SHALLOW_BAND);
    }

    height.clamp(0.0, max_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::noise::ConstantNoise;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_field() -> Heightfield {
        Heightfield::generate(12345, 100.0, 64, 5.0).unwrap()
    }

    #[test]
    fn test_generate_terrain() {
        let field = test_field();
        assert_eq!(field.grid().resolution, 64);
        assert_eq!(field.grid().heights.len(), 64 * 64);
    }

    #[test]
    fn test_deterministic_terrain() {
        let a = Heightfield::generate(12345, 100.0, 64, 5.0).unwrap();
        let b = Heightfield::generate(12345, 100.0, 64, 5.0).unwrap();
        assert_eq!(a.grid().heights, b.grid().heights);
    }

    #[test]
    fn test_grid_matches_per_cell_evaluation() {
        let field = test_field();
        let grid = field.grid();
        for &(i, j) in &[(0usize, 0usize), (17, 40), (63, 63), (5, 62)] {
            let expected = raw_height(field.noise(), grid.world_coord(i), grid.world_coord(j), 5.0);
            assert_eq!(grid.get_height(i, j), expected);
        }
    }

    #[test]
    fn test_heights_within_bounds() {
        let field = test_field();
        for &h in &field.grid().heights {
            assert!(h.is_finite());
            assert!((0.0..=5.0).contains(&h), "height {} out of range", h);
        }
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(Heightfield::generate(1, 0.0, 64, 5.0).is_err());
        assert!(Heightfield::generate(1, 100.0, 1, 5.0).is_err());
        assert!(Heightfield::generate(1, 100.0, 64, -2.0).is_err());
        assert!(Heightfield::generate(1, f64::INFINITY, 64, 5.0).is_err());
        assert!(Heightfield::generate(1, 100.0, MAX_RESOLUTION + 1, 5.0).is_err());
        assert!(Heightfield::generate(1, 100.0, usize::MAX, 5.0).is_err());
    }

    #[test]
    fn test_classify_bands() {
        let h = 10.0;
        assert_eq!(classify(2.0, 0.0, h), TerrainClass::Water);
        assert_eq!(classify(2.6, 0.0, h), TerrainClass::Beach);
        assert_eq!(classify(5.0, 0.1, h), TerrainClass::Grass);
        assert_eq!(classify(5.0, 0.9, h), TerrainClass::Forest);
        assert_eq!(classify(7.5, 0.9, h), TerrainClass::Mountain);
        assert_eq!(classify(8.5, 0.9, h), TerrainClass::Snow);
    }

    #[test]
    fn test_water_leveling_raises_basins() {
        // All channels at -1: continental 0, hills 0, detail negative
        let h = raw_height(&ConstantNoise(-1.0), 3.0, 4.0, 10.0);
        assert!(h > 0.0 && h < 10.0 * WATER_LEVEL);
    }

    #[test]
    fn test_plateau_stays_in_range() {
        let h = raw_height(&ConstantNoise(1.0), 0.0, 0.0, 10.0);
        assert_eq!(h, 10.0);
    }

    #[test]
    fn test_flat_world_has_zero_slope_and_up_normal() {
        let field = Heightfield::with_noise(
            Arc::new(ConstantNoise(0.0)),
            HeightfieldSettings::new(50.0, 16, 5.0),
        )
        .unwrap();

        assert!(field.slope_at(3.0, -7.0).abs() < 1e-12);
        let n = field.normal_at(3.0, -7.0);
        assert!((n.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_find_flat_site_falls_back_on_water_world() {
        let field = Heightfield::with_noise(
            Arc::new(ConstantNoise(-1.0)),
            HeightfieldSettings::new(100.0, 32, 5.0),
        )
        .unwrap();
        assert_eq!(field.terrain_class_at(10.0, 10.0), TerrainClass::Water);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let site = field.find_flat_site(10.0, 0.08, &mut rng);
        assert!(site.fallback);
        assert_eq!(site.position.x, 0.0);
        assert_eq!(site.position.z, 0.0);
    }

    #[test]
    fn test_find_flat_site_on_flat_land() {
        // Constant 0.3: continental 0.65 lands on the grass band everywhere
        let field = Heightfield::with_noise(
            Arc::new(ConstantNoise(0.3)),
            HeightfieldSettings::new(100.0, 32, 5.0),
        )
        .unwrap();
        assert!(!field.terrain_class_at(0.0, 0.0).is_wet());

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let site = field.find_flat_site(10.0, 0.08, &mut rng);
        assert!(!site.fallback);
        assert!(field.contains(site.position.x, site.position.z));
    }

    #[test]
    fn test_ramp_slope_is_exact() {
        let field = ramp_field(0.25);
        assert!((field.slope_at(1.0, 2.0) - 0.25).abs() < 1e-9);
        assert!((field.slope_at(-3.5, 0.5) - 0.25).abs() < 1e-9);
    }
}

/// A 20×20 world whose height rises by `slope` per unit along x, centred on
/// half of a 20-unit max height. Shared with the placement tests.
#[cfg(test)]
pub(crate) fn ramp_field(slope: f64) -> Heightfield {
    let resolution = 21;
    let heights = (0..resolution)
        .flat_map(|_| (0..resolution).map(move |x| 10.0 + slope * (x as f64 - 10.0)))
        .collect();
    let grid = ElevationGrid::from_heights(resolution, 20.0, heights);
    Heightfield::from_grid(Arc::new(super::noise::ConstantNoise(0.3)), grid, 20.0)
}
