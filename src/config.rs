use crate::error::{Result, WorldError};
use crate::procgen::scatter::cells_per_side;
use crate::procgen::terrain::MAX_RESOLUTION;
use crate::procgen::zones::MAX_DISTRICTS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Everything needed to build a world. Two builds from equal configs are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u64,
    /// Side length of the square world, centred on the origin
    pub size: f64,
    /// Elevation grid samples per side
    pub resolution: usize,
    pub max_height: f64,
    /// Peripheral districts around the central one
    pub district_count: usize,
    pub tree_density: f64,
    pub rock_density: f64,
    pub plant_density: f64,
    pub decoration_density: f64,
    /// Scatter pass cell size in world units
    pub grid_size: f64,
    pub path_width: f64,
    pub main_road_width: f64,
    /// Distance used by the central-difference slope estimate
    pub slope_sample_distance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            size: 100.0,
            resolution: 128,
            max_height: 5.0,
            district_count: 4,
            tree_density: 0.5,
            rock_density: 0.3,
            plant_density: 0.6,
            decoration_density: 0.4,
            grid_size: 5.0,
            path_width: 2.0,
            main_road_width: 3.5,
            slope_sample_distance: 1.0,
        }
    }
}

impl WorldConfig {
    /// Load a config file. `.yaml`/`.yml` files are read as YAML, anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let config: WorldConfig = if is_yaml {
            serde_yaml::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load world config: {}, using defaults", e);
            Self::default()
        })
    }

    /// Reject configurations that cannot produce a world.
    pub fn validate(&self) -> Result<()> {
        require_positive("size", self.size)?;
        require_positive("max_height", self.max_height)?;
        require_positive("grid_size", self.grid_size)?;
        require_positive("path_width", self.path_width)?;
        require_positive("main_road_width", self.main_road_width)?;
        require_positive("slope_sample_distance", self.slope_sample_distance)?;

        if !(2..=MAX_RESOLUTION).contains(&self.resolution) {
            return Err(WorldError::InvalidConfig(format!(
                "resolution must be within 2..={}, got {}",
                MAX_RESOLUTION, self.resolution
            )));
        }
        if self.district_count > MAX_DISTRICTS {
            return Err(WorldError::InvalidConfig(format!(
                "district_count must be at most {}, got {}",
                MAX_DISTRICTS, self.district_count
            )));
        }
        cells_per_side(self.size, self.grid_size)?;

        for (name, value) in [
            ("tree_density", self.tree_density),
            ("rock_density", self.rock_density),
            ("plant_density", self.plant_density),
            ("decoration_density", self.decoration_density),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WorldError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WorldError::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}
