/// Data structures shared by the generation stages
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the world plane (x east, z south)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub z: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, z: 0.0 };

    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn with_height(&self, y: f64) -> Point3 {
        Point3::new(self.x, y, self.z)
    }
}

/// A point in world space, `y` up
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Drop the height component
    pub fn flat(&self) -> Point2 {
        Point2::new(self.x, self.z)
    }

    pub fn lerp(&self, other: &Point3, t: f64) -> Point3 {
        Point3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Shift each channel independently by up to `±amount` units.
    pub fn jitter<R: Rng + ?Sized>(&self, rng: &mut R, amount: u8) -> Rgb {
        let amount = amount as i16;
        let mut out = [0u8; 3];
        for (dst, &src) in out.iter_mut().zip(self.0.iter()) {
            let shifted = src as i16 + rng.gen_range(-amount..=amount);
            *dst = shifted.clamp(0, 255) as u8;
        }
        Rgb(out)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Inclusive-exclusive numeric range used by the static catalogs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn lerp(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.lerp(rng.gen::<f64>())
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Surface classification derived from height and moisture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Water,
    Beach,
    Grass,
    Forest,
    Mountain,
    Snow,
}

impl TerrainClass {
    /// Whether anything may stand on this surface
    pub fn is_wet(&self) -> bool {
        matches!(self, TerrainClass::Water | TerrainClass::Beach)
    }
}

/// Dense square elevation grid centred on the world origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    /// Samples per side
    pub resolution: usize,
    /// World side length covered by the grid
    pub size: f64,
    /// Distance between neighbouring samples
    pub cell_size: f64,
    /// World-space coordinate of sample (0, 0) on both axes
    pub origin: f64,
    /// Flattened height values (row-major order: heights[z * resolution + x])
    pub heights: Vec<f64>,
}

impl ElevationGrid {
    /// Wrap precomputed heights. `heights.len()` must be `resolution²`.
    pub(crate) fn from_heights(resolution: usize, size: f64, heights: Vec<f64>) -> Self {
        debug_assert_eq!(heights.len(), resolution * resolution);
        Self {
            resolution,
            size,
            cell_size: size / (resolution - 1) as f64,
            origin: -size / 2.0,
            heights,
        }
    }

    /// World coordinate of a grid index along either axis
    pub fn world_coord(&self, index: usize) -> f64 {
        self.origin + index as f64 * self.cell_size
    }

    /// Get height at grid coordinates (clamped to valid range)
    pub fn get_height(&self, x: usize, z: usize) -> f64 {
        let last = self.resolution - 1;
        self.heights[z.min(last) * self.resolution + x.min(last)]
    }

    /// Sample height at world coordinates using bilinear interpolation.
    /// Positions outside the grid read the nearest edge.
    pub fn sample(&self, world_x: f64, world_z: f64) -> f64 {
        let last = (self.resolution - 1) as f64;

        // Convert world coords to grid coords
        let grid_x = ((world_x - self.origin) / self.cell_size).clamp(0.0, last);
        let grid_z = ((world_z - self.origin) / self.cell_size).clamp(0.0, last);

        let x0 = grid_x.floor() as usize;
        let z0 = grid_z.floor() as usize;
        let x1 = (x0 + 1).min(self.resolution - 1);
        let z1 = (z0 + 1).min(self.resolution - 1);

        let fx = grid_x - x0 as f64;
        let fz = grid_z - z0 as f64;

        let h00 = self.get_height(x0, z0);
        let h10 = self.get_height(x1, z0);
        let h01 = self.get_height(x0, z1);
        let h11 = self.get_height(x1, z1);

        let h0 = h00 * (1.0 - fx) + h10 * fx;
        let h1 = h01 * (1.0 - fx) + h11 * fx;

        h0 * (1.0 - fz) + h1 * fz
    }

    pub fn min_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}
