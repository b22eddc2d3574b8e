/// District layout and district-aware placement rules
use super::catalog::{DecorationKind, RoofStyle, TreeKind, ZoneParams, ZoneType};
use super::noise::{normalized, NoiseChannel};
use super::terrain::Heightfield;
use super::world_data::{Point2, Rgb, TerrainClass};
use crate::error::{Result, WorldError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::TAU;
use tracing::{debug, info};

/// Buildings are not placed on slopes steeper than this
pub const MAX_BUILDING_SLOPE: f64 = 0.3;

/// Upper bound on peripheral districts per world
pub const MAX_DISTRICTS: usize = 64;

const BUILDING_CLUSTER_FREQUENCY: f64 = 0.05;
const TREE_CLUSTER_FREQUENCY: f64 = 0.1;

/// A circular region imposing one zone type's rules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct District {
    pub id: String,
    pub zone_type: ZoneType,
    pub center: Point2,
    /// Terrain height under the centre
    pub elevation: f64,
    pub radius: f64,
    pub importance: f64,
}

impl District {
    pub fn params(&self) -> &'static ZoneParams {
        self.zone_type.params()
    }

    pub fn distance_to(&self, point: &Point2) -> f64 {
        self.center.distance(point)
    }

    pub fn contains(&self, point: &Point2) -> bool {
        self.distance_to(point) <= self.radius
    }
}

/// Shape and palette for a building at a given spot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingParams {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub roof_height: f64,
    pub roof_style: RoofStyle,
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    /// Probability that a facade slot holds a window
    pub window_ratio: f64,
    pub district_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecorationParams {
    pub kind: DecorationKind,
    pub scale: f64,
    /// Yaw in radians
    pub rotation: f64,
    pub district_id: String,
}

/// Owns the insertion-ordered district list
#[derive(Debug, Clone, Serialize)]
pub struct ZoneManager {
    districts: Vec<District>,
}

impl ZoneManager {
    /// Lay out one central commercial district plus `district_count`
    /// peripheral districts evenly spaced around it.
    pub fn new<R: Rng + ?Sized>(terrain: &Heightfield, district_count: usize, rng: &mut R) -> Result<Self> {
        if district_count > MAX_DISTRICTS {
            return Err(WorldError::InvalidConfig(format!(
                "district_count must be at most {}, got {}",
                MAX_DISTRICTS, district_count
            )));
        }

        let size = terrain.size();
        let mut zones = Self { districts: Vec::with_capacity(district_count + 1) };

        zones.add_district(ZoneType::Commercial, Point2::ORIGIN, size * 0.1, 1.0, terrain)?;

        for i in 0..district_count {
            let angle = (i as f64 / district_count as f64) * TAU;
            let distance = size * 0.25;

            let center = Point2::new(
                angle.cos() * distance * rng.gen_range(0.8..1.2),
                angle.sin() * distance * rng.gen_range(0.8..1.2),
            );
            let zone_type = ZoneType::CYCLE[i % ZoneType::CYCLE.len()];
            let radius = size * rng.gen_range(0.10..0.15);
            let importance = rng.gen_range(0.7..1.0);

            zones.add_district(zone_type, center, radius, importance, terrain)?;
        }

        info!("Created {} districts", zones.districts.len());
        Ok(zones)
    }

    /// Append a district. Only valid while the world is being built.
    pub fn add_district(
        &mut self,
        zone_type: ZoneType,
        center: Point2,
        radius: f64,
        importance: f64,
        terrain: &Heightfield,
    ) -> Result<&District> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(WorldError::InvalidConfig(format!(
                "district radius must be positive, got {}",
                radius
            )));
        }
        if !(0.0..=1.0).contains(&importance) {
            return Err(WorldError::InvalidConfig(format!(
                "district importance must be within [0, 1], got {}",
                importance
            )));
        }

        let district = District {
            id: format!("district_{}", self.districts.len()),
            zone_type,
            center,
            elevation: terrain.height_at(center.x, center.z),
            radius,
            importance,
        };
        debug!(
            "District {} ({}) at ({:.1}, {:.1}) r={:.1}",
            district.id,
            zone_type.id(),
            center.x,
            center.z,
            radius
        );

        self.districts.push(district);
        Ok(&self.districts[self.districts.len() - 1])
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn district(&self, id: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }

    /// The first district containing `point`, else the nearest by centre.
    pub fn district_at(&self, point: Point2) -> &District {
        self.districts
            .iter()
            .find(|d| d.contains(&point))
            .or_else(|| self.nearest_district(point))
            .unwrap_or(&self.districts[0])
    }

    pub fn nearest_district(&self, point: Point2) -> Option<&District> {
        // Strict comparison keeps the earliest district on ties
        let mut nearest: Option<(&District, f64)> = None;
        for district in &self.districts {
            let distance = district.distance_to(&point);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((district, distance));
            }
        }
        nearest.map(|(district, _)| district)
    }

    /// Blend weight of `district` at `point`: 1 inside, fading linearly to 0
    /// over another half radius.
    pub fn influence_at(&self, district: &District, point: Point2) -> f64 {
        influence(district, point)
    }

    pub fn building_params_at<R: Rng + ?Sized>(&self, point: Point2, rng: &mut R) -> BuildingParams {
        let district = self.district_at(point);
        let params = district.params();

        let mut height = params.building_height.lerp(rng.gen());
        let mut width = 2.0 + rng.gen::<f64>() * 1.5;
        let mut depth = 2.0 + rng.gen::<f64>() * 1.5;
        let roof_height = 1.0 + rng.gen::<f64>() * 0.5;
        let window_ratio = 0.3 + rng.gen::<f64>() * 0.5;

        // Buildings shrink toward the district edge
        let edge_ratio = (district.distance_to(&point) / district.radius).min(1.0);
        height *= 1.0 - edge_ratio * 0.3;

        height *= rng.gen_range(0.9..1.1);
        width *= rng.gen_range(0.9..1.1);
        depth *= rng.gen_range(0.9..1.1);

        BuildingParams {
            height,
            width,
            depth,
            roof_height,
            roof_style: params.roof_style,
            primary_color: params.primary_color,
            secondary_color: params.secondary_color,
            window_ratio,
            district_id: district.id.clone(),
        }
    }

    pub fn should_place_building_at(&self, point: Point2, terrain: &Heightfield) -> bool {
        if terrain.terrain_class_at(point.x, point.z).is_wet() {
            return false;
        }
        if terrain.slope_at(point.x, point.z) > MAX_BUILDING_SLOPE {
            return false;
        }

        let density = self.district_at(point).params().building_density;
        cluster_value(terrain, point, BUILDING_CLUSTER_FREQUENCY) > 1.0 - density
    }

    pub fn should_place_tree_at(&self, point: Point2, terrain: &Heightfield) -> bool {
        if terrain.terrain_class_at(point.x, point.z) == TerrainClass::Water {
            return false;
        }

        let density = self.district_at(point).params().tree_density;
        cluster_value(terrain, point, TREE_CLUSTER_FREQUENCY) > 1.0 - density
    }

    pub fn decoration_params_at<R: Rng + ?Sized>(&self, point: Point2, rng: &mut R) -> DecorationParams {
        let district = self.district_at(point);
        let kind = district
            .params()
            .decorations
            .choose(rng)
            .copied()
            .unwrap_or(DecorationKind::Rock);

        DecorationParams {
            kind,
            scale: rng.gen_range(0.8..1.2),
            rotation: rng.gen::<f64>() * TAU,
            district_id: district.id.clone(),
        }
    }

    pub fn tree_kind_at<R: Rng + ?Sized>(&self, point: Point2, rng: &mut R) -> TreeKind {
        self.district_at(point)
            .params()
            .trees
            .choose(rng)
            .copied()
            .unwrap_or(TreeKind::Pine)
    }
}

pub fn influence(district: &District, point: Point2) -> f64 {
    let distance = district.distance_to(&point);
    if distance <= district.radius {
        return 1.0;
    }

    let fade = district.radius * 0.5;
    let max_distance = district.radius + fade;
    if distance >= max_distance {
        return 0.0;
    }

    1.0 - (distance - district.radius) / fade
}

fn cluster_value(terrain: &Heightfield, point: Point2, frequency: f64) -> f64 {
    normalized(terrain.noise().noise_2d(
        NoiseChannel::Clustering,
        point.x * frequency,
        point.z * frequency,
    ))
}
