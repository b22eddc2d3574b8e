use delivery_worldgen::procgen::noise::ConstantNoise;
use delivery_worldgen::procgen::routes::{RoadClass, PATH_CLEARANCE, POST_OFFICE_ID};
use delivery_worldgen::procgen::terrain::{classify, Heightfield, HeightfieldSettings, MAX_RESOLUTION};
use delivery_worldgen::procgen::zones::{influence, District, MAX_DISTRICTS};
use delivery_worldgen::procgen::{Point2, Point3, TerrainClass, ZoneType};
use delivery_worldgen::{build_world, WorldConfig, WorldError};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, OnceLock};

fn reference_world() -> &'static delivery_worldgen::WorldDescription {
    static WORLD: OnceLock<delivery_worldgen::WorldDescription> = OnceLock::new();
    WORLD.get_or_init(|| build_world(&WorldConfig::default()).unwrap())
}

#[test]
fn test_same_seed_same_world() {
    let config = WorldConfig {
        seed: 42,
        resolution: 64,
        ..WorldConfig::default()
    };
    let a = build_world(&config).unwrap();
    let b = build_world(&config).unwrap();

    assert_eq!(a.elevation_grid(), b.elevation_grid());
    assert_eq!(a.districts(), b.districts());
    assert_eq!(a.connections(), b.connections());
    assert_eq!(a.trees(), b.trees());
    assert_eq!(a.rocks(), b.rocks());
    assert_eq!(a.plants(), b.plants());
    assert_eq!(a.decorations(), b.decorations());
    assert_eq!(
        serde_json::to_string(&a.export()).unwrap(),
        serde_json::to_string(&b.export()).unwrap()
    );
}

#[test]
fn test_different_seeds_differ() {
    let a = build_world(&WorldConfig { seed: 1, resolution: 32, ..WorldConfig::default() }).unwrap();
    let b = build_world(&WorldConfig { seed: 2, resolution: 32, ..WorldConfig::default() }).unwrap();
    assert_ne!(a.elevation_grid().heights, b.elevation_grid().heights);
}

#[test]
fn test_default_scenario() {
    let world = reference_world();

    assert_eq!(world.elevation_grid().resolution, 128);
    assert_eq!(world.districts().len(), 5);
    assert_eq!(world.districts()[0].zone_type, ZoneType::Commercial);
    assert_eq!(world.districts()[0].center, Point2::ORIGIN);

    let count = |class: RoadClass| world.connections().iter().filter(|c| c.road_class == class).count();
    assert_eq!(count(RoadClass::MainRoad), 5);
    assert_eq!(count(RoadClass::SecondaryRoad), 4);

    let ids: Vec<&str> = world.locations().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            POST_OFFICE_ID,
            "district_commercial",
            "district_residential",
            "district_commercial_2",
            "district_rural",
            "district_park",
        ]
    );
}

#[test]
fn test_grid_within_bounds() {
    let world = reference_world();
    let max = world.config().max_height;
    for &h in &world.elevation_grid().heights {
        assert!(h.is_finite());
        assert!((0.0..=max).contains(&h));
    }
}

#[test]
fn test_path_points_above_terrain() {
    let world = reference_world();
    for connection in world.connections() {
        for p in &connection.points {
            let expected = world.height_at(p.x, p.z) + PATH_CLEARANCE;
            assert!((p.y - expected).abs() < 1e-9, "{} point off surface", connection.id);
        }
    }
}

#[test]
fn test_nothing_placed_on_water() {
    let world = reference_world();
    let class = |p: &Point3| world.terrain_class_at(p.x, p.z);

    assert!(world.trees().iter().all(|t| class(&t.position) != TerrainClass::Water));
    assert!(world.plants().iter().all(|p| class(&p.position) != TerrainClass::Water));
    assert!(world.decorations().iter().all(|d| class(&d.position) != TerrainClass::Water));
    assert!(world.rocks().iter().all(|r| !class(&r.position).is_wet()));
}

#[test]
fn test_every_point_has_a_district() {
    let world = reference_world();
    let half = world.config().size / 2.0;
    for i in 0..=20 {
        for j in 0..=20 {
            let x = -half + i as f64 * half / 10.0;
            let z = -half + j as f64 * half / 10.0;
            let district = world.district_at(x, z);
            assert!(world.districts().iter().any(|d| d.id == district.id));
        }
    }
}

#[test]
fn test_shortest_route_follows_roads() {
    let world = reference_world();
    let plan = world.shortest_route("district_residential", "district_park").unwrap();

    assert!(plan.length > 0.0);
    assert_eq!(plan.connections.len(), plan.nodes.len() - 1);
    assert!(world.shortest_route(POST_OFFICE_ID, "nowhere").is_none());
}

#[test]
fn test_nearest_path_point_on_network() {
    let world = reference_world();
    let hub = world.location(POST_OFFICE_ID).unwrap().position;
    let hit = world.nearest_path_point(hub).unwrap();
    assert!(hit.distance < 1.0);
}

#[test]
fn test_all_water_flat_site_fallback() {
    let terrain = Heightfield::with_noise(
        Arc::new(ConstantNoise(-1.0)),
        HeightfieldSettings::new(100.0, 32, 5.0),
    )
    .unwrap();
    assert_eq!(terrain.terrain_class_at(10.0, 10.0), TerrainClass::Water);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let site = terrain.find_flat_site(10.0, 0.08, &mut rng);
    assert!(site.fallback);
    assert_eq!(site.position.x, 0.0);
    assert_eq!(site.position.z, 0.0);
}

#[test]
fn test_invalid_configs_rejected() {
    let bad = [
        WorldConfig { size: 0.0, ..WorldConfig::default() },
        WorldConfig { size: f64::NAN, ..WorldConfig::default() },
        WorldConfig { resolution: 1, ..WorldConfig::default() },
        WorldConfig { max_height: -1.0, ..WorldConfig::default() },
        WorldConfig { grid_size: 0.0, ..WorldConfig::default() },
        WorldConfig { tree_density: -0.1, ..WorldConfig::default() },
        WorldConfig { path_width: 0.0, ..WorldConfig::default() },
        WorldConfig { grid_size: 1e-9, ..WorldConfig::default() },
        WorldConfig { size: 1e12, ..WorldConfig::default() },
        WorldConfig { district_count: usize::MAX, ..WorldConfig::default() },
        WorldConfig { district_count: MAX_DISTRICTS + 1, ..WorldConfig::default() },
        WorldConfig { resolution: usize::MAX, ..WorldConfig::default() },
        WorldConfig { resolution: MAX_RESOLUTION + 1, ..WorldConfig::default() },
    ];
    for config in &bad {
        assert!(
            matches!(build_world(config), Err(WorldError::InvalidConfig(_))),
            "accepted {:?}",
            config
        );
    }
}

#[test]
fn test_zero_districts_still_has_center() {
    let world = build_world(&WorldConfig {
        district_count: 0,
        resolution: 32,
        ..WorldConfig::default()
    })
    .unwrap();

    assert_eq!(world.districts().len(), 1);
    assert_eq!(world.district_at(45.0, -45.0).id, world.districts()[0].id);
    assert_eq!(world.connections().len(), 1);
}

fn district(radius: f64) -> District {
    District {
        id: "district_0".to_string(),
        zone_type: ZoneType::Park,
        center: Point2::new(5.0, -5.0),
        elevation: 0.0,
        radius,
        importance: 1.0,
    }
}

proptest! {
    #[test]
    fn prop_heights_within_bounds(x in -80.0f64..80.0, z in -80.0f64..80.0) {
        let world = reference_world();
        let h = world.height_at(x, z);
        prop_assert!(h.is_finite());
        prop_assert!((0.0..=world.config().max_height).contains(&h));
    }

    #[test]
    fn prop_classification_by_height(h in 0.0f64..5.0, m in 0.0f64..1.0) {
        let class = classify(h, m, 5.0);
        let rank = |c: TerrainClass| match c {
            TerrainClass::Water => 0,
            TerrainClass::Beach => 1,
            TerrainClass::Grass | TerrainClass::Forest => 2,
            TerrainClass::Mountain => 3,
            TerrainClass::Snow => 4,
        };
        // Raising the height never moves a point to a lower band
        let higher = classify((h + 0.5).min(5.0), m, 5.0);
        prop_assert!(rank(higher) >= rank(class));
        if h < 0.25 * 5.0 {
            prop_assert_eq!(class, TerrainClass::Water);
        }
        if h > 0.8 * 5.0 {
            prop_assert_eq!(class, TerrainClass::Snow);
        }
    }

    #[test]
    fn prop_influence_in_unit_range(radius in 1.0f64..30.0, dx in -60.0f64..60.0, dz in -60.0f64..60.0) {
        let d = district(radius);
        let p = Point2::new(d.center.x + dx, d.center.z + dz);
        let w = influence(&d, p);
        prop_assert!((0.0..=1.0).contains(&w));

        let dist = (dx * dx + dz * dz).sqrt();
        if dist < radius - 1e-9 {
            prop_assert_eq!(w, 1.0);
        }
        if dist > radius * 1.5 + 1e-9 {
            prop_assert_eq!(w, 0.0);
        }
    }
}
