/// Static generation catalogs: zone types, trees, rocks, plants, decorations
use super::world_data::{Rgb, Span};
use serde::{Deserialize, Serialize};

/// District flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Residential,
    Commercial,
    Rural,
    Park,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofStyle {
    Pitched,
    Flat,
}

/// Fixed generation parameters for one zone type
#[derive(Debug, Serialize)]
pub struct ZoneParams {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Map tint for the district overlay
    pub color: Rgb,
    pub building_density: f64,
    pub building_height: Span,
    pub tree_density: f64,
    pub decoration_density: f64,
    pub roof_style: RoofStyle,
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    pub decorations: &'static [DecorationKind],
    pub trees: &'static [TreeKind],
}

static RESIDENTIAL: ZoneParams = ZoneParams {
    id: "residential",
    label: "Residential District",
    description: "A peaceful neighborhood with homes and gardens",
    color: Rgb::new(0x4d, 0xaf, 0x7c),
    building_density: 0.7,
    building_height: Span::new(1.5, 3.0),
    tree_density: 0.4,
    decoration_density: 0.5,
    roof_style: RoofStyle::Pitched,
    primary_color: Rgb::new(0xf6, 0xbd, 0x60),
    secondary_color: Rgb::new(0xf7, 0xed, 0xe2),
    decorations: &[
        DecorationKind::Mailbox,
        DecorationKind::Garden,
        DecorationKind::Bench,
        DecorationKind::Lamppost,
        DecorationKind::Flower,
    ],
    trees: &[TreeKind::Oak, TreeKind::Maple, TreeKind::Cherry],
};

static COMMERCIAL: ZoneParams = ZoneParams {
    id: "commercial",
    label: "Commercial District",
    description: "Busy area with shops and businesses",
    color: Rgb::new(0x84, 0xa5, 0x9d),
    building_density: 0.9,
    building_height: Span::new(3.0, 5.0),
    tree_density: 0.2,
    decoration_density: 0.8,
    roof_style: RoofStyle::Flat,
    primary_color: Rgb::new(0xf2, 0x84, 0x82),
    secondary_color: Rgb::new(0xf5, 0xca, 0xc3),
    decorations: &[
        DecorationKind::Sign,
        DecorationKind::Trash,
        DecorationKind::Lamppost,
        DecorationKind::Bench,
    ],
    trees: &[TreeKind::Oak, TreeKind::Decorative],
};

static RURAL: ZoneParams = ZoneParams {
    id: "rural",
    label: "Rural District",
    description: "Countryside with farms and wide open spaces",
    color: Rgb::new(0xf6, 0xd1, 0x86),
    building_density: 0.3,
    building_height: Span::new(1.0, 2.0),
    tree_density: 0.6,
    decoration_density: 0.3,
    roof_style: RoofStyle::Pitched,
    primary_color: Rgb::new(0xb5, 0x83, 0x8d),
    secondary_color: Rgb::new(0xe5, 0x98, 0x9b),
    decorations: &[
        DecorationKind::Fence,
        DecorationKind::Well,
        DecorationKind::Hay,
        DecorationKind::Rock,
    ],
    trees: &[TreeKind::Pine, TreeKind::Oak, TreeKind::Maple],
};

static PARK: ZoneParams = ZoneParams {
    id: "park",
    label: "Park District",
    description: "Natural area with trees, ponds, and walking paths",
    color: Rgb::new(0x42, 0xa5, 0xf5),
    building_density: 0.1,
    building_height: Span::new(1.0, 1.5),
    tree_density: 0.8,
    decoration_density: 0.6,
    roof_style: RoofStyle::Pitched,
    primary_color: Rgb::new(0xca, 0xff, 0xbf),
    secondary_color: Rgb::new(0x9b, 0xf6, 0xff),
    decorations: &[
        DecorationKind::Bench,
        DecorationKind::Flower,
        DecorationKind::Bush,
        DecorationKind::Rock,
        DecorationKind::Lamppost,
    ],
    trees: &[
        TreeKind::Oak,
        TreeKind::Maple,
        TreeKind::Pine,
        TreeKind::Cherry,
        TreeKind::Willow,
    ],
};

impl ZoneType {
    /// Order in which peripheral districts cycle through zone types
    pub const CYCLE: [ZoneType; 4] = [
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Rural,
        ZoneType::Park,
    ];

    pub fn params(self) -> &'static ZoneParams {
        match self {
            ZoneType::Residential => &RESIDENTIAL,
            ZoneType::Commercial => &COMMERCIAL,
            ZoneType::Rural => &RURAL,
            ZoneType::Park => &PARK,
        }
    }

    pub fn id(self) -> &'static str {
        self.params().id
    }

    /// Case-insensitive lookup by catalog id
    pub fn from_id(id: &str) -> Option<ZoneType> {
        Self::CYCLE
            .into_iter()
            .find(|zone| zone.id().eq_ignore_ascii_case(id))
    }
}

/// Crown geometry hint for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrownShape {
    Cone,
    Sphere,
    Weeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Pine,
    Oak,
    Maple,
    Cherry,
    Willow,
    Decorative,
}

#[derive(Debug, Serialize)]
pub struct TreeArchetype {
    pub trunk_color: Rgb,
    pub leaves_color: Rgb,
    pub trunk_height: Span,
    pub trunk_radius: Span,
    pub leaves_radius: Span,
    pub crown: CrownShape,
}

const BARK: Rgb = Rgb::new(0x8b, 0x45, 0x13);
const SIENNA: Rgb = Rgb::new(0xa0, 0x52, 0x2d);

static TREE_ARCHETYPES: [TreeArchetype; 6] = [
    TreeArchetype {
        trunk_color: BARK,
        leaves_color: Rgb::new(0x2d, 0x6a, 0x4f),
        trunk_height: Span::new(2.0, 4.0),
        trunk_radius: Span::new(0.15, 0.3),
        leaves_radius: Span::new(1.2, 2.0),
        crown: CrownShape::Cone,
    },
    TreeArchetype {
        trunk_color: BARK,
        leaves_color: Rgb::new(0x40, 0x91, 0x6c),
        trunk_height: Span::new(1.5, 3.0),
        trunk_radius: Span::new(0.2, 0.4),
        leaves_radius: Span::new(1.5, 2.5),
        crown: CrownShape::Sphere,
    },
    TreeArchetype {
        trunk_color: SIENNA,
        leaves_color: Rgb::new(0xd8, 0xf3, 0xdc),
        trunk_height: Span::new(2.0, 3.5),
        trunk_radius: Span::new(0.15, 0.3),
        leaves_radius: Span::new(1.8, 2.8),
        crown: CrownShape::Sphere,
    },
    TreeArchetype {
        trunk_color: SIENNA,
        leaves_color: Rgb::new(0xff, 0xcf, 0xd2),
        trunk_height: Span::new(1.8, 2.8),
        trunk_radius: Span::new(0.15, 0.25),
        leaves_radius: Span::new(1.5, 2.2),
        crown: CrownShape::Sphere,
    },
    TreeArchetype {
        trunk_color: BARK,
        leaves_color: Rgb::new(0x95, 0xd5, 0xb2),
        trunk_height: Span::new(3.0, 4.5),
        trunk_radius: Span::new(0.2, 0.4),
        leaves_radius: Span::new(2.0, 3.0),
        crown: CrownShape::Weeping,
    },
    TreeArchetype {
        trunk_color: BARK,
        leaves_color: Rgb::new(0xff, 0x70, 0xa6),
        trunk_height: Span::new(1.5, 2.5),
        trunk_radius: Span::new(0.1, 0.2),
        leaves_radius: Span::new(1.0, 1.8),
        crown: CrownShape::Sphere,
    },
];

impl TreeKind {
    pub const ALL: [TreeKind; 6] = [
        TreeKind::Pine,
        TreeKind::Oak,
        TreeKind::Maple,
        TreeKind::Cherry,
        TreeKind::Willow,
        TreeKind::Decorative,
    ];

    pub fn archetype(self) -> &'static TreeArchetype {
        let index = match self {
            TreeKind::Pine => 0,
            TreeKind::Oak => 1,
            TreeKind::Maple => 2,
            TreeKind::Cherry => 3,
            TreeKind::Willow => 4,
            TreeKind::Decorative => 5,
        };
        &TREE_ARCHETYPES[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RockShape {
    Angular,
    Smooth,
}

#[derive(Debug, Serialize)]
pub struct RockArchetype {
    pub color: Rgb,
    pub size: Span,
    pub shape: RockShape,
}

pub static ROCK_ARCHETYPES: [RockArchetype; 4] = [
    RockArchetype {
        color: Rgb::new(0x80, 0x80, 0x80),
        size: Span::new(0.3, 1.2),
        shape: RockShape::Angular,
    },
    RockArchetype {
        color: Rgb::new(0xa9, 0xa9, 0xa9),
        size: Span::new(0.2, 0.9),
        shape: RockShape::Smooth,
    },
    RockArchetype {
        color: Rgb::new(0xd3, 0xd3, 0xd3),
        size: Span::new(0.4, 1.5),
        shape: RockShape::Angular,
    },
    RockArchetype {
        color: Rgb::new(0xa5, 0x2a, 0x2a),
        size: Span::new(0.3, 1.0),
        shape: RockShape::Smooth,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantShape {
    Flower,
    Bush,
    Grass,
}

#[derive(Debug, Serialize)]
pub struct PlantArchetype {
    pub color: Rgb,
    pub size: Span,
    pub shape: PlantShape,
}

pub static PLANT_ARCHETYPES: [PlantArchetype; 4] = [
    PlantArchetype {
        color: Rgb::new(0xff, 0x63, 0x47),
        size: Span::new(0.2, 0.4),
        shape: PlantShape::Flower,
    },
    PlantArchetype {
        color: Rgb::new(0xff, 0xd7, 0x00),
        size: Span::new(0.2, 0.4),
        shape: PlantShape::Flower,
    },
    PlantArchetype {
        color: Rgb::new(0x22, 0x8b, 0x22),
        size: Span::new(0.5, 1.0),
        shape: PlantShape::Bush,
    },
    PlantArchetype {
        color: Rgb::new(0x7c, 0xfc, 0x00),
        size: Span::new(0.1, 0.3),
        shape: PlantShape::Grass,
    },
];

/// Everything a district catalog may name. Only some kinds have a
/// [`DecorationStyle`]; the rest are skipped by the scatter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationKind {
    Mailbox,
    Garden,
    Bench,
    Lamppost,
    Flower,
    Sign,
    Trash,
    Fence,
    Well,
    Hay,
    Rock,
    Bush,
}

#[derive(Debug, Serialize)]
pub struct DecorationStyle {
    pub color: Rgb,
    pub size: f64,
}

static MAILBOX: DecorationStyle = DecorationStyle { color: Rgb::new(0x1e, 0x88, 0xe5), size: 0.5 };
static BENCH: DecorationStyle = DecorationStyle { color: Rgb::new(0x8b, 0x45, 0x13), size: 1.2 };
static LAMPPOST: DecorationStyle = DecorationStyle { color: Rgb::new(0x21, 0x21, 0x21), size: 2.0 };
static WELL: DecorationStyle = DecorationStyle { color: Rgb::new(0x79, 0x55, 0x48), size: 1.0 };
static FENCE: DecorationStyle = DecorationStyle { color: Rgb::new(0xa1, 0x88, 0x7f), size: 0.8 };
static SIGN: DecorationStyle = DecorationStyle { color: Rgb::new(0xff, 0xeb, 0x3b), size: 0.7 };

impl DecorationKind {
    pub fn style(self) -> Option<&'static DecorationStyle> {
        match self {
            DecorationKind::Mailbox => Some(&MAILBOX),
            DecorationKind::Bench => Some(&BENCH),
            DecorationKind::Lamppost => Some(&LAMPPOST),
            DecorationKind::Well => Some(&WELL),
            DecorationKind::Fence => Some(&FENCE),
            DecorationKind::Sign => Some(&SIGN),
            _ => None,
        }
    }
}
