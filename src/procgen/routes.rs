/// Road network: named locations joined by terrain-following curves
use super::catalog::ZoneType;
use super::terrain::Heightfield;
use super::world_data::Point3;
use super::zones::ZoneManager;
use crate::error::{Result, WorldError};
use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, info, warn};

/// Height of path samples above the terrain surface
pub const PATH_CLEARANCE: f64 = 0.1;

/// Id of the central location every main road starts from
pub const POST_OFFICE_ID: &str = "postOffice";

/// Curve bulge as a fraction of the straight-line distance
const CURVE_MAGNITUDE: f64 = 0.2;

const MAIN_ROAD_SUBDIVISIONS: usize = 8;
const RING_ROAD_SUBDIVISIONS: usize = 6;
const ROUTE_SUBDIVISIONS: usize = 5;

const POST_OFFICE_SITE_SIZE: f64 = 10.0;
const POST_OFFICE_MAX_SLOPE: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// The post office hub
    Important,
    District(ZoneType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub kind: LocationKind,
    pub position: Point3,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Node standing on a named location
    Location(String),
    /// Intermediate point on a generated path
    Junction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub position: Point3,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadClass {
    MainRoad,
    SecondaryRoad,
    /// Curve materialized on request between two locations
    Route,
}

/// A generated curve, pre-sampled into terrain-following points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathConnection {
    pub id: String,
    pub road_class: RoadClass,
    pub width: f64,
    pub endpoints: (NodeId, NodeId),
    pub points: Vec<Point3>,
}

impl PathConnection {
    /// Polyline length through the sampled points
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Result of a nearest-point query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathHit {
    pub point: Point3,
    pub distance: f64,
    pub path_id: String,
}

/// A path through the existing network found by [`RouteNetwork::shortest_route`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub nodes: Vec<NodeId>,
    /// Indices into [`RouteNetwork::connections`], one per hop
    pub connections: Vec<usize>,
    pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSettings {
    pub path_width: f64,
    pub main_road_width: f64,
}

/// Location registry plus node and connection lists. Append-only while the
/// world is built, read-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteNetwork {
    #[serde(skip)]
    registry: HashMap<String, usize>,
    locations: Vec<Location>,
    nodes: Vec<Node>,
    connections: Vec<PathConnection>,
    #[serde(skip)]
    route_width: f64,
}

impl RouteNetwork {
    pub fn new(route_width: f64) -> Self {
        Self {
            route_width,
            ..Self::default()
        }
    }

    /// Build the default town: a post office on the flattest site found,
    /// one location per district, main roads from the post office to every
    /// district and a ring road through the peripheral districts.
    pub fn build<R: Rng + ?Sized>(
        terrain: &Heightfield,
        zones: &ZoneManager,
        settings: RouteSettings,
        rng: &mut R,
    ) -> Result<Self> {
        let mut network = Self::new(settings.path_width);

        let site = terrain.find_flat_site(POST_OFFICE_SITE_SIZE, POST_OFFICE_MAX_SLOPE, rng);
        if site.fallback {
            warn!("No flat site for the post office, placing it at the origin");
        }
        let hub = network.add_location(POST_OFFICE_ID, "Post Office", site.position, LocationKind::Important)?;

        let mut seen: HashMap<ZoneType, usize> = HashMap::new();
        let mut district_nodes = Vec::with_capacity(zones.districts().len());
        for district in zones.districts() {
            let count = seen.entry(district.zone_type).or_insert(0);
            *count += 1;
            let id = if *count == 1 {
                format!("district_{}", district.zone_type.id())
            } else {
                format!("district_{}_{}", district.zone_type.id(), count)
            };

            let position = district.center.with_height(district.elevation);
            let node = network.add_location(
                &id,
                district.params().label,
                position,
                LocationKind::District(district.zone_type),
            )?;
            district_nodes.push(node);
        }

        for &node in &district_nodes {
            network.create_path(
                hub,
                node,
                RoadClass::MainRoad,
                settings.main_road_width,
                MAIN_ROAD_SUBDIVISIONS,
                terrain,
                rng,
            )?;
        }

        // The first district is the central one; the ring joins the rest
        let ring = district_nodes.get(1..).unwrap_or(&[]);
        if ring.len() >= 2 {
            for (i, &current) in ring.iter().enumerate() {
                let next = ring[(i + 1) % ring.len()];
                network.create_path(
                    current,
                    next,
                    RoadClass::SecondaryRoad,
                    settings.path_width,
                    RING_ROAD_SUBDIVISIONS,
                    terrain,
                    rng,
                )?;
            }
        }

        info!(
            "Built route network: {} locations, {} nodes, {} paths",
            network.locations.len(),
            network.nodes.len(),
            network.connections.len()
        );
        Ok(network)
    }

    /// Register a named location and its node. Ids are unique.
    pub fn add_location(&mut self, id: &str, name: &str, position: Point3, kind: LocationKind) -> Result<NodeId> {
        if self.registry.contains_key(id) {
            return Err(WorldError::DuplicateLocation(id.to_string()));
        }

        let node = self.push_node(format!("node_{}", id), position, NodeKind::Location(id.to_string()));
        self.registry.insert(id.to_string(), self.locations.len());
        self.locations.push(Location {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            position,
            node,
        });
        Ok(node)
    }

    fn push_node(&mut self, label: String, position: Point3, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { id, label, position, kind });
        id
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.registry.get(id).map(|&index| &self.locations[index])
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn connections(&self) -> &[PathConnection] {
        &self.connections
    }

    /// Generate a quadratic curve between two nodes and sample it onto the
    /// terrain. Junction nodes are added at every other interior sample.
    /// Returns the index of the new connection. A repeated endpoint pair
    /// gets a `_<k>` suffix on its id.
    #[allow(clippy::too_many_arguments)]
    pub fn create_path<R: Rng + ?Sized>(
        &mut self,
        start: NodeId,
        end: NodeId,
        road_class: RoadClass,
        width: f64,
        subdivisions: usize,
        terrain: &Heightfield,
        rng: &mut R,
    ) -> Result<usize> {
        let from_node = self.node(start).ok_or(WorldError::UnknownNode(start.0))?;
        let to_node = self.node(end).ok_or(WorldError::UnknownNode(end.0))?;
        let (from, to) = (from_node.position, to_node.position);
        let base = format!("path_{}_{}", from_node.label, to_node.label);

        let id = self.unique_path_id(base);
        let points = sample_curve(from, to, subdivisions, terrain, rng);
        debug!("Path {} ({:?}): {} samples", id, road_class, points.len());

        let junctions: Vec<(usize, Point3)> = points
            .iter()
            .enumerate()
            .skip(1)
            .step_by(2)
            .filter(|(i, _)| *i < points.len() - 1)
            .map(|(i, p)| (i, *p))
            .collect();
        for (i, position) in junctions {
            self.push_node(format!("node_path_{}_{}", id, i), position, NodeKind::Junction);
        }

        self.connections.push(PathConnection {
            id,
            road_class,
            width,
            endpoints: (start, end),
            points,
        });
        Ok(self.connections.len() - 1)
    }

    fn unique_path_id(&self, base: String) -> String {
        let taken = |id: &str| self.connections.iter().any(|c| c.id == id);
        if !taken(&base) {
            return base;
        }
        let mut k = 2;
        loop {
            let id = format!("{}_{}", base, k);
            if !taken(&id) {
                return id;
            }
            k += 1;
        }
    }

    /// Closest sampled path point to `position`.
    ///
    /// Brute force over every sample of every connection, linear in the total
    /// sample count. Does not scale to an unbounded network.
    pub fn nearest_path_point(&self, position: Point3) -> Option<PathHit> {
        let mut best: Option<PathHit> = None;
        for path in &self.connections {
            for point in &path.points {
                let distance = position.distance(point);
                if best.as_ref().map_or(true, |hit| distance < hit.distance) {
                    best = Some(PathHit {
                        point: *point,
                        distance,
                        path_id: path.id.clone(),
                    });
                }
            }
        }
        best
    }

    /// Direct curve between two named locations.
    ///
    /// Returns the existing route connection between them when there is one,
    /// otherwise creates it. This does not search the graph; see
    /// [`RouteNetwork::shortest_route`] for that.
    pub fn find_route<R: Rng + ?Sized>(
        &mut self,
        start_id: &str,
        end_id: &str,
        terrain: &Heightfield,
        rng: &mut R,
    ) -> Result<usize> {
        let start = self.location_node(start_id)?;
        let end = self.location_node(end_id)?;

        if let Some(index) = self
            .connections
            .iter()
            .position(|c| c.road_class == RoadClass::Route && c.endpoints == (start, end))
        {
            return Ok(index);
        }

        let width = self.route_width;
        self.create_path(start, end, RoadClass::Route, width, ROUTE_SUBDIVISIONS, terrain, rng)
    }

    fn location_node(&self, id: &str) -> Result<NodeId> {
        self.location(id)
            .map(|location| location.node)
            .ok_or_else(|| WorldError::UnknownLocation(id.to_string()))
    }

    /// Cheapest chain of existing connections between two named locations,
    /// weighted by sampled path length. `None` if either id is unknown or
    /// the locations are not connected.
    pub fn shortest_route(&self, start_id: &str, end_id: &str) -> Option<RoutePlan> {
        let start = self.location(start_id)?.node;
        let end = self.location(end_id)?.node;

        let mut adjacency: HashMap<NodeId, Vec<(NodeId, usize, f64)>> = HashMap::new();
        for (index, connection) in self.connections.iter().enumerate() {
            let (a, b) = connection.endpoints;
            let length = connection.length();
            adjacency.entry(a).or_default().push((b, index, length));
            adjacency.entry(b).or_default().push((a, index, length));
        }

        let mut best: HashMap<NodeId, f64> = HashMap::new();
        let mut came_from: HashMap<NodeId, (NodeId, usize)> = HashMap::new();
        let mut open_set = BinaryHeap::new();

        best.insert(start, 0.0);
        open_set.push(SearchNode { node: start, cost: 0.0 });

        while let Some(SearchNode { node, cost }) = open_set.pop() {
            if node == end {
                return Some(reconstruct(start, end, cost, &came_from));
            }
            if cost > *best.get(&node).unwrap_or(&f64::INFINITY) {
                continue;
            }

            for &(neighbor, connection, length) in adjacency.get(&node).into_iter().flatten() {
                let tentative = cost + length;
                if tentative < *best.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    best.insert(neighbor, tentative);
                    came_from.insert(neighbor, (node, connection));
                    open_set.push(SearchNode { node: neighbor, cost: tentative });
                }
            }
        }

        None
    }
}

/// Quadratic Bézier from `from` to `to` with a randomly signed sideways
/// bulge, sampled at `subdivisions + 2` points draped on the terrain.
fn sample_curve<R: Rng + ?Sized>(
    from: Point3,
    to: Point3,
    subdivisions: usize,
    terrain: &Heightfield,
    rng: &mut R,
) -> Vec<Point3> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dz = to.z - from.z;
    let distance = (dx * dx + dy * dy + dz * dz).sqrt();

    // Perpendicular on the ground plane; zero for coincident endpoints
    let flat_len = (dx * dx + dz * dz).sqrt();
    let (px, pz) = if flat_len > 0.0 {
        (-dz / flat_len, dx / flat_len)
    } else {
        (0.0, 0.0)
    };

    let offset = distance * CURVE_MAGNITUDE * rng.gen_range(-1.0..1.0);
    let control = Point3::new(
        from.x + dx * 0.5 + px * offset,
        from.y + dy * 0.5,
        from.z + dz * 0.5 + pz * offset,
    );

    let count = subdivisions + 2;
    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            let a = from.lerp(&control, t);
            let b = control.lerp(&to, t);
            let p = a.lerp(&b, t);
            Point3::new(p.x, terrain.height_at(p.x, p.z) + PATH_CLEARANCE, p.z)
        })
        .collect()
}

fn reconstruct(
    start: NodeId,
    end: NodeId,
    length: f64,
    came_from: &HashMap<NodeId, (NodeId, usize)>,
) -> RoutePlan {
    let mut nodes = vec![end];
    let mut connections = Vec::new();
    let mut current = end;
    while current != start {
        let Some(&(previous, connection)) = came_from.get(&current) else {
            break;
        };
        nodes.push(previous);
        connections.push(connection);
        current = previous;
    }
    nodes.reverse();
    connections.reverse();
    RoutePlan { nodes, connections, length }
}

/// Min-heap entry for the route search
#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchNode {
    node: NodeId,
    cost: f64,
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
