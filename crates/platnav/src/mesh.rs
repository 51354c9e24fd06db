//! The mesh module contains [`NavMesh`], the graph of standable positions and the movements
//! connecting them.
//!
//! Generation works in two passes over a [`TileGrid`]:
//! 1. Every empty cell resting on a wall becomes a [`Node`].
//! 2. Every pair of nodes is tested for a walk, a fall and a jump, in that order.
//!    The first movement whose shape fits decides the [`Edge`] between them. If its trajectory
//!    then hits a wall, the pair stays unconnected.
//!
//! The second pass visits all node pairs and runs a jump search with trajectory sampling for
//! many of them, so generation is quadratic in the node count. This is fine for small and medium
//! grids, and there is no incremental update: editing the grid means calling [`NavMesh::generate`]
//! again.

use glam::{IVec2, Vec2};

use crate::{
    EdgeId, NavMeshConfig, NavMeshError, NodeId, Path, TileGrid,
    jump::{best_jump, trajectory_is_clear},
    math::sign,
};

/// The kind of movement an [`Edge`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeType {
    /// Walking to a horizontally adjacent node on the same row.
    Walk,
    /// Dropping off a ledge to an adjacent column. The opposite direction is a short jump.
    Fall,
    /// A powered ballistic jump in both directions.
    Jump,
}

/// Which way an [`Edge`] is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeDirection {
    /// From [`Edge::a`] to [`Edge::b`].
    AToB,
    /// From [`Edge::b`] to [`Edge::a`].
    BToA,
}

impl EdgeDirection {
    /// The opposite direction.
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            EdgeDirection::AToB => EdgeDirection::BToA,
            EdgeDirection::BToA => EdgeDirection::AToB,
        }
    }
}

/// A position an agent can stand on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// The center of the cell in world space.
    position: Vec2,
    /// The grid cell the node occupies.
    cell: IVec2,
    /// The edges that connect to this node.
    edges: Vec<EdgeId>,
}

impl Node {
    /// The center of the node's cell in world space.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// The grid cell the node occupies. The cell below it is a wall.
    #[inline]
    pub fn cell(&self) -> IVec2 {
        self.cell
    }

    /// The edges that connect to this node, in creation order.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// A movement between two [`Node`]s.
///
/// Edges are undirected in topology, but each direction has its own launch velocity.
/// A direction whose velocity is `None` cannot be traversed by any agent.
///
/// For [`EdgeType::Walk`] and for the descending direction of [`EdgeType::Fall`], the velocity is a
/// placeholder of `(±1, 0)` that only encodes the horizontal direction. The actual speed is that of
/// the agent following the edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// The first node.
    pub a: NodeId,
    /// The second node.
    pub b: NodeId,
    /// The kind of movement.
    pub edge_type: EdgeType,
    /// The velocity required to go from `a` to `b`.
    pub vel_ab: Option<Vec2>,
    /// The velocity required to go from `b` to `a`.
    pub vel_ba: Option<Vec2>,
}

impl Edge {
    /// The velocity required to traverse the edge in `direction`.
    #[inline]
    pub fn velocity(&self, direction: EdgeDirection) -> Option<Vec2> {
        match direction {
            EdgeDirection::AToB => self.vel_ab,
            EdgeDirection::BToA => self.vel_ba,
        }
    }

    /// The `(from, to)` nodes when traversing the edge in `direction`.
    #[inline]
    pub fn endpoints(&self, direction: EdgeDirection) -> (NodeId, NodeId) {
        match direction {
            EdgeDirection::AToB => (self.a, self.b),
            EdgeDirection::BToA => (self.b, self.a),
        }
    }

    /// The direction that leaves `node`, or `None` if `node` is not an endpoint of this edge.
    #[inline]
    pub fn direction_from(&self, node: NodeId) -> Option<EdgeDirection> {
        if node == self.a {
            Some(EdgeDirection::AToB)
        } else if node == self.b {
            Some(EdgeDirection::BToA)
        } else {
            None
        }
    }

    /// Whether this edge connects `a` and `b`, in either order.
    #[inline]
    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

/// The navigation graph of a tile grid.
///
/// Build with [`NavMesh::new`] and rebuild with [`NavMesh::generate`] whenever the grid changes.
/// [`NodeId`]s, [`EdgeId`]s and [`Path`]s obtained from the mesh are invalidated by every rebuild;
/// use [`NavMesh::is_current`] to detect stale paths.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NavMesh {
    config: NavMeshConfig,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    generation: u64,
}

impl NavMesh {
    /// Creates a navmesh and generates it from `grid`.
    pub fn new(grid: &(impl TileGrid + ?Sized), config: NavMeshConfig) -> Self {
        let mut mesh = Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            generation: 0,
        };
        mesh.generate(grid);
        mesh
    }

    /// Discards all nodes and edges and rebuilds them from the current state of `grid`.
    ///
    /// Invalidates every [`NodeId`], [`EdgeId`] and [`Path`] previously obtained from this mesh.
    pub fn generate(&mut self, grid: &(impl TileGrid + ?Sized)) {
        self.nodes.clear();
        self.edges.clear();
        self.generation += 1;

        self.place_nodes(grid);
        self.connect_nodes(grid);

        self.nodes.shrink_to_fit();
        self.edges.shrink_to_fit();

        tracing::debug!(
            generation = self.generation,
            nodes = self.nodes.len(),
            walk = self.edges_of_type(EdgeType::Walk).count(),
            fall = self.edges_of_type(EdgeType::Fall).count(),
            jump = self.edges_of_type(EdgeType::Jump).count(),
            "Generated navmesh"
        );
    }

    fn place_nodes(&mut self, grid: &(impl TileGrid + ?Sized)) {
        let (width, height) = (grid.width(), grid.height());
        self.nodes
            .reserve(width as usize * height.saturating_sub(1) as usize);

        for x in 0..width {
            for y in 0..height.saturating_sub(1) {
                let (cx, cy) = (x as i32, y as i32);
                if grid.is_wall(cx, cy) || !grid.is_wall(cx, cy + 1) {
                    continue;
                }
                self.nodes.push(Node {
                    position: grid.cell_to_world(x, y),
                    cell: IVec2::new(cx, cy),
                    edges: Vec::new(),
                });
            }
        }
    }

    fn connect_nodes(&mut self, grid: &(impl TileGrid + ?Sized)) {
        self.edges.reserve(self.nodes.len() * 4);

        // All three predicates are symmetric, so every unordered pair only needs one test.
        for a in 0..self.nodes.len() {
            for b in a + 1..self.nodes.len() {
                let (a, b) = (NodeId::from(a), NodeId::from(b));
                if self.has_connection(a, b) {
                    continue;
                }
                let edge = if self.can_walk(a, b) {
                    Some(self.walk_edge(a, b))
                } else if self.can_fall(grid, a, b) {
                    self.fall_edge(grid, a, b)
                } else if self.can_jump(grid, a, b) {
                    self.jump_edge(grid, a, b)
                } else {
                    None
                };
                if let Some(edge) = edge {
                    self.push_edge(edge);
                }
            }
        }
    }

    fn push_edge(&mut self, edge: Edge) {
        let id = EdgeId::from(self.edges.len());
        self.nodes[edge.a.index()].edges.push(id);
        self.nodes[edge.b.index()].edges.push(id);
        self.edges.push(edge);
    }

    fn has_connection(&self, a: NodeId, b: NodeId) -> bool {
        let joined = |node: NodeId| {
            self.nodes[node.index()]
                .edges
                .iter()
                .any(|edge| self.edges[edge.index()].joins(a, b))
        };
        joined(a) || joined(b)
    }

    fn can_walk(&self, a: NodeId, b: NodeId) -> bool {
        let (ca, cb) = (self.nodes[a.index()].cell, self.nodes[b.index()].cell);
        ca.y == cb.y && (ca.x - cb.x).abs() == 1
    }

    fn can_fall(&self, grid: &(impl TileGrid + ?Sized), a: NodeId, b: NodeId) -> bool {
        let (ca, cb) = (self.nodes[a.index()].cell, self.nodes[b.index()].cell);
        if (ca.x - cb.x).abs() != 1 || ca.y == cb.y {
            return false;
        }
        let (upper, lower) = if ca.y < cb.y { (ca, cb) } else { (cb, ca) };
        (upper.y + 1..lower.y).all(|y| !grid.is_wall(lower.x, y))
    }

    fn can_jump(&self, grid: &(impl TileGrid + ?Sized), a: NodeId, b: NodeId) -> bool {
        let (na, nb) = (&self.nodes[a.index()], &self.nodes[b.index()]);
        na.cell.x != nb.cell.x
            && na.position.distance(nb.position) <= self.config.max_jump_distance
            && is_platform_edge(grid, na.cell)
            && is_platform_edge(grid, nb.cell)
    }

    fn walk_edge(&self, a: NodeId, b: NodeId) -> Edge {
        let direction = self.horizontal_direction(a, b);
        Edge {
            a,
            b,
            edge_type: EdgeType::Walk,
            vel_ab: Some(direction),
            vel_ba: Some(-direction),
        }
    }

    fn fall_edge(&self, grid: &(impl TileGrid + ?Sized), a: NodeId, b: NodeId) -> Option<Edge> {
        let direction = self.horizontal_direction(a, b);
        let (pa, pb) = (self.nodes[a.index()].position, self.nodes[b.index()].position);
        let (upper, lower) = if pa.y < pb.y { (pa, pb) } else { (pb, pa) };
        // Dropping down is free, climbing back up over the ledge takes a jump. A climb that is
        // merely too steep leaves the ascent infeasible, a climb that hits a wall drops the edge.
        let ascent = best_jump(lower, upper, &self.config);
        let climb_collides = ascent.is_some_and(|velocity| {
            !trajectory_is_clear(grid, lower, upper, velocity, &self.config)
        });
        if climb_collides {
            tracing::trace!(%a, %b, "Rejected fall: the climb back up collides");
            return None;
        }
        let (vel_ab, vel_ba) = if pa.y < pb.y {
            (Some(direction), ascent)
        } else {
            (ascent, Some(-direction))
        };
        Some(Edge {
            a,
            b,
            edge_type: EdgeType::Fall,
            vel_ab,
            vel_ba,
        })
    }

    fn jump_edge(&self, grid: &(impl TileGrid + ?Sized), a: NodeId, b: NodeId) -> Option<Edge> {
        let (pa, pb) = (self.nodes[a.index()].position, self.nodes[b.index()].position);
        let (Some(vel_ab), Some(vel_ba)) =
            (self.clear_jump(grid, pa, pb), self.clear_jump(grid, pb, pa))
        else {
            tracing::trace!(%a, %b, "Rejected jump: no collision-free trajectory");
            return None;
        };
        Some(Edge {
            a,
            b,
            edge_type: EdgeType::Jump,
            vel_ab: Some(vel_ab),
            vel_ba: Some(vel_ba),
        })
    }

    /// The slowest jump from `from` to `to` that does not pass through a wall.
    fn clear_jump(&self, grid: &(impl TileGrid + ?Sized), from: Vec2, to: Vec2) -> Option<Vec2> {
        best_jump(from, to, &self.config)
            .filter(|&velocity| trajectory_is_clear(grid, from, to, velocity, &self.config))
    }

    fn horizontal_direction(&self, from: NodeId, to: NodeId) -> Vec2 {
        let dx = self.nodes[to.index()].position.x - self.nodes[from.index()].position.x;
        Vec2::new(sign(dx), 0.0)
    }

    /// Returns the node closest to `point`, or `None` if the mesh is empty.
    ///
    /// Ties go to the node with the lowest index.
    pub fn closest(&self, point: Vec2) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            let distance = node.position.distance_squared(point);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((NodeId::from(i), distance)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Returns the node closest to `point`.
    ///
    /// # Errors
    ///
    /// Returns [`NavMeshError::EmptyMesh`] if the mesh has no nodes. Check [`NavMesh::valid`] first
    /// if that is an expected state.
    pub fn get_closest(&self, point: Vec2) -> Result<&Node, NavMeshError> {
        self.closest(point)
            .map(|id| &self.nodes[id.index()])
            .ok_or(NavMeshError::EmptyMesh)
    }

    /// Whether the mesh has at least one node.
    #[inline]
    pub fn valid(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// The node with the given id, or `None` if it is out of range.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The edge with the given id, or `None` if it is out of range.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// All nodes, indexed by [`NodeId`].
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, indexed by [`EdgeId`].
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The edges of the given type, e.g. for color-coded debug rendering.
    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.edge_type == edge_type)
    }

    /// The edge connecting `a` and `b`, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        let node = self.node(a)?;
        node.edges
            .iter()
            .map(|id| &self.edges[id.index()])
            .find(|edge| edge.joins(a, b))
    }

    /// The config the mesh is generated with.
    #[inline]
    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    /// Counts how often the mesh has been generated. Starts at 1 after [`NavMesh::new`].
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `path` was computed against the current generation of this mesh.
    #[inline]
    pub fn is_current(&self, path: &Path) -> bool {
        path.generation() == self.generation
    }

    /// Like [`NavMesh::is_current`], but as an error for use with `?`.
    ///
    /// # Errors
    ///
    /// Returns [`NavMeshError::StalePath`] if the mesh was regenerated after `path` was computed.
    pub fn check_current(&self, path: &Path) -> Result<(), NavMeshError> {
        if self.is_current(path) {
            Ok(())
        } else {
            Err(NavMeshError::StalePath {
                path: path.generation(),
                mesh: self.generation,
            })
        }
    }
}

/// Whether an agent standing in `cell` can leave it sideways through the air, i.e. at least one
/// of the two cells diagonally below it is open.
fn is_platform_edge(grid: &(impl TileGrid + ?Sized), cell: IVec2) -> bool {
    !grid.is_wall(cell.x - 1, cell.y + 1) || !grid.is_wall(cell.x + 1, cell.y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tile, Tilemap};

    fn mesh(ascii: &str) -> NavMesh {
        NavMesh::new(&Tilemap::from_ascii(ascii).unwrap(), NavMeshConfig::default())
    }

    #[test]
    fn nodes_are_placed_on_top_of_walls() {
        let mesh = mesh(
            "
....
.#..
####
",
        );
        let cells: Vec<IVec2> = mesh.nodes().iter().map(Node::cell).collect();
        // Column-major order. (1, 1) is a wall, so (1, 0) stands on it instead.
        assert_eq!(
            cells,
            vec![
                IVec2::new(0, 1),
                IVec2::new(1, 0),
                IVec2::new(2, 1),
                IVec2::new(3, 1),
            ]
        );
        assert_eq!(mesh.nodes()[0].position(), Vec2::new(0.5, 1.5));
    }

    #[test]
    fn empty_grid_gives_invalid_mesh() {
        let mesh = mesh(
            "
...
...
",
        );
        assert!(!mesh.valid());
        assert_eq!(mesh.closest(Vec2::ZERO), None);
        assert_eq!(
            mesh.get_closest(Vec2::ZERO).unwrap_err(),
            NavMeshError::EmptyMesh
        );
    }

    #[test]
    fn solid_grid_gives_invalid_mesh() {
        let mesh = mesh(
            "
###
###
",
        );
        assert!(!mesh.valid());
    }

    #[test]
    fn walk_edge_velocities_point_at_the_other_node() {
        let mesh = mesh(
            "
..
##
",
        );
        let edge = &mesh.edges()[0];
        assert_eq!(edge.edge_type, EdgeType::Walk);
        assert_eq!(edge.vel_ab, Some(Vec2::X));
        assert_eq!(edge.vel_ba, Some(-Vec2::X));
        assert_eq!(mesh.node(edge.a).unwrap().edges(), &[EdgeId(0)]);
        assert_eq!(mesh.node(edge.b).unwrap().edges(), &[EdgeId(0)]);
    }

    fn node_at(mesh: &NavMesh, x: i32, y: i32) -> NodeId {
        let index = mesh
            .nodes()
            .iter()
            .position(|node| node.cell() == IVec2::new(x, y))
            .unwrap();
        NodeId::from(index)
    }

    #[test]
    fn ledge_drops_to_adjacent_column() {
        let mesh = mesh(
            "
...
...
.##
###
",
        );
        let edge = mesh
            .edge_between(node_at(&mesh, 1, 1), node_at(&mesh, 0, 2))
            .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Fall);
        assert!(edge.vel_ab.is_some() && edge.vel_ba.is_some());
        assert_eq!(
            mesh.edge_between(node_at(&mesh, 1, 1), node_at(&mesh, 2, 1))
                .unwrap()
                .edge_type,
            EdgeType::Walk
        );
    }

    #[test]
    fn fall_requires_clear_column() {
        // (2, 1) can drop into column 1, but (3, 2) blocks the drop into column 3.
        let mesh = mesh(
            "
....
....
#.##
#...
####
",
        );
        let upper = node_at(&mesh, 2, 1);
        let edge = mesh.edge_between(upper, node_at(&mesh, 1, 3)).unwrap();
        assert_eq!(edge.edge_type, EdgeType::Fall);
        assert!(mesh.edge_between(upper, node_at(&mesh, 3, 3)).is_none());
    }

    #[test]
    fn fall_past_a_wall_is_discarded() {
        // (1, 0) would have to step sideways through the wall at (2, 0) to drop into column 2.
        let mesh = mesh(
            "
..#
.#.
...
...
###
",
        );
        assert!(
            mesh.edge_between(node_at(&mesh, 1, 0), node_at(&mesh, 2, 3))
                .is_none()
        );
    }

    #[test]
    fn fall_too_high_to_climb_keeps_its_descent() {
        let mut tilemap = Tilemap::new(2, 25);
        for y in 2..25 {
            tilemap.set(0, y, Tile::Wall).unwrap();
        }
        tilemap.set(1, 24, Tile::Wall).unwrap();
        let mesh = NavMesh::new(&tilemap, NavMeshConfig::default());

        let edge = mesh
            .edge_between(node_at(&mesh, 0, 1), node_at(&mesh, 1, 23))
            .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Fall);
        assert_eq!(edge.vel_ab, Some(Vec2::X));
        assert_eq!(edge.vel_ba, None);
    }

    #[test]
    fn closest_prefers_lowest_index_on_ties() {
        let mesh = mesh(
            "
...
#.#
",
        );
        // Nodes at (0.5, 0.5) and (2.5, 0.5); the query point is equidistant.
        let tie = mesh.closest(Vec2::new(1.5, 0.5)).unwrap();
        assert_eq!(tie, NodeId(0));
        assert_eq!(mesh.closest(Vec2::new(2.4, 0.5)), Some(NodeId(1)));
    }

    #[test]
    fn regeneration_bumps_generation() {
        let tilemap = Tilemap::from_ascii("..\n##\n").unwrap();
        let mut mesh = NavMesh::new(&tilemap, NavMeshConfig::default());
        assert_eq!(mesh.generation(), 1);
        mesh.generate(&tilemap);
        assert_eq!(mesh.generation(), 2);
    }

    #[test]
    fn direction_helpers_agree() {
        let edge = Edge {
            a: NodeId(2),
            b: NodeId(5),
            edge_type: EdgeType::Jump,
            vel_ab: Some(Vec2::new(1.0, -3.0)),
            vel_ba: None,
        };
        assert_eq!(edge.direction_from(NodeId(5)), Some(EdgeDirection::BToA));
        assert_eq!(edge.direction_from(NodeId(1)), None);
        assert_eq!(
            edge.endpoints(EdgeDirection::BToA),
            (NodeId(5), NodeId(2))
        );
        assert_eq!(edge.velocity(EdgeDirection::AToB.reversed()), None);
        assert!(edge.joins(NodeId(5), NodeId(2)));
    }
}
