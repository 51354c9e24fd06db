use glam::Vec2;

use crate::{Edge, EdgeId, NavMesh, NodeId};

/// Read-only access to a navigation graph, as needed by the [`Pathfinder`](crate::Pathfinder).
///
/// Node and edge ids passed to these methods must come from the same graph.
pub trait NavGraph {
    /// The number of nodes. Valid [`NodeId`]s are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// The world-space position of `node`.
    fn node_position(&self, node: NodeId) -> Vec2;

    /// The edges that connect to `node`.
    fn incident_edges(&self, node: NodeId) -> &[EdgeId];

    /// The edge with the given id.
    fn edge(&self, edge: EdgeId) -> &Edge;

    /// The downward acceleration the graph was generated with.
    fn gravity(&self) -> f32;

    /// The generation of the graph. Changes whenever ids are invalidated.
    fn generation(&self) -> u64;

    /// The node closest to `point`, ties going to the lowest index. `None` if there are no nodes.
    fn closest(&self, point: Vec2) -> Option<NodeId>;
}

impl NavGraph for NavMesh {
    #[inline]
    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    #[inline]
    fn node_position(&self, node: NodeId) -> Vec2 {
        self.nodes()[node.index()].position()
    }

    #[inline]
    fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        self.nodes()[node.index()].edges()
    }

    #[inline]
    fn edge(&self, edge: EdgeId) -> &Edge {
        &self.edges()[edge.index()]
    }

    #[inline]
    fn gravity(&self) -> f32 {
        self.config().gravity
    }

    #[inline]
    fn generation(&self) -> u64 {
        NavMesh::generation(self)
    }

    #[inline]
    fn closest(&self, point: Vec2) -> Option<NodeId> {
        NavMesh::closest(self, point)
    }
}
