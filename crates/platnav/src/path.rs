use std::collections::{VecDeque, vec_deque};

use glam::Vec2;

use crate::{EdgeType, NodeId};

/// A single step of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// Where the agent should be when this waypoint is reached.
    pub position: Vec2,
    /// The velocity the agent should move with to reach this waypoint from the previous one.
    ///
    /// Zero for the first waypoint of a path. For jumps, this is the launch velocity at the
    /// previous waypoint.
    pub velocity: Vec2,
    /// The navmesh node at this waypoint.
    pub node: NodeId,
    /// How this waypoint is reached from the previous one. `None` for the first waypoint.
    pub edge_type: Option<EdgeType>,
}

/// An ordered route over a [`NavMesh`](crate::NavMesh), consumed front to back by an agent controller.
///
/// Paths reference node ids of the mesh generation they were computed on. Discard them when the mesh
/// is regenerated; [`NavMesh::is_current`](crate::NavMesh::is_current) tells whether that happened.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    waypoints: VecDeque<Waypoint>,
    cost: f32,
    reached_goal: bool,
    generation: u64,
}

impl Path {
    pub(crate) fn new(
        waypoints: VecDeque<Waypoint>,
        cost: f32,
        reached_goal: bool,
        generation: u64,
    ) -> Self {
        Self {
            waypoints,
            cost,
            reached_goal,
            generation,
        }
    }

    /// The next waypoint, if any.
    #[inline]
    pub fn front(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    /// Removes and returns the next waypoint. Call this when the agent reaches it.
    #[inline]
    pub fn pop_front(&mut self) -> Option<Waypoint> {
        self.waypoints.pop_front()
    }

    /// The final waypoint, if any.
    #[inline]
    pub fn back(&self) -> Option<&Waypoint> {
        self.waypoints.back()
    }

    /// The number of remaining waypoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether no waypoints remain.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Iterates over the remaining waypoints in order.
    #[inline]
    pub fn iter(&self) -> vec_deque::Iter<'_, Waypoint> {
        self.waypoints.iter()
    }

    /// The estimated travel time of the whole route in seconds, as computed by the search.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// `false` if the goal was unreachable and the path leads to the explored node closest to it instead.
    #[inline]
    pub fn reached_goal(&self) -> bool {
        self.reached_goal
    }

    /// The generation of the mesh this path was computed on.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Waypoint;
    type IntoIter = vec_deque::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Path {
    type Item = Waypoint;
    type IntoIter = vec_deque::IntoIter<Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.into_iter()
    }
}
