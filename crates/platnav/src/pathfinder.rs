//! Time-optimal route search over a [`NavGraph`].
//!
//! The search is A* where the cost of an edge is the time an agent needs to traverse it, and the
//! heuristic is the straight-line distance to the requested goal point. Edges the requesting agent
//! is too slow or too weak to execute are skipped, so one mesh serves agents of any strength.
//!
//! When the goal cannot be reached, the search does not fail. It returns the route to the explored
//! node that came closest to the goal instead, and marks the path with
//! [`Path::reached_goal`] `== false`.

use std::collections::VecDeque;

use glam::Vec2;

use crate::{
    AgentCapabilities, Edge, EdgeDirection, EdgeId, EdgeType, NavGraph, NavMeshError, NodeId,
    Path, Waypoint,
};

/// A search node. Only lives for the duration of one [`Pathfinder::find_route`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PathNode {
    /// The navmesh node.
    node: NodeId,
    /// Index of the parent in the closed list.
    parent: Option<usize>,
    /// The edge by which the parent reaches this node.
    edge: Option<EdgeId>,
    /// Time to get to this node from the start.
    cost: f32,
    /// Straight-line distance from the goal point.
    distance: f32,
}

impl PathNode {
    #[inline]
    fn priority(&self) -> f32 {
        self.cost + self.distance
    }
}

/// One traversal of an edge, in a specific direction.
#[derive(Debug, Clone, Copy)]
struct Step<'a> {
    edge: &'a Edge,
    direction: EdgeDirection,
    from: Vec2,
    to: Vec2,
}

impl<'a> Step<'a> {
    fn new(graph: &'a (impl NavGraph + ?Sized), edge: &'a Edge, direction: EdgeDirection) -> Self {
        let (from, to) = edge.endpoints(direction);
        Self {
            edge,
            direction,
            from: graph.node_position(from),
            to: graph.node_position(to),
        }
    }

    /// Whether the step needs a launch velocity, as opposed to just walking off in a direction.
    /// Climbing up the ledge of a fall edge is a jump.
    fn is_powered(&self) -> bool {
        match self.edge.edge_type {
            EdgeType::Walk => false,
            EdgeType::Fall => self.to.y < self.from.y,
            EdgeType::Jump => true,
        }
    }

    /// Whether `agent` can execute this step.
    fn can_connect(&self, agent: &AgentCapabilities) -> bool {
        let Some(velocity) = self.edge.velocity(self.direction) else {
            return false;
        };
        if self.is_powered() {
            agent.can_launch(velocity)
        } else {
            agent.can_move()
        }
    }

    /// The time in seconds `agent` needs for this step. Only meaningful if [`Step::can_connect`] holds.
    fn cost(&self, gravity: f32, agent: &AgentCapabilities) -> f32 {
        let dx = (self.to.x - self.from.x).abs();
        if self.is_powered() {
            let vx = self
                .edge
                .velocity(self.direction)
                .map_or(0.0, |velocity| velocity.x.abs());
            return dx / vx;
        }
        match self.edge.edge_type {
            EdgeType::Fall => (2.0 * (self.to.y - self.from.y).abs() / gravity).sqrt(),
            _ => dx / agent.max_speed,
        }
    }

    /// The velocity an agent should move with to take this step.
    fn approach_velocity(&self, agent: &AgentCapabilities) -> Vec2 {
        let velocity = self.edge.velocity(self.direction).unwrap_or(Vec2::ZERO);
        if self.is_powered() {
            velocity
        } else {
            Vec2::new(velocity.x * agent.max_speed, 0.0)
        }
    }
}

/// Searches routes over a [`NavGraph`].
///
/// Holds no state between searches except reusable buffers and the last computed path, which can
/// be inspected with [`Pathfinder::last_path`].
#[derive(Debug, Default, Clone)]
pub struct Pathfinder {
    open: Vec<PathNode>,
    closed: Vec<PathNode>,
    visited: Vec<bool>,
    last_path: Option<Path>,
}

impl Pathfinder {
    /// Creates a pathfinder with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The path computed by the last successful call to [`Pathfinder::find_route`].
    #[inline]
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_ref()
    }

    /// Finds the fastest route from the node closest to `start` to the node closest to `goal`
    /// that `agent` can execute.
    ///
    /// If the goal node is unreachable, returns the route to the explored node closest to `goal`,
    /// with [`Path::reached_goal`] set to `false`. The path is never empty on success; if start and
    /// goal resolve to the same node, it holds a single waypoint and costs nothing.
    ///
    /// # Errors
    ///
    /// Returns [`NavMeshError::EmptyMesh`] if `graph` has no nodes.
    pub fn find_route(
        &mut self,
        graph: &(impl NavGraph + ?Sized),
        start: Vec2,
        goal: Vec2,
        agent: AgentCapabilities,
    ) -> Result<Path, NavMeshError> {
        let (Some(start_node), Some(goal_node)) = (graph.closest(start), graph.closest(goal))
        else {
            return Err(NavMeshError::EmptyMesh);
        };

        self.open.clear();
        self.closed.clear();
        self.visited.clear();
        self.visited.resize(graph.node_count(), false);

        self.open.push(PathNode {
            node: start_node,
            parent: None,
            edge: None,
            cost: 0.0,
            distance: graph.node_position(start_node).distance(goal),
        });

        let mut goal_index = None;
        while let Some(lowest) = lowest_cost(&self.open) {
            let current = self.open.remove(lowest);
            let current_index = self.closed.len();
            self.closed.push(current);
            self.visited[current.node.index()] = true;

            if current.node == goal_node {
                goal_index = Some(current_index);
                break;
            }

            for &edge_id in graph.incident_edges(current.node) {
                let edge = graph.edge(edge_id);
                let Some(direction) = edge.direction_from(current.node) else {
                    continue;
                };
                let (_, next) = edge.endpoints(direction);
                if self.visited[next.index()] {
                    continue;
                }
                let step = Step::new(graph, edge, direction);
                if !step.can_connect(&agent) {
                    continue;
                }

                let cost = current.cost + step.cost(graph.gravity(), &agent);
                if let Some(open) = self.open.iter_mut().find(|open| open.node == next) {
                    if cost < open.cost {
                        open.cost = cost;
                        open.parent = Some(current_index);
                        open.edge = Some(edge_id);
                    }
                    continue;
                }
                self.open.push(PathNode {
                    node: next,
                    parent: Some(current_index),
                    edge: Some(edge_id),
                    cost,
                    distance: step.to.distance(goal),
                });
            }
        }

        let reached_goal = goal_index.is_some();
        let terminal = goal_index.unwrap_or_else(|| nearest_explored(&self.closed));
        if !reached_goal {
            tracing::warn!(
                %start_node,
                %goal_node,
                fallback = %self.closed[terminal].node,
                "Goal is unreachable, returning route to the closest explored node"
            );
        }

        let path = self.build_path(graph, terminal, reached_goal, &agent);
        tracing::debug!(
            waypoints = path.len(),
            cost = path.cost(),
            explored = self.closed.len(),
            reached_goal,
            "Found route"
        );
        self.last_path = Some(path.clone());
        Ok(path)
    }

    /// Follows the parent links from `terminal` back to the start.
    fn build_path(
        &self,
        graph: &(impl NavGraph + ?Sized),
        terminal: usize,
        reached_goal: bool,
        agent: &AgentCapabilities,
    ) -> Path {
        let mut waypoints = VecDeque::new();
        let mut cursor = Some(terminal);
        while let Some(index) = cursor {
            let path_node = &self.closed[index];
            let parent = path_node.parent.map(|parent| self.closed[parent].node);
            let (velocity, edge_type) = match (path_node.edge, parent) {
                (Some(edge_id), Some(parent)) => {
                    let edge = graph.edge(edge_id);
                    let direction = edge.direction_from(parent).unwrap_or(EdgeDirection::AToB);
                    let step = Step::new(graph, edge, direction);
                    (step.approach_velocity(agent), Some(edge.edge_type))
                }
                _ => (Vec2::ZERO, None),
            };
            waypoints.push_front(Waypoint {
                position: graph.node_position(path_node.node),
                velocity,
                node: path_node.node,
                edge_type,
            });
            cursor = path_node.parent;
        }
        Path::new(
            waypoints,
            self.closed[terminal].cost,
            reached_goal,
            graph.generation(),
        )
    }
}

/// Index of the open node with the lowest `cost + distance`, the first one on ties.
fn lowest_cost(list: &[PathNode]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, node) in list.iter().enumerate() {
        let priority = node.priority();
        match best {
            Some((_, best_priority)) if priority >= best_priority => {}
            _ => best = Some((i, priority)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the closed node closest to the goal point, the first one on ties.
///
/// The closed list always holds at least the start node when this is called.
fn nearest_explored(closed: &[PathNode]) -> usize {
    let mut best = 0;
    for (i, node) in closed.iter().enumerate().skip(1) {
        if node.distance < closed[best].distance {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_node(node: u32, cost: f32, distance: f32) -> PathNode {
        PathNode {
            node: NodeId(node),
            parent: None,
            edge: None,
            cost,
            distance,
        }
    }

    #[test]
    fn lowest_cost_takes_first_on_ties() {
        let list = [
            path_node(0, 2.0, 1.0),
            path_node(1, 1.0, 1.0),
            path_node(2, 0.5, 1.5),
        ];
        assert_eq!(lowest_cost(&list), Some(1));
        assert_eq!(lowest_cost(&[]), None);
    }

    #[test]
    fn nearest_explored_minimizes_distance() {
        let closed = [
            path_node(0, 0.0, 4.0),
            path_node(1, 3.0, 1.0),
            path_node(2, 9.0, 1.0),
            path_node(3, 1.0, 2.0),
        ];
        assert_eq!(nearest_explored(&closed), 1);
    }
}
