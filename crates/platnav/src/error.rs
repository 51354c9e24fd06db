use thiserror::Error;

/// Errors that can occur when querying a [`NavMesh`](crate::NavMesh) or searching a route over it.
///
/// An unreachable goal is not an error: [`Pathfinder::find_route`](crate::Pathfinder::find_route)
/// then returns the best partial route it found.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMeshError {
    /// Happens when the mesh has no nodes, e.g. because the grid has no standable surface.
    #[error("Navmesh is empty, the grid has no standable surface")]
    EmptyMesh,
    /// Happens when a [`Path`](crate::Path) is used after the mesh it was computed on was regenerated.
    #[error("Path was computed on navmesh generation {path}, but the navmesh is at generation {mesh}")]
    StalePath {
        /// The generation the path was computed on
        path: u64,
        /// The current generation of the navmesh
        mesh: u64,
    },
}
