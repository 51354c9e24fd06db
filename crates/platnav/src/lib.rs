#![doc = include_str!("../../../readme.md")]

mod agent;
mod config;
mod error;
mod graph;
mod grid;
mod ids;
pub mod jump;
pub(crate) mod math;
mod mesh;
mod path;
mod pathfinder;

pub use agent::AgentCapabilities;
pub use config::{ConfigError, NavMeshConfig, NavMeshConfigBuilder};
pub use error::NavMeshError;
pub use graph::NavGraph;
pub use grid::{Tile, TileGrid, Tilemap, TilemapError};
pub use ids::{EdgeId, NodeId};
pub use mesh::{Edge, EdgeDirection, EdgeType, NavMesh, Node};
pub use path::{Path, Waypoint};
pub use pathfinder::Pathfinder;
