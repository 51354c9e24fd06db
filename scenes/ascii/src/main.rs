//! Reads an ASCII level, builds its navmesh and prints the route between two points.
//!
//! `#` is a wall, `.` is open space. Coordinates are in tiles with `y` growing downward,
//! so the center of the top left cell is `0.5 0.5`.
//!
//! Set `RUST_LOG=platnav=trace` to see rejected jumps during generation.

use std::{fs, path::PathBuf};

use anyhow::{Context as _, Result, ensure};
use clap::Parser;
use glam::Vec2;
use platnav::{
    AgentCapabilities, EdgeType, NavMesh, NavMeshConfig, Path, Pathfinder, TileGrid as _, Tilemap,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "platnav-ascii")]
#[command(about = "Finds a route through an ASCII platformer level", version)]
struct Cli {
    /// Level file with one row of tiles per line
    level: PathBuf,
    /// Start x in tiles
    start_x: f32,
    /// Start y in tiles
    start_y: f32,
    /// Goal x in tiles
    goal_x: f32,
    /// Goal y in tiles
    goal_y: f32,
    /// Maximum horizontal speed of the agent in tiles per second
    #[arg(long, default_value_t = AgentCapabilities::default().max_speed)]
    max_speed: f32,
    /// Maximum upward launch speed of the agent in tiles per second
    #[arg(long, default_value_t = AgentCapabilities::default().max_jump_speed)]
    max_jump_speed: f32,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    fmt().with_env_filter(filter).with_target(false).init();

    ensure!(
        cli.max_speed > 0.0 && cli.max_jump_speed >= 0.0,
        "agent speeds must be non-negative, and the maximum speed must be positive"
    );

    let ascii = fs::read_to_string(&cli.level)
        .with_context(|| format!("Failed to read level {}", cli.level.display()))?;
    let tilemap = Tilemap::from_ascii(&ascii)
        .with_context(|| format!("Failed to parse level {}", cli.level.display()))?;

    let mesh = NavMesh::new(&tilemap, NavMeshConfig::default());
    tracing::info!(
        width = tilemap.width(),
        height = tilemap.height(),
        nodes = mesh.nodes().len(),
        edges = mesh.edge_count(),
        "Built navmesh"
    );
    println!("nodes: {}", mesh.nodes().len());
    for edge_type in [EdgeType::Walk, EdgeType::Fall, EdgeType::Jump] {
        println!(
            "{:?} edges: {}",
            edge_type,
            mesh.edges_of_type(edge_type).count()
        );
    }

    let agent = AgentCapabilities::new(cli.max_speed, cli.max_jump_speed);
    let start = Vec2::new(cli.start_x, cli.start_y);
    let goal = Vec2::new(cli.goal_x, cli.goal_y);
    let path = Pathfinder::new()
        .find_route(&mesh, start, goal, agent)
        .context("Failed to find a route")?;

    println!();
    print_waypoints(&path);
    println!();
    print_level(&tilemap, &path);
    Ok(())
}

fn print_waypoints(path: &Path) {
    println!(
        "route: {} waypoints, {:.3} s{}",
        path.len(),
        path.cost(),
        if path.reached_goal() {
            ""
        } else {
            ", goal unreachable"
        }
    );
    for (i, waypoint) in path.iter().enumerate() {
        let how = waypoint
            .edge_type
            .map_or_else(|| "start".to_string(), |edge_type| format!("{edge_type:?}"));
        println!(
            "{i:>3} {:<5} ({:>5.1}, {:>5.1}) velocity ({:>6.2}, {:>6.2})",
            how, waypoint.position.x, waypoint.position.y, waypoint.velocity.x, waypoint.velocity.y
        );
    }
}

/// Prints the level with the route drawn over it, `S` and `G` marking its ends.
fn print_level(tilemap: &Tilemap, path: &Path) {
    let mut rows: Vec<Vec<char>> = tilemap
        .to_string()
        .lines()
        .map(|line| line.chars().collect())
        .collect();
    let last = path.len().saturating_sub(1);
    for (i, waypoint) in path.iter().enumerate() {
        let cell = waypoint.position.floor().as_ivec2();
        let marker = match (i, waypoint.edge_type) {
            (0, _) => 'S',
            (i, _) if i == last => 'G',
            (_, Some(EdgeType::Jump)) => 'J',
            (_, Some(EdgeType::Fall)) => 'F',
            _ => 'o',
        };
        if let Some(tile) = rows
            .get_mut(cell.y as usize)
            .and_then(|row| row.get_mut(cell.x as usize))
        {
            *tile = marker;
        }
    }
    for row in rows {
        println!("{}", row.into_iter().collect::<String>());
    }
}
