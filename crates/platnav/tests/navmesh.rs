//! Generation properties of the navmesh on small hand-made levels.

use glam::{IVec2, Vec2};
use platnav::{EdgeType, NavMesh, NavMeshConfig, NavMeshConfigBuilder, NodeId, Tile, Tilemap};

fn tilemap(ascii: &str) -> Tilemap {
    Tilemap::from_ascii(ascii).unwrap()
}

fn node_at(mesh: &NavMesh, x: i32, y: i32) -> NodeId {
    let index = mesh
        .nodes()
        .iter()
        .position(|node| node.cell() == IVec2::new(x, y))
        .unwrap_or_else(|| panic!("no node at ({x}, {y})"));
    NodeId::from(index)
}

const FLAT: &str = "
..........
##########
";

const GAP: &str = "
..........
..........
..........
####.#####
";

const COVERED_GAP: &str = "
..........
##########
..........
####.#####
";

#[test]
fn flat_platform_is_a_chain_of_walks() {
    let mesh = NavMesh::new(&tilemap(FLAT), NavMeshConfig::default());
    assert_eq!(mesh.nodes().len(), 10);
    assert_eq!(mesh.edge_count(), 9);
    assert!(
        mesh.edges()
            .iter()
            .all(|edge| edge.edge_type == EdgeType::Walk)
    );
    for x in 0..9 {
        let edge = mesh
            .edge_between(node_at(&mesh, x, 0), node_at(&mesh, x + 1, 0))
            .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Walk);
    }
}

#[test]
fn gap_is_crossed_by_a_jump() {
    let mesh = NavMesh::new(&tilemap(GAP), NavMeshConfig::default());
    let (left, right) = (node_at(&mesh, 3, 2), node_at(&mesh, 5, 2));
    let edge = mesh.edge_between(left, right).unwrap();
    assert_eq!(edge.edge_type, EdgeType::Jump);

    // Both directions are launches: upward and toward the other side.
    let (vel_ab, vel_ba) = (edge.vel_ab.unwrap(), edge.vel_ba.unwrap());
    assert!(vel_ab.y < 0.0 && vel_ba.y < 0.0);
    let toward_b = mesh.node(edge.b).unwrap().position().x - mesh.node(edge.a).unwrap().position().x;
    assert_eq!(vel_ab.x.signum(), toward_b.signum());
    assert_eq!(vel_ba.x.signum(), -toward_b.signum());

    assert_eq!(mesh.edges_of_type(EdgeType::Jump).count(), 1);
}

#[test]
fn ceiling_blocks_the_jump() {
    let mesh = NavMesh::new(&tilemap(COVERED_GAP), NavMeshConfig::default());
    let (left, right) = (node_at(&mesh, 3, 2), node_at(&mesh, 5, 2));
    assert!(mesh.edge_between(left, right).is_none());
}

#[test]
fn short_max_jump_distance_removes_the_jump() {
    let config = NavMeshConfigBuilder {
        max_jump_distance: 1.5,
        ..Default::default()
    }
    .build()
    .unwrap();
    let mesh = NavMesh::new(&tilemap(GAP), config);
    assert_eq!(mesh.edges_of_type(EdgeType::Jump).count(), 0);
}

#[test]
fn unvalidated_zero_steps_still_generate() {
    let config = NavMeshConfig {
        time_scale_step: 0.0,
        trajectory_step: 0.0,
        ..NavMeshConfig::default()
    };
    let mesh = NavMesh::new(&tilemap(GAP), config);
    assert_eq!(mesh.nodes().len(), 9);
    assert_eq!(mesh.edges_of_type(EdgeType::Walk).count(), 7);
    assert_eq!(mesh.edges_of_type(EdgeType::Jump).count(), 0);
}

#[test]
fn ledge_is_a_fall_that_can_be_climbed() {
    let mesh = NavMesh::new(
        &tilemap(
            "
.......
.......
###....
###....
#######
",
        ),
        NavMeshConfig::default(),
    );
    let (upper, lower) = (node_at(&mesh, 2, 1), node_at(&mesh, 3, 3));
    let edge = mesh.edge_between(upper, lower).unwrap();
    assert_eq!(edge.edge_type, EdgeType::Fall);

    let (down, up) = if edge.a == upper {
        (edge.vel_ab, edge.vel_ba)
    } else {
        (edge.vel_ba, edge.vel_ab)
    };
    assert_eq!(down, Some(Vec2::X));
    let up = up.unwrap();
    assert!(up.x < 0.0, "climbing goes back to the left");
    assert!(up.y < 0.0, "climbing starts upward");
}

#[test]
fn walk_takes_priority_over_fall_and_jump() {
    let mesh = NavMesh::new(&tilemap(GAP), NavMeshConfig::default());
    let edge = mesh
        .edge_between(node_at(&mesh, 2, 2), node_at(&mesh, 3, 2))
        .unwrap();
    assert_eq!(edge.edge_type, EdgeType::Walk);
}

#[test]
fn at_most_one_edge_per_node_pair() {
    let mesh = NavMesh::new(&tilemap(GAP), NavMeshConfig::default());
    for (i, edge) in mesh.edges().iter().enumerate() {
        for other in &mesh.edges()[i + 1..] {
            assert!(!other.joins(edge.a, edge.b));
        }
    }
}

#[test]
fn generation_is_deterministic() {
    let tilemap = tilemap(GAP);
    let mut mesh = NavMesh::new(&tilemap, NavMeshConfig::default());
    let (nodes, edges) = (mesh.nodes().to_vec(), mesh.edges().to_vec());
    mesh.generate(&tilemap);
    assert_eq!(mesh.nodes(), nodes.as_slice());
    assert_eq!(mesh.edges(), edges.as_slice());
    assert_eq!(mesh.generation(), 2);
}

#[test]
fn editing_the_grid_changes_the_mesh() {
    let mut tilemap = tilemap(GAP);
    let mut mesh = NavMesh::new(&tilemap, NavMeshConfig::default());
    assert_eq!(mesh.nodes().len(), 9);

    assert_eq!(tilemap.toggle_tile(4, 3), Ok(Tile::Wall));
    mesh.generate(&tilemap);
    assert_eq!(mesh.nodes().len(), 10);
    assert_eq!(mesh.edges_of_type(EdgeType::Jump).count(), 0);
    assert_eq!(mesh.edges_of_type(EdgeType::Walk).count(), 9);
}

#[test]
fn closest_ties_resolve_to_lowest_index() {
    let mesh = NavMesh::new(&tilemap(FLAT), NavMeshConfig::default());
    // Exactly between the nodes at x = 0.5 and x = 1.5.
    assert_eq!(mesh.closest(Vec2::new(1.0, 0.5)), Some(NodeId(0)));
    assert_eq!(mesh.closest(Vec2::new(1.0001, 0.5)), Some(NodeId(1)));
    let node = mesh.get_closest(Vec2::new(100.0, 0.0)).unwrap();
    assert_eq!(node.cell(), IVec2::new(9, 0));
}
