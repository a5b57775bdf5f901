//! End-to-end runs of the capsule mesh pipeline.

use std::collections::HashMap;
use std::fs;

use approx::assert_relative_eq;
use capsule_mesh::prelude::*;
use capsule_mesh::topology::EdgeShape;
use capsule_mesh::{Side, VertexKey};

fn config_in(dir: &tempfile::TempDir) -> CapsuleMeshConfig {
    CapsuleMeshConfig::new().with_output_path(dir.path().join("system").join("blockMeshDict"))
}

#[test]
fn reference_topology_counts() {
    let topology = CapsuleMeshPipeline::default().build().unwrap();

    assert_eq!(topology.points().len(), 44);
    assert_eq!(topology.blocks().len(), 10);

    let arcs = topology.edges().iter().filter(|e| e.is_arc()).count();
    assert_eq!(arcs, 16);
    let splines: Vec<usize> = topology
        .edges()
        .iter()
        .filter_map(|e| match &e.shape {
            EdgeShape::Spline { points } => Some(points.len()),
            EdgeShape::Arc { .. } => None,
        })
        .collect();
    assert_eq!(splines, vec![10; 8]);

    assert_eq!(topology.patches().len(), 3);
    let mut references: HashMap<usize, usize> = HashMap::new();
    for patch in topology.patches() {
        for face in &patch.faces {
            *references.entry(face.block).or_default() += 1;
        }
    }
    assert_eq!(references.len(), 10);
    assert!(references.values().all(|&n| n == 2));
}

#[test]
fn circumferential_cells_close_each_half() {
    let topology = CapsuleMeshPipeline::default().build().unwrap();
    let nz: Vec<usize> = topology.blocks().iter().map(|b| b.cells.nz).collect();
    assert_eq!(nz, vec![26, 19, 16, 33, 27, 27, 33, 16, 19, 26]);
    assert_eq!(nz[..5].iter().sum::<usize>(), 121);
    assert_eq!(nz[5..].iter().sum::<usize>(), 121);
}

#[test]
fn run_writes_complete_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let written = CapsuleMeshPipeline::new(config_in(&dir)).run().unwrap();
    let text = fs::read_to_string(&written).unwrap();

    assert!(text.starts_with("FoamFile"));
    assert!(text.contains("convertToMeters 1;"));
    assert_eq!(text.lines().filter(|l| l.trim_start().starts_with("hex (")).count(), 10);
    assert_eq!(text.lines().filter(|l| l.trim_start().starts_with("arc ")).count(), 16);
    assert_eq!(text.lines().filter(|l| l.trim_start().starts_with("spline ")).count(), 8);
    assert!(text.contains("b1 (41 1 26) simpleGrading (0.001 1 1)"));
    assert!(text.contains("type wall;"));
    assert_eq!(text.matches("type patch;").count(), 2);
    assert!(text.trim_end().ends_with(");"));
    assert!(text.contains("mergePatchPairs"));
}

#[test]
fn vertex_names_are_unique_in_output() {
    let dir = tempfile::tempdir().unwrap();
    let written = CapsuleMeshPipeline::new(config_in(&dir)).run().unwrap();
    let text = fs::read_to_string(written).unwrap();

    let start = text.find("vertices").unwrap();
    let end = text[start..].find(");").unwrap() + start;
    let names: Vec<&str> = text[start..end]
        .lines()
        .filter_map(|l| l.split("//").nth(1))
        .filter_map(|comment| comment.split_whitespace().nth(1))
        .collect();
    assert_eq!(names.len(), 44);
    let unique: std::collections::HashSet<&&str> = names.iter().collect();
    assert_eq!(unique.len(), 44);
    assert_eq!(names[0], "v0f");
    assert_eq!(names[1], "v1f");
    assert_eq!(names[7], "v0b");
}

#[test]
fn failed_run_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir).with_resolution(41, 1, 10);
    let output = config.output_path.clone();

    let result = CapsuleMeshPipeline::new(config).run();
    assert!(matches!(result, Err(MeshError::InvalidBlockResolution { .. })));
    assert!(!output.exists());
    assert!(!output.with_file_name("blockMeshDict.tmp").exists());
}

#[test]
fn body_scales_linearly_with_diameter() {
    let small = CapsuleMeshPipeline::new(CapsuleMeshConfig::new().with_diameter(0.4))
        .build()
        .unwrap();
    let large = CapsuleMeshPipeline::new(CapsuleMeshConfig::new().with_diameter(0.8))
        .build()
        .unwrap();

    for station in [1u8, 2, 3, 4, 5, 6, 8, 10] {
        for key in [VertexKey::body(station, Side::Front), VertexKey::far_field(station, Side::Back)] {
            let a = small.point(key).unwrap().position;
            let b = large.point(key).unwrap().position;
            assert_relative_eq!(b.x, 2.0 * a.x, epsilon = 1e-12);
            assert_relative_eq!(b.z, 2.0 * a.z, epsilon = 1e-12);
            assert_relative_eq!(b.y, a.y);
        }
    }
}

#[test]
fn dump_points_writes_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("points.json");
    let written = CapsuleMeshPipeline::new(config_in(&dir))
        .run_with_dump(&dump)
        .unwrap();

    assert!(written.exists());
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(dump).unwrap()).unwrap();
    let points = value["points"].as_object().unwrap();
    assert!(points.contains_key("c1011"));
    assert!(points.contains_key("e78"));
    assert_relative_eq!(value["diameter"].as_f64().unwrap(), 0.4);
}
