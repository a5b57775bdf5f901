//! Block-structured mesh topology
//!
//! The aggregate handed to the exporter: named vertices, hex blocks, curved
//! edges and boundary patches. Every reference is by [`VertexKey`] or block
//! index, and [`MeshTopology::validate`] checks that each one resolves.

use std::collections::{HashMap, HashSet};
use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::naming::VertexKey;

/// Vertex with its identifying key.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPoint {
    pub key: VertexKey,
    pub position: Point3<f64>,
}

impl NamedPoint {
    /// Legacy name, e.g. `v2f`.
    #[must_use]
    pub fn name(&self) -> String {
        self.key.to_string()
    }
}

/// Cells along the three local block axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

/// Per-axis expansion ratio (blockMesh `simpleGrading`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Grading {
    /// No expansion on any axis.
    pub const UNIFORM: Self = Self { x: 1.0, y: 1.0, z: 1.0 };
}

/// The six logical sides of a hex block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    /// x-min (`w`)
    West,
    /// x-max (`e`)
    East,
    /// y-min (`s`)
    South,
    /// y-max (`n`)
    North,
    /// z-min (`b`)
    Bottom,
    /// z-max (`t`)
    Top,
}

impl FaceDirection {
    pub const ALL: [Self; 6] = [
        Self::West,
        Self::East,
        Self::South,
        Self::North,
        Self::Bottom,
        Self::Top,
    ];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::West => 'w',
            Self::East => 'e',
            Self::South => 's',
            Self::North => 'n',
            Self::Bottom => 'b',
            Self::Top => 't',
        }
    }

    /// Block corner indices of the face, ordered so the normal points out
    /// of the block.
    #[must_use]
    pub const fn corners(self) -> [usize; 4] {
        match self {
            Self::West => [0, 4, 7, 3],
            Self::East => [1, 2, 6, 5],
            Self::South => [0, 1, 5, 4],
            Self::North => [7, 6, 2, 3],
            Self::Bottom => [0, 3, 2, 1],
            Self::Top => [4, 5, 6, 7],
        }
    }
}

/// Topological hexahedron.
#[derive(Debug, Clone, PartialEq)]
pub struct HexBlock {
    /// 1-based position in the ring
    pub index: usize,
    /// Corner order determines face orientation and must be kept as is
    pub vertices: [VertexKey; 8],
    pub cells: CellCounts,
    pub grading: Grading,
}

impl HexBlock {
    #[must_use]
    pub fn name(&self) -> String {
        format!("b{}", self.index)
    }

    /// Corner keys of one face.
    #[must_use]
    pub fn face(&self, direction: FaceDirection) -> [VertexKey; 4] {
        direction.corners().map(|i| self.vertices[i])
    }

    #[must_use]
    pub fn has_corner(&self, key: VertexKey) -> bool {
        self.vertices.contains(&key)
    }
}

/// How an edge is curved between its two end vertices.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeShape {
    /// Circular arc through a midpoint
    Arc { midpoint: Point3<f64> },
    /// Spline through an ordered point sequence
    Spline { points: Vec<Point3<f64>> },
}

/// Curved edge attached to a pair of block corners.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInterpolant {
    pub start: VertexKey,
    pub end: VertexKey,
    pub shape: EdgeShape,
}

impl EdgeInterpolant {
    #[must_use]
    pub const fn is_arc(&self) -> bool {
        matches!(self.shape, EdgeShape::Arc { .. })
    }
}

/// Boundary type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchType {
    Patch,
    Wall,
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Wall => write!(f, "wall"),
        }
    }
}

/// One block face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub block: usize,
    pub direction: FaceDirection,
}

/// Named group of block faces.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPatch {
    pub name: String,
    pub patch_type: PatchType,
    pub faces: Vec<FaceRef>,
}

/// Points, blocks, edges and patches of one mesh.
///
/// Points keep their declaration order, which is the vertex numbering used
/// by the exporter.
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    points: Vec<NamedPoint>,
    lookup: HashMap<VertexKey, usize>,
    blocks: Vec<HexBlock>,
    edges: Vec<EdgeInterpolant>,
    patches: Vec<BoundaryPatch>,
}

impl MeshTopology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a vertex. Keys and rendered names must be unique.
    pub fn add_point(&mut self, key: VertexKey, position: Point3<f64>) -> MeshResult<usize> {
        if self.lookup.contains_key(&key) {
            return Err(MeshError::topology_inconsistency(format!(
                "vertex `{key}` declared twice"
            )));
        }
        let name = key.to_string();
        if self.points.iter().any(|p| p.name() == name) {
            return Err(MeshError::topology_inconsistency(format!(
                "vertex name `{name}` is shared by two keys"
            )));
        }

        let index = self.points.len();
        self.points.push(NamedPoint { key, position });
        self.lookup.insert(key, index);
        Ok(index)
    }

    /// Add a block whose corners are all declared already.
    pub fn add_block(&mut self, block: HexBlock) -> MeshResult<()> {
        if self.block(block.index).is_some() {
            return Err(MeshError::topology_inconsistency(format!(
                "block {} added twice",
                block.name()
            )));
        }
        self.check_block(&block)?;
        self.blocks.push(block);
        Ok(())
    }

    /// Add a curved edge between two declared vertices.
    pub fn add_edge(&mut self, edge: EdgeInterpolant) -> MeshResult<()> {
        self.check_edge_endpoints(&edge)?;
        self.edges.push(edge);
        Ok(())
    }

    /// Add a boundary patch whose faces belong to existing blocks.
    pub fn add_patch(&mut self, patch: BoundaryPatch) -> MeshResult<()> {
        if self.patches.iter().any(|p| p.name == patch.name) {
            return Err(MeshError::topology_inconsistency(format!(
                "patch `{}` added twice",
                patch.name
            )));
        }
        self.check_patch(&patch)?;
        self.patches.push(patch);
        Ok(())
    }

    #[must_use]
    pub fn points(&self) -> &[NamedPoint] {
        &self.points
    }

    #[must_use]
    pub fn blocks(&self) -> &[HexBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn edges(&self) -> &[EdgeInterpolant] {
        &self.edges
    }

    #[must_use]
    pub fn patches(&self) -> &[BoundaryPatch] {
        &self.patches
    }

    /// Declaration index of a vertex.
    #[must_use]
    pub fn vertex_index(&self, key: VertexKey) -> Option<usize> {
        self.lookup.get(&key).copied()
    }

    #[must_use]
    pub fn point(&self, key: VertexKey) -> Option<&NamedPoint> {
        self.vertex_index(key).map(|i| &self.points[i])
    }

    #[must_use]
    pub fn block(&self, index: usize) -> Option<&HexBlock> {
        self.blocks.iter().find(|b| b.index == index)
    }

    #[must_use]
    pub fn patch(&self, name: &str) -> Option<&BoundaryPatch> {
        self.patches.iter().find(|p| p.name == name)
    }

    /// Check every reference in the aggregate.
    pub fn validate(&self) -> MeshResult<()> {
        let mut names = HashSet::with_capacity(self.points.len());
        for point in &self.points {
            if !names.insert(point.name()) {
                return Err(MeshError::topology_inconsistency(format!(
                    "vertex name `{}` is not unique",
                    point.name()
                )));
            }
        }
        for block in &self.blocks {
            self.check_block(block)?;
        }
        for edge in &self.edges {
            self.check_edge_endpoints(edge)?;
            let on_block = self
                .blocks
                .iter()
                .any(|b| b.has_corner(edge.start) && b.has_corner(edge.end));
            if !on_block {
                return Err(MeshError::dangling_reference(
                    "edge",
                    format!("{} -> {} (not a block edge)", edge.start, edge.end),
                ));
            }
        }
        for patch in &self.patches {
            self.check_patch(patch)?;
        }
        Ok(())
    }

    fn check_block(&self, block: &HexBlock) -> MeshResult<()> {
        for key in &block.vertices {
            if !self.lookup.contains_key(key) {
                return Err(MeshError::dangling_reference(format!("block {}", block.name()), key));
            }
        }
        Ok(())
    }

    fn check_edge_endpoints(&self, edge: &EdgeInterpolant) -> MeshResult<()> {
        for key in [edge.start, edge.end] {
            if !self.lookup.contains_key(&key) {
                return Err(MeshError::dangling_reference("edge", key));
            }
        }
        Ok(())
    }

    fn check_patch(&self, patch: &BoundaryPatch) -> MeshResult<()> {
        for face in &patch.faces {
            if self.block(face.block).is_none() {
                return Err(MeshError::dangling_reference(
                    format!("patch `{}`", patch.name),
                    format!("b{}", face.block),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{Layer, RingPosition, Side};

    fn unit_block(topology: &mut MeshTopology) -> HexBlock {
        let keys: Vec<VertexKey> = (1..=4u8)
            .flat_map(|k| Side::BOTH.map(|side| VertexKey::far_field(k, side)))
            .collect();
        for (i, key) in keys.iter().enumerate() {
            topology
                .add_point(*key, Point3::new(i as f64, 0.0, 0.0))
                .unwrap();
        }
        HexBlock {
            index: 1,
            vertices: [keys[0], keys[1], keys[2], keys[3], keys[4], keys[5], keys[6], keys[7]],
            cells: CellCounts { nx: 2, ny: 1, nz: 3 },
            grading: Grading::UNIFORM,
        }
    }

    #[test]
    fn duplicate_points_are_rejected() {
        let mut topology = MeshTopology::new();
        let key = VertexKey::body(3, Side::Front);
        topology.add_point(key, Point3::origin()).unwrap();
        let err = topology.add_point(key, Point3::new(1.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, MeshError::TopologyInconsistency { .. }));
        assert_eq!(topology.points().len(), 1);
    }

    #[test]
    fn blocks_need_declared_corners() {
        let mut topology = MeshTopology::new();
        let mut block = unit_block(&mut topology);
        block.vertices[5] = VertexKey::body(9, Side::Back);
        let err = topology.add_block(block).unwrap_err();
        assert!(matches!(err, MeshError::DanglingReference { .. }));
        assert!(err.to_string().contains("c9b"));
    }

    #[test]
    fn edges_must_lie_on_a_block() {
        let mut topology = MeshTopology::new();
        let block = unit_block(&mut topology);
        topology.add_block(block).unwrap();

        let stray = VertexKey {
            layer: Layer::FarField,
            position: RingPosition::Origin,
            side: Side::Front,
        };
        topology.add_point(stray, Point3::origin()).unwrap();
        topology
            .add_edge(EdgeInterpolant {
                start: stray,
                end: VertexKey::far_field(1, Side::Front),
                shape: EdgeShape::Arc { midpoint: Point3::new(0.5, 0.0, 0.5) },
            })
            .unwrap();

        assert!(matches!(
            topology.validate(),
            Err(MeshError::DanglingReference { .. })
        ));
    }

    #[test]
    fn patches_need_existing_blocks() {
        let mut topology = MeshTopology::new();
        let block = unit_block(&mut topology);
        topology.add_block(block).unwrap();

        let patch = BoundaryPatch {
            name: "inlet".to_string(),
            patch_type: PatchType::Patch,
            faces: vec![FaceRef { block: 2, direction: FaceDirection::West }],
        };
        assert!(matches!(
            topology.add_patch(patch),
            Err(MeshError::DanglingReference { .. })
        ));
    }

    #[test]
    fn faces_follow_corner_table() {
        let mut topology = MeshTopology::new();
        let block = unit_block(&mut topology);
        let v = block.vertices;
        assert_eq!(block.face(FaceDirection::West), [v[0], v[4], v[7], v[3]]);
        assert_eq!(block.face(FaceDirection::East), [v[1], v[2], v[6], v[5]]);

        // Every corner appears in exactly three faces.
        for corner in 0..8 {
            let count = FaceDirection::ALL
                .iter()
                .filter(|d| d.corners().contains(&corner))
                .count();
            assert_eq!(count, 3);
        }
    }

    #[test]
    fn patch_type_names() {
        assert_eq!(PatchType::Patch.to_string(), "patch");
        assert_eq!(PatchType::Wall.to_string(), "wall");
    }
}
