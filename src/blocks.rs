//! Block ring assembly
//!
//! Extrudes the contour into front and back vertices, builds the ten hex
//! blocks that close the ring between body and far field, and attaches the
//! arc and spline edges that follow the curved parts of both contours.
//!
//! Block `k` spans stations `k` and `k + 1`. Its local axes are:
//! x from far field to body (strong grading towards the body), y across the
//! thin extrusion, z along the ring from station `k + 1` back to `k`.

use nalgebra::{Point2, Point3};

use crate::contour::Contour;
use crate::error::{ensure_positive, MeshError, MeshResult};
use crate::naming::{next_station, ContourKey, Layer, RingPosition, Side, VertexKey, RING_STATIONS};
use crate::topology::{CellCounts, EdgeInterpolant, EdgeShape, Grading, HexBlock, MeshTopology};

use RingPosition::{Midway, Origin, Station};

/// Share of the target cell count given to one block along the ring.
///
/// `span / total` is the angular extent of the block relative to its half of
/// the far field. The two halves have different totals (200.5 and 233
/// degrees) and `offset` rebalances resolution across the inlet/outlet
/// transition. These are empirical calibration values for the reference
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircumferentialSpan {
    pub span_degrees: f64,
    pub total_degrees: f64,
    pub offset: i64,
}

const fn span(span_degrees: f64, total_degrees: f64, offset: i64) -> CircumferentialSpan {
    CircumferentialSpan {
        span_degrees,
        total_degrees,
        offset,
    }
}

/// Ring apportioning, indexed by block - 1.
pub const RING_SPANS: [CircumferentialSpan; RING_STATIONS as usize] = [
    span(87.3, 200.5, 0),
    span(56.6, 200.5, 2),
    span(56.6, 200.5, -1),
    span(113.1, 233.0, 4),
    span(120.0, 233.0, -4),
    span(120.0, 233.0, -4),
    span(113.1, 233.0, 4),
    span(56.6, 200.5, -1),
    span(56.6, 200.5, 2),
    span(87.3, 200.5, 0),
];

/// Cell counts and grading shared by every block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionPolicy {
    /// Cells from far field to body
    pub nx: usize,
    /// Cells across the extrusion
    pub ny: usize,
    /// Target cells around each half of the ring
    pub nz: usize,
    pub grading: Grading,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            nx: crate::defaults::CELLS_RADIAL,
            ny: crate::defaults::CELLS_THIN,
            nz: crate::defaults::CELLS_CIRCUMFERENTIAL,
            grading: crate::defaults::GRADING,
        }
    }
}

impl ResolutionPolicy {
    pub fn validate(&self) -> MeshResult<()> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(MeshError::invalid_parameter(
                "resolution",
                format!("cell counts must be positive, got ({}, {}, {})", self.nx, self.ny, self.nz),
            ));
        }
        ensure_positive("grading.x", self.grading.x)?;
        ensure_positive("grading.y", self.grading.y)?;
        ensure_positive("grading.z", self.grading.z)?;
        Ok(())
    }

    /// Cells along the ring for block `block` (1-based).
    ///
    /// The fractional share is truncated before the calibration offset is
    /// added. A result of zero or less is an error, never clamped.
    pub fn circumferential_cells(&self, block: usize) -> MeshResult<usize> {
        let share = block
            .checked_sub(1)
            .and_then(|i| RING_SPANS.get(i))
            .ok_or_else(|| MeshError::dangling_reference("resolution table", format!("b{block}")))?;

        let cells = (0.5 * self.nz as f64 * share.span_degrees / share.total_degrees) as i64
            + share.offset;
        usize::try_from(cells)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(MeshError::InvalidBlockResolution { block, cells })
    }

    pub fn cells(&self, block: usize) -> MeshResult<CellCounts> {
        Ok(CellCounts {
            nx: self.nx,
            ny: self.ny,
            nz: self.circumferential_cells(block)?,
        })
    }
}

/// Vertex declaration order: top far field, top body, bottom far field,
/// bottom body. The auxiliary body point after station 1 is declared; the
/// other arc midpoints only appear inside edges.
fn declared_positions() -> [(Layer, Vec<RingPosition>); 4] {
    let bottom = 7..=RING_STATIONS;
    [
        (
            Layer::FarField,
            std::iter::once(Origin).chain((1..=6u8).map(Station)).collect(),
        ),
        (
            Layer::Body,
            [Station(1), Midway(1)]
                .into_iter()
                .chain((2..=6u8).map(Station))
                .collect(),
        ),
        (Layer::FarField, bottom.clone().map(Station).collect()),
        (Layer::Body, bottom.map(Station).collect()),
    ]
}

/// Builds points, blocks and edges from a finished contour.
#[derive(Debug, Clone)]
pub struct BlockRingAssembler {
    policy: ResolutionPolicy,
    half_thickness: f64,
}

impl BlockRingAssembler {
    #[must_use]
    pub const fn new(policy: ResolutionPolicy, half_thickness: f64) -> Self {
        Self {
            policy,
            half_thickness,
        }
    }

    /// Assemble the ring. Patches are added afterwards by the boundary
    /// grouper.
    pub fn assemble(&self, contour: &Contour) -> MeshResult<MeshTopology> {
        self.policy.validate()?;
        ensure_positive("half_thickness", self.half_thickness)?;

        let mut topology = MeshTopology::new();
        self.declare_points(contour, &mut topology)?;

        for k in 1..=RING_STATIONS {
            let block = self.build_block(k)?;
            log::debug!(
                "block {}: cells ({} {} {})",
                block.name(),
                block.cells.nx,
                block.cells.ny,
                block.cells.nz
            );
            topology.add_block(block)?;
        }

        for k in 1..=RING_STATIONS {
            for edge in self.block_edges(contour, k)? {
                topology.add_edge(edge)?;
            }
        }

        log::info!(
            "assembled {} blocks, {} vertices, {} curved edges",
            topology.blocks().len(),
            topology.points().len(),
            topology.edges().len()
        );
        Ok(topology)
    }

    fn extrude(&self, point: Point2<f64>, side: Side) -> Point3<f64> {
        Point3::new(point.x, side.y(self.half_thickness), point.y)
    }

    fn declare_points(&self, contour: &Contour, topology: &mut MeshTopology) -> MeshResult<()> {
        for (layer, positions) in declared_positions() {
            for side in Side::BOTH {
                for &position in &positions {
                    let key = ContourKey { layer, position };
                    let point = contour.require(key)?;
                    topology.add_point(key.on(side), self.extrude(point, side))?;
                }
            }
        }
        Ok(())
    }

    fn build_block(&self, k: u8) -> MeshResult<HexBlock> {
        let next = next_station(k);
        let index = usize::from(k);
        Ok(HexBlock {
            index,
            vertices: [
                VertexKey::far_field(next, Side::Front),
                VertexKey::body(next, Side::Front),
                VertexKey::body(next, Side::Back),
                VertexKey::far_field(next, Side::Back),
                VertexKey::far_field(k, Side::Front),
                VertexKey::body(k, Side::Front),
                VertexKey::body(k, Side::Back),
                VertexKey::far_field(k, Side::Back),
            ],
            cells: self.policy.cells(index)?,
            grading: self.policy.grading,
        })
    }

    /// Curved edges of block `k`, front copy before back copy.
    ///
    /// An edge is an arc when the contour has a midpoint between the two
    /// stations and a spline when it has a segment joining them. Otherwise
    /// the edge stays straight and nothing is emitted.
    fn block_edges(&self, contour: &Contour, k: u8) -> MeshResult<Vec<EdgeInterpolant>> {
        let next = next_station(k);
        let mut edges = Vec::new();

        for layer in [Layer::FarField, Layer::Body] {
            let midpoint = contour.point(ContourKey { layer, position: Midway(k) });
            let segment = match layer {
                Layer::FarField => contour.segment_between(Station(k), Station(next)),
                Layer::Body => None,
            };

            for side in Side::BOTH {
                let key = |position| ContourKey { layer, position }.on(side);
                if let Some(mid) = midpoint {
                    edges.push(EdgeInterpolant {
                        start: key(Station(k)),
                        end: key(Station(next)),
                        shape: EdgeShape::Arc {
                            midpoint: self.extrude(mid, side),
                        },
                    });
                } else if let Some(segment) = segment {
                    edges.push(EdgeInterpolant {
                        start: key(segment.from),
                        end: key(segment.to),
                        shape: EdgeShape::Spline {
                            points: segment.points.iter().map(|&p| self.extrude(p, side)).collect(),
                        },
                    });
                }
            }
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reference_topology() -> MeshTopology {
        let contour = Contour::generate(0.4, 10).unwrap();
        BlockRingAssembler::new(ResolutionPolicy::default(), 0.1)
            .assemble(&contour)
            .unwrap()
    }

    #[test]
    fn reference_cell_counts() {
        let policy = ResolutionPolicy::default();
        let cells: Vec<usize> = (1..=10)
            .map(|b| policy.circumferential_cells(b).unwrap())
            .collect();
        assert_eq!(cells, vec![26, 19, 16, 33, 27, 27, 33, 16, 19, 26]);
    }

    #[test]
    fn each_half_ring_sums_to_target() {
        let policy = ResolutionPolicy::default();
        let top: usize = (1..=5).map(|b| policy.circumferential_cells(b).unwrap()).sum();
        let bottom: usize = (6..=10).map(|b| policy.circumferential_cells(b).unwrap()).sum();
        assert_eq!(top, 121);
        assert_eq!(bottom, 121);
    }

    #[test]
    fn offsets_cannot_drive_counts_below_one() {
        let policy = ResolutionPolicy { nz: 10, ..ResolutionPolicy::default() };
        // 0.5 * 10 * 120 / 233 truncates to 2, minus 4
        assert!(matches!(
            policy.circumferential_cells(5),
            Err(MeshError::InvalidBlockResolution { block: 5, cells: -2 })
        ));

        let contour = Contour::generate(0.4, 10).unwrap();
        let result = BlockRingAssembler::new(policy, 0.1).assemble(&contour);
        assert!(matches!(result, Err(MeshError::InvalidBlockResolution { .. })));
    }

    #[test]
    fn unknown_block_has_no_share() {
        let policy = ResolutionPolicy::default();
        assert!(policy.circumferential_cells(0).is_err());
        assert!(policy.circumferential_cells(11).is_err());
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let policy = ResolutionPolicy { nx: 0, ..ResolutionPolicy::default() };
        assert!(matches!(policy.validate(), Err(MeshError::InvalidParameter { .. })));
    }

    #[test]
    fn reference_vertex_set() {
        let topology = reference_topology();
        assert_eq!(topology.points().len(), 44);
        let names: HashSet<String> = topology.points().iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), 44);
        for name in ["v0f", "v6b", "c12f", "c12b", "v10f", "c10b"] {
            assert!(names.contains(name), "missing {name}");
        }
        assert!(!names.contains("c1011f"));

        let first: Vec<String> = topology.points()[..8].iter().map(|p| p.name()).collect();
        assert_eq!(first, ["v0f", "v1f", "v2f", "v3f", "v4f", "v5f", "v6f", "v0b"]);
    }

    #[test]
    fn extrusion_offsets_front_and_back() {
        let topology = reference_topology();
        let front = topology.point(VertexKey::body(4, Side::Front)).unwrap();
        let back = topology.point(VertexKey::body(4, Side::Back)).unwrap();
        assert_eq!(front.position.y, 0.1);
        assert_eq!(back.position.y, -0.1);
        assert_eq!(front.position.x, back.position.x);
        assert_eq!(front.position.z, back.position.z);
    }

    #[test]
    fn block_corner_order() {
        let topology = reference_topology();
        let names: Vec<String> = topology.block(1).unwrap().vertices.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["v2f", "c2f", "c2b", "v2b", "v1f", "c1f", "c1b", "v1b"]);

        let names: Vec<String> = topology.block(10).unwrap().vertices.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["v1f", "c1f", "c1b", "v1b", "v10f", "c10f", "c10b", "v10b"]);
    }

    #[test]
    fn neighbours_share_one_face() {
        use crate::topology::FaceDirection;

        let topology = reference_topology();
        for k in 1..=10usize {
            let block = topology.block(k).unwrap();
            let next = topology.block(k % 10 + 1).unwrap();
            let mut top: Vec<VertexKey> = block.face(FaceDirection::Bottom).to_vec();
            let mut bottom: Vec<VertexKey> = next.face(FaceDirection::Top).to_vec();
            top.sort();
            bottom.sort();
            assert_eq!(top, bottom, "blocks {k} and {} do not share a face", k % 10 + 1);

            let shared = block.vertices.iter().filter(|v| next.has_corner(**v)).count();
            assert_eq!(shared, 4);
        }
    }

    #[test]
    fn reference_edges() {
        let topology = reference_topology();
        let arcs = topology.edges().iter().filter(|e| e.is_arc()).count();
        let splines: Vec<&EdgeInterpolant> = topology.edges().iter().filter(|e| !e.is_arc()).collect();
        assert_eq!(arcs, 16);
        assert_eq!(splines.len(), 8);
        for edge in splines {
            let EdgeShape::Spline { points } = &edge.shape else { unreachable!() };
            assert_eq!(points.len(), 10);
            assert_eq!(points[0].y, points[9].y);
        }
        topology.validate().unwrap();
    }

    #[test]
    fn spline_edges_keep_segment_orientation() {
        let topology = reference_topology();
        let ends: HashSet<(String, String)> = topology
            .edges()
            .iter()
            .filter(|e| !e.is_arc())
            .map(|e| (e.start.to_string(), e.end.to_string()))
            .collect();
        for (a, b) in [("v2f", "v3f"), ("v4b", "v3b"), ("v8f", "v9f"), ("v10b", "v9b")] {
            assert!(ends.contains(&(a.to_string(), b.to_string())), "missing {a} -> {b}");
        }
    }

    #[test]
    fn leading_edge_arcs_on_both_contours() {
        let topology = reference_topology();
        let arc_between = |a: VertexKey, b: VertexKey| {
            topology.edges().iter().any(|e| e.is_arc() && e.start == a && e.end == b)
        };
        for side in Side::BOTH {
            assert!(arc_between(VertexKey::body(1, side), VertexKey::body(2, side)));
            assert!(arc_between(VertexKey::body(10, side), VertexKey::body(1, side)));
            assert!(arc_between(VertexKey::far_field(10, side), VertexKey::far_field(1, side)));
            assert!(arc_between(VertexKey::far_field(6, side), VertexKey::far_field(7, side)));
        }
    }
}
