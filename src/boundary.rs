//! Boundary patch grouping
//!
//! Faces are assigned to patches by a fixed table keyed by block index, not
//! by looking at geometry. The far-field face of each block (`w`) goes to
//! `inlet` or `outlet`; the body face (`e`) of every block goes to `wall`.
//!
//! The table encodes the ring layout of [`crate::blocks`]. Changing the
//! ring order or block count requires updating [`FAR_FIELD_MEMBERSHIP`] in
//! the same change.

use crate::error::{MeshError, MeshResult};
use crate::topology::{BoundaryPatch, FaceDirection, FaceRef, HexBlock, MeshTopology, PatchType};

/// The three boundary patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Patch {
    Inlet,
    Outlet,
    Wall,
}

impl Patch {
    /// Output order of the patches.
    pub const ALL: [Self; 3] = [Self::Inlet, Self::Outlet, Self::Wall];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inlet => "inlet",
            Self::Outlet => "outlet",
            Self::Wall => "wall",
        }
    }

    #[must_use]
    pub const fn patch_type(self) -> PatchType {
        match self {
            Self::Inlet | Self::Outlet => PatchType::Patch,
            Self::Wall => PatchType::Wall,
        }
    }
}

/// Face of a block touching the far field.
pub const FAR_FIELD_FACE: FaceDirection = FaceDirection::West;
/// Face of a block touching the capsule.
pub const BODY_FACE: FaceDirection = FaceDirection::East;

/// Patch receiving the far-field face of each block.
pub const FAR_FIELD_MEMBERSHIP: [(usize, Patch); 10] = [
    (1, Patch::Inlet),
    (2, Patch::Inlet),
    (3, Patch::Inlet),
    (4, Patch::Outlet),
    (5, Patch::Outlet),
    (6, Patch::Outlet),
    (7, Patch::Outlet),
    (8, Patch::Inlet),
    (9, Patch::Inlet),
    (10, Patch::Inlet),
];

/// Patch of the far-field face of `block`, `None` if the table has no entry.
#[must_use]
pub fn far_field_patch(block: usize) -> Option<Patch> {
    FAR_FIELD_MEMBERSHIP
        .iter()
        .find(|(index, _)| *index == block)
        .map(|(_, patch)| *patch)
}

/// Group block faces into the inlet, outlet and wall patches.
///
/// Fails if the table names a block that does not exist, or if a block has
/// no far-field entry in the table.
pub fn group_boundaries(blocks: &[HexBlock]) -> MeshResult<Vec<BoundaryPatch>> {
    for (index, patch) in FAR_FIELD_MEMBERSHIP {
        if !blocks.iter().any(|b| b.index == index) {
            return Err(MeshError::dangling_reference(
                format!("patch `{}`", patch.name()),
                format!("b{index}"),
            ));
        }
    }

    let mut patches: Vec<BoundaryPatch> = Patch::ALL
        .iter()
        .map(|patch| BoundaryPatch {
            name: patch.name().to_string(),
            patch_type: patch.patch_type(),
            faces: Vec::new(),
        })
        .collect();
    let slot = |patch: Patch| Patch::ALL.iter().position(|p| *p == patch).unwrap_or_default();

    for block in blocks {
        let far_field = far_field_patch(block.index).ok_or_else(|| {
            MeshError::topology_inconsistency(format!(
                "block {} has no far-field patch assignment",
                block.name()
            ))
        })?;
        patches[slot(far_field)].faces.push(FaceRef {
            block: block.index,
            direction: FAR_FIELD_FACE,
        });
    }
    for block in blocks {
        patches[slot(Patch::Wall)].faces.push(FaceRef {
            block: block.index,
            direction: BODY_FACE,
        });
    }

    for patch in &patches {
        log::debug!("patch {} ({}): {} faces", patch.name, patch.patch_type, patch.faces.len());
    }
    Ok(patches)
}

/// Group the boundaries of `topology` and add them to it.
pub fn apply(topology: &mut MeshTopology) -> MeshResult<()> {
    for patch in group_boundaries(topology.blocks())? {
        topology.add_patch(patch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockRingAssembler, ResolutionPolicy};
    use crate::contour::Contour;
    use std::collections::HashMap;

    fn reference_blocks() -> Vec<HexBlock> {
        let contour = Contour::generate(0.4, 10).unwrap();
        BlockRingAssembler::new(ResolutionPolicy::default(), 0.1)
            .assemble(&contour)
            .unwrap()
            .blocks()
            .to_vec()
    }

    #[test]
    fn membership_table() {
        let inlet: Vec<usize> = (1..=10).filter(|&b| far_field_patch(b) == Some(Patch::Inlet)).collect();
        let outlet: Vec<usize> = (1..=10).filter(|&b| far_field_patch(b) == Some(Patch::Outlet)).collect();
        assert_eq!(inlet, vec![1, 2, 3, 8, 9, 10]);
        assert_eq!(outlet, vec![4, 5, 6, 7]);
        assert_eq!(far_field_patch(11), None);
    }

    #[test]
    fn every_block_is_referenced_twice() {
        let patches = group_boundaries(&reference_blocks()).unwrap();
        assert_eq!(patches.len(), 3);

        let mut uses: HashMap<usize, Vec<FaceDirection>> = HashMap::new();
        for patch in &patches {
            for face in &patch.faces {
                uses.entry(face.block).or_default().push(face.direction);
            }
        }
        assert_eq!(uses.len(), 10);
        for directions in uses.values() {
            assert_eq!(directions, &vec![FAR_FIELD_FACE, BODY_FACE]);
        }
    }

    #[test]
    fn patch_types() {
        let patches = group_boundaries(&reference_blocks()).unwrap();
        let by_name: HashMap<&str, &BoundaryPatch> =
            patches.iter().map(|p| (p.name.as_str(), p)).collect();
        assert_eq!(by_name["inlet"].patch_type, PatchType::Patch);
        assert_eq!(by_name["outlet"].patch_type, PatchType::Patch);
        assert_eq!(by_name["wall"].patch_type, PatchType::Wall);
        assert_eq!(by_name["inlet"].faces.len(), 6);
        assert_eq!(by_name["outlet"].faces.len(), 4);
        assert_eq!(by_name["wall"].faces.len(), 10);
    }

    #[test]
    fn far_field_faces_touch_far_field_vertices() {
        use crate::naming::Layer;

        for block in reference_blocks() {
            assert!(block.face(FAR_FIELD_FACE).iter().all(|v| v.layer == Layer::FarField));
            assert!(block.face(BODY_FACE).iter().all(|v| v.layer == Layer::Body));
        }
    }

    #[test]
    fn missing_block_is_a_dangling_reference() {
        let mut blocks = reference_blocks();
        blocks.retain(|b| b.index != 7);
        assert!(matches!(
            group_boundaries(&blocks),
            Err(MeshError::DanglingReference { .. })
        ));
    }
}
