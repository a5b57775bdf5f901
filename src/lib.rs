//! `capsule-mesh` - blockMeshDict generation around a capsule-shaped body
//!
//! Builds the block-structured quasi-3D mesh description of the flow domain
//! around a capsule: a far field made of an inlet circle, an outlet circle and
//! two spline transitions, a ring of ten hex blocks between far field and body,
//! and the `inlet`, `outlet` and `wall` patches. The result is written as an
//! OpenFOAM `blockMeshDict`.
//!
//! # Architecture
//!
//! - **geometry**: circle points, linear sampling and the cubic transition spline
//! - **naming**: typed keys for contour points and extruded vertices
//! - **contour**: staged far-field and body contour generation with mirroring
//! - **topology**: points, blocks, edges and patches with reference checks
//! - **blocks**: ring assembly and circumferential cell apportioning
//! - **boundary**: face-to-patch membership table
//! - **export**: atomic `blockMeshDict` and contour JSON writers
//! - **config**: serde configuration with validation
//!
//! # Examples
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use capsule_mesh::{CapsuleMeshConfig, CapsuleMeshPipeline};
//!
//! let config = CapsuleMeshConfig::new()
//!     .with_diameter(0.4)
//!     .with_output_path("system/blockMeshDict");
//!
//! let written = CapsuleMeshPipeline::new(config).run()?;
//! println!("wrote {}", written.display());
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod boundary;
pub mod config;
pub mod contour;
pub mod error;
pub mod export;
pub mod geometry;
pub mod naming;
pub mod topology;

use std::path::PathBuf;

// Re-export commonly used types
pub use blocks::{BlockRingAssembler, ResolutionPolicy};
pub use config::CapsuleMeshConfig;
pub use contour::Contour;
pub use error::{MeshError, MeshResult};
pub use export::{export_contour_json, BlockMeshDictExporter, ExportUnits};
pub use naming::{ContourKey, Layer, RingPosition, Side, VertexKey};
pub use topology::{BoundaryPatch, EdgeInterpolant, HexBlock, MeshTopology};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default mesh generation parameters
pub mod defaults {
    use crate::topology::Grading;

    /// Diameter the domain constants and body shape are expressed for (m)
    pub const REFERENCE_DIAMETER: f64 = 0.4;

    /// Default body diameter (m)
    pub const DEFAULT_DIAMETER: f64 = REFERENCE_DIAMETER;

    /// Downstream extent of the domain at the reference diameter (m)
    pub const DOMAIN_POS_X: f64 = 4.0;

    /// Upstream extent of the domain at the reference diameter (m)
    pub const DOMAIN_NEG_X: f64 = -2.0;

    /// Height of the domain at the reference diameter (m)
    pub const DOMAIN_POS_Z: f64 = 4.0;

    /// Half of the extrusion depth (m)
    pub const HALF_THICKNESS: f64 = 0.1;

    /// Inlet circle angles (degrees)
    pub const INLET_ANGLE_12: f64 = 170.0;
    pub const INLET_ANGLE_2: f64 = 155.0;

    /// Outlet circle angles (degrees)
    pub const OUTLET_ANGLE_4: f64 = 75.0;
    pub const OUTLET_ANGLE_45: f64 = 60.0;
    pub const OUTLET_ANGLE_5: f64 = 45.0;
    pub const OUTLET_ANGLE_56: f64 = 23.0;

    /// Cells from far field to body
    pub const CELLS_RADIAL: usize = 41;

    /// Cells across the extrusion
    pub const CELLS_THIN: usize = 1;

    /// Cells around each half of the ring
    pub const CELLS_CIRCUMFERENTIAL: usize = 121;

    /// Strong clustering towards the body along the radial axis
    pub const GRADING: Grading = Grading {
        x: 1.0 / 1000.0,
        y: 1.0,
        z: 1.0,
    };

    /// Points per far-field spline edge
    pub const SPLINE_SAMPLES: usize = 10;

    /// Decimals written for coordinates
    pub const COORDINATE_PRECISION: usize = 4;

    pub const DEFAULT_OUTPUT_PATH: &str = "system/blockMeshDict";
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        export_contour_json, BlockMeshDictExporter, CapsuleMeshConfig, CapsuleMeshPipeline,
        Contour, ExportUnits, MeshError, MeshResult, MeshTopology,
    };

    pub use crate::defaults::*;
}

/// Diameters outside this factor of the reference are legal but untested.
const DIAMETER_WARN_FACTOR: f64 = 10.0;

/// Main pipeline: contour, ring, boundaries, export
#[derive(Debug, Clone)]
pub struct CapsuleMeshPipeline {
    config: CapsuleMeshConfig,
}

impl CapsuleMeshPipeline {
    /// Create new pipeline with configuration
    #[must_use]
    pub const fn new(config: CapsuleMeshConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CapsuleMeshConfig {
        &self.config
    }

    /// Generate the mirrored 2D contour.
    pub fn contour(&self) -> MeshResult<Contour> {
        self.config.validate()?;
        let ratio = self.config.diameter / defaults::REFERENCE_DIAMETER;
        if !(1.0 / DIAMETER_WARN_FACTOR..=DIAMETER_WARN_FACTOR).contains(&ratio) {
            log::warn!(
                "diameter {} is far from the reference {}; calibration offsets may not fit",
                self.config.diameter,
                defaults::REFERENCE_DIAMETER
            );
        }
        let contour = Contour::generate(self.config.diameter, self.config.spline_samples)?;
        log::info!(
            "Generated contour with {} points and {} spline segments",
            contour.points().count(),
            contour.segments().len()
        );
        Ok(contour)
    }

    /// Build the complete topology without touching the filesystem.
    pub fn build(&self) -> MeshResult<MeshTopology> {
        let contour = self.contour()?;
        self.build_from(&contour)
    }

    fn build_from(&self, contour: &Contour) -> MeshResult<MeshTopology> {
        let mut topology =
            BlockRingAssembler::new(self.config.resolution_policy(), self.config.half_thickness)
                .assemble(contour)?;
        boundary::apply(&mut topology)?;
        topology.validate()?;
        Ok(topology)
    }

    /// Build and write the dictionary to the configured output path.
    pub fn run(&self) -> MeshResult<PathBuf> {
        let topology = self.build()?;
        self.config.exporter().export(&topology, &self.config.output_path)
    }

    /// Like [`Self::run`], also dumping the contour points as JSON.
    pub fn run_with_dump<P: AsRef<std::path::Path>>(&self, dump_path: P) -> MeshResult<PathBuf> {
        let contour = self.contour()?;
        let topology = self.build_from(&contour)?;
        export_contour_json(&contour, dump_path)?;
        self.config.exporter().export(&topology, &self.config.output_path)
    }
}

impl Default for CapsuleMeshPipeline {
    fn default() -> Self {
        Self::new(CapsuleMeshConfig::default())
    }
}
