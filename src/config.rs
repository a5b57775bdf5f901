//! Mesh generation configuration
//!
//! Everything that can be tuned without touching the ring layout. Values
//! missing from a JSON file fall back to [`crate::defaults`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blocks::ResolutionPolicy;
use crate::defaults;
use crate::error::{ensure_positive, MeshError, MeshResult};
use crate::export::{BlockMeshDictExporter, ExportUnits};
use crate::topology::{CellCounts, Grading};

/// Configuration for a capsule mesh run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapsuleMeshConfig {
    /// Body diameter (m)
    pub diameter: f64,
    /// Half the extrusion depth (m); front plane at `+half_thickness`
    pub half_thickness: f64,
    /// Radial, thin-direction and per-half circumferential cell counts
    pub resolution: CellCounts,
    /// simpleGrading applied to every block
    pub grading: Grading,
    /// Points per far-field spline edge, endpoints included
    pub spline_samples: usize,
    /// Decimals written for every coordinate
    pub precision: usize,
    pub units: ExportUnits,
    pub output_path: PathBuf,
}

impl Default for CapsuleMeshConfig {
    fn default() -> Self {
        Self {
            diameter: defaults::DEFAULT_DIAMETER,
            half_thickness: defaults::HALF_THICKNESS,
            resolution: CellCounts {
                nx: defaults::CELLS_RADIAL,
                ny: defaults::CELLS_THIN,
                nz: defaults::CELLS_CIRCUMFERENTIAL,
            },
            grading: defaults::GRADING,
            spline_samples: defaults::SPLINE_SAMPLES,
            precision: defaults::COORDINATE_PRECISION,
            units: ExportUnits::Meters,
            output_path: PathBuf::from(defaults::DEFAULT_OUTPUT_PATH),
        }
    }
}

impl CapsuleMeshConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set body diameter
    #[must_use]
    pub const fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    /// Set extrusion half thickness
    #[must_use]
    pub const fn with_half_thickness(mut self, half_thickness: f64) -> Self {
        self.half_thickness = half_thickness;
        self
    }

    #[must_use]
    pub const fn with_resolution(mut self, nx: usize, ny: usize, nz: usize) -> Self {
        self.resolution = CellCounts { nx, ny, nz };
        self
    }

    #[must_use]
    pub const fn with_grading(mut self, grading: Grading) -> Self {
        self.grading = grading;
        self
    }

    #[must_use]
    pub const fn with_spline_samples(mut self, samples: usize) -> Self {
        self.spline_samples = samples;
        self
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub const fn with_units(mut self, units: ExportUnits) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let path = path.as_ref();
        let json_str = fs::read_to_string(path).map_err(|e| {
            MeshError::invalid_parameter(
                "config",
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_str(&json_str)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(json_str: &str) -> MeshResult<Self> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter before any geometry is computed.
    pub fn validate(&self) -> MeshResult<()> {
        ensure_positive("diameter", self.diameter)?;
        ensure_positive("half_thickness", self.half_thickness)?;
        if self.spline_samples < 2 {
            return Err(MeshError::invalid_parameter(
                "spline_samples",
                format!("need at least 2 points per spline, got {}", self.spline_samples),
            ));
        }
        self.resolution_policy().validate()?;
        Ok(())
    }

    #[must_use]
    pub const fn resolution_policy(&self) -> ResolutionPolicy {
        ResolutionPolicy {
            nx: self.resolution.nx,
            ny: self.resolution.ny,
            nz: self.resolution.nz,
            grading: self.grading,
        }
    }

    #[must_use]
    pub const fn exporter(&self) -> BlockMeshDictExporter {
        BlockMeshDictExporter::new()
            .with_precision(self.precision)
            .with_units(self.units)
    }
}
