//! blockMeshDict export
//!
//! Renders a [`MeshTopology`] to the OpenFOAM `blockMeshDict` text format and
//! writes it atomically: the whole file is built in memory, written to a
//! sibling temporary file and renamed over the target. A failed export never
//! leaves a truncated dictionary behind.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::contour::Contour;
use crate::error::{MeshError, MeshResult};
use crate::topology::{EdgeShape, MeshTopology};

/// Length unit of the written coordinates.
///
/// Geometry is computed in meters. Coordinates are scaled into the chosen
/// unit and `convertToMeters` brings them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportUnits {
    /// Meters (SI base unit)
    #[default]
    Meters,
    Millimeters,
    Micrometers,
}

impl ExportUnits {
    /// Factor from meters to this unit.
    #[must_use]
    pub const fn scale_factor(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Millimeters => 1000.0,
            Self::Micrometers => 1_000_000.0,
        }
    }

    /// Value written as `convertToMeters`.
    #[must_use]
    pub fn convert_to_meters(self) -> f64 {
        1.0 / self.scale_factor()
    }
}

/// Writer for the `blockMeshDict` format
#[derive(Debug, Clone)]
pub struct BlockMeshDictExporter {
    /// Decimals kept for every coordinate
    precision: usize,
    units: ExportUnits,
}

impl BlockMeshDictExporter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            precision: crate::defaults::COORDINATE_PRECISION,
            units: ExportUnits::Meters,
        }
    }

    /// Set coordinate precision
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Set export units
    #[must_use]
    pub const fn with_units(mut self, units: ExportUnits) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub const fn precision(&self) -> usize {
        self.precision
    }

    #[must_use]
    pub const fn units(&self) -> ExportUnits {
        self.units
    }

    /// Render the dictionary. Every reference is checked first.
    pub fn render(&self, topology: &MeshTopology) -> MeshResult<String> {
        topology.validate()?;
        if topology.blocks().is_empty() {
            return Err(MeshError::export_error("topology has no blocks"));
        }

        let mut out = String::new();
        self.write_dict(topology, &mut out)
            .map_err(|e| MeshError::export_error(format!("failed to format blockMeshDict: {e}")))?;
        Ok(out)
    }

    /// Render and write the dictionary to `path`.
    pub fn export<P: AsRef<Path>>(&self, topology: &MeshTopology, path: P) -> MeshResult<PathBuf> {
        let content = self.render(topology)?;
        let path = path.as_ref();
        write_atomically(path, &content)?;
        log::info!(
            "Exported blockMeshDict with {} vertices, {} blocks, {} edges to {}",
            topology.points().len(),
            topology.blocks().len(),
            topology.edges().len(),
            path.display()
        );
        Ok(path.to_path_buf())
    }

    fn write_dict(&self, topology: &MeshTopology, out: &mut String) -> fmt::Result {
        // OpenFOAM header
        writeln!(out, "FoamFile")?;
        writeln!(out, "{{")?;
        writeln!(out, "    version     2.0;")?;
        writeln!(out, "    format      ascii;")?;
        writeln!(out, "    class       dictionary;")?;
        writeln!(out, "    object      blockMeshDict;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "convertToMeters {};", self.units.convert_to_meters())?;
        writeln!(out)?;

        writeln!(out, "vertices")?;
        writeln!(out, "(")?;
        for (index, point) in topology.points().iter().enumerate() {
            writeln!(
                out,
                "    {} // {} {}",
                self.vector(&point.position),
                index,
                point.name()
            )?;
        }
        writeln!(out, ");")?;
        writeln!(out)?;

        writeln!(out, "edges")?;
        writeln!(out, "(")?;
        for edge in topology.edges() {
            let (start, end) = (index_of(topology, edge.start), index_of(topology, edge.end));
            match &edge.shape {
                EdgeShape::Arc { midpoint } => {
                    writeln!(
                        out,
                        "    arc {start} {end} {} // {} {}",
                        self.vector(midpoint),
                        edge.start,
                        edge.end
                    )?;
                }
                EdgeShape::Spline { points } => {
                    writeln!(out, "    spline {start} {end} // {} {}", edge.start, edge.end)?;
                    writeln!(out, "    (")?;
                    for point in points {
                        writeln!(out, "        {}", self.vector(point))?;
                    }
                    writeln!(out, "    )")?;
                }
            }
        }
        writeln!(out, ");")?;
        writeln!(out)?;

        writeln!(out, "blocks")?;
        writeln!(out, "(")?;
        for block in topology.blocks() {
            let corners: Vec<String> = block
                .vertices
                .iter()
                .map(|key| index_of(topology, *key).to_string())
                .collect();
            writeln!(
                out,
                "    hex ({}) {} ({} {} {}) simpleGrading ({} {} {})",
                corners.join(" "),
                block.name(),
                block.cells.nx,
                block.cells.ny,
                block.cells.nz,
                block.grading.x,
                block.grading.y,
                block.grading.z
            )?;
        }
        writeln!(out, ");")?;
        writeln!(out)?;

        writeln!(out, "boundary")?;
        writeln!(out, "(")?;
        for patch in topology.patches() {
            writeln!(out, "    {}", patch.name)?;
            writeln!(out, "    {{")?;
            writeln!(out, "        type {};", patch.patch_type)?;
            writeln!(out, "        faces")?;
            writeln!(out, "        (")?;
            for face in &patch.faces {
                let Some(block) = topology.block(face.block) else {
                    return Err(fmt::Error);
                };
                let corners: Vec<String> = block
                    .face(face.direction)
                    .iter()
                    .map(|key| index_of(topology, *key).to_string())
                    .collect();
                writeln!(
                    out,
                    "            ({}) // {} {}",
                    corners.join(" "),
                    block.name(),
                    face.direction.symbol()
                )?;
            }
            writeln!(out, "        );")?;
            writeln!(out, "    }}")?;
        }
        writeln!(out, ");")?;
        writeln!(out)?;

        writeln!(out, "mergePatchPairs")?;
        writeln!(out, "(")?;
        writeln!(out, ");")?;
        Ok(())
    }

    /// `(x y z)` in the export unit, rounded to the configured precision.
    fn vector(&self, point: &Point3<f64>) -> String {
        let scale = self.units.scale_factor();
        format!(
            "({} {} {})",
            self.coordinate(point.x * scale),
            self.coordinate(point.y * scale),
            self.coordinate(point.z * scale)
        )
    }

    fn coordinate(&self, value: f64) -> String {
        let text = format!("{:.precision$}", value, precision = self.precision);
        // "-0.0000" for tiny negatives
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text[1..].to_string()
        } else {
            text
        }
    }
}

impl Default for BlockMeshDictExporter {
    fn default() -> Self {
        Self::new()
    }
}

// Only called after `validate`, so every key is declared.
fn index_of(topology: &MeshTopology, key: crate::naming::VertexKey) -> usize {
    topology.vertex_index(key).unwrap_or_default()
}

/// Write the 2D control points and spline segments as pretty JSON.
pub fn export_contour_json<P: AsRef<Path>>(contour: &Contour, path: P) -> MeshResult<PathBuf> {
    let content = serde_json::to_string_pretty(contour)?;
    let path = path.as_ref();
    write_atomically(path, &content)?;
    log::info!(
        "Dumped {} contour points and {} segments to {}",
        contour.points().count(),
        contour.segments().len(),
        path.display()
    );
    Ok(path.to_path_buf())
}

/// Write `content` next to `path` and rename it into place.
fn write_atomically(path: &Path, content: &str) -> MeshResult<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| MeshError::export_error(format!("{} is not a file path", path.display())))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            MeshError::export_error(format!("failed to create directory {}: {e}", parent.display()))
        })?;
    }

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(MeshError::export_error(format!(
            "failed to write {}: {e}",
            tmp.display()
        )));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(MeshError::export_error(format!(
            "failed to move {} into place: {e}",
            path.display()
        )));
    }
    Ok(())
}
