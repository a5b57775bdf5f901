//! Contour point generation
//!
//! Computes the named control points of the far-field boundary and of the
//! capsule surface for the top half of the domain, then mirrors them about
//! the x-axis to obtain the bottom half.
//!
//! The stages are explicit types, each consuming the previous one:
//!
//! ```text
//! FarField::compute -> with_splines -> with_body -> mirrored -> Contour
//! ```
//!
//! Every length is a constant calibrated at the reference diameter of 0.4
//! and scaled by `diameter / 0.4`.

use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::Serialize;

use crate::defaults::{
    DOMAIN_NEG_X, DOMAIN_POS_X, DOMAIN_POS_Z, INLET_ANGLE_12, INLET_ANGLE_2, OUTLET_ANGLE_4,
    OUTLET_ANGLE_45, OUTLET_ANGLE_5, OUTLET_ANGLE_56, REFERENCE_DIAMETER,
};
use crate::error::{ensure_positive, MeshError, MeshResult};
use crate::geometry::{circle, fit_spline, linspace};
use crate::naming::{ContourKey, Layer, RingPosition};

use RingPosition::{Midway, Origin, Station};

/// Capsule surface at the reference diameter, `(position, x, z)`.
///
/// Leading-edge radius from station 1 through the auxiliary point to station
/// 2, shoulder at 3, maximum diameter at 4, trailing edge at 5 and 6.
const BODY_SHAPE: [(RingPosition, f64, f64); 7] = [
    (Station(1), -0.120, 0.0),
    (Midway(1), -0.107938, 0.068404),
    (Station(2), -0.080, 0.120),
    (Station(3), -0.040, 0.160),
    (Station(4), 0.0, 0.200),
    (Station(5), 0.080, 0.120),
    (Station(6), 0.080, 0.0),
];

type PointMap = BTreeMap<ContourKey, Point2<f64>>;

fn insert_unique(points: &mut PointMap, key: ContourKey, point: Point2<f64>) -> MeshResult<()> {
    if points.insert(key, point).is_some() {
        return Err(MeshError::topology_inconsistency(format!(
            "contour point `{key}` generated twice"
        )));
    }
    Ok(())
}

/// Ordered far-field points approximating a spline edge between two stations.
///
/// The first and last samples are the bracketing control points and the
/// samples are monotonic in x.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourSegment {
    pub from: RingPosition,
    pub to: RingPosition,
    pub points: Vec<Point2<f64>>,
}

impl ContourSegment {
    /// Whether the segment joins `a` and `b`, in either direction.
    #[must_use]
    pub fn joins(&self, a: RingPosition, b: RingPosition) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Mirror image across the x-axis, `None` if an endpoint lies on the axis.
    #[must_use]
    pub fn mirrored(&self) -> Option<Self> {
        Some(Self {
            from: self.from.mirrored()?,
            to: self.to.mirrored()?,
            points: self.points.iter().map(|p| Point2::new(p.x, -p.y)).collect(),
        })
    }
}

/// Far-field control points of the top half.
#[derive(Debug, Clone)]
pub struct FarField {
    diameter: f64,
    spline_samples: usize,
    points: PointMap,
}

impl FarField {
    /// Axis points and circle samples of the far-field boundary.
    ///
    /// The inlet arc is centred on the trailing far-field point and passes
    /// through the leading one; the outlet arc is centred on the origin.
    pub fn compute(diameter: f64, spline_samples: usize) -> MeshResult<Self> {
        let diameter = ensure_positive("diameter", diameter)?;
        if spline_samples < 2 {
            return Err(MeshError::invalid_parameter(
                "spline_samples",
                format!("a spline needs at least 2 samples, got {spline_samples}"),
            ));
        }
        let ratio = diameter / REFERENCE_DIAMETER;

        let origin = Point2::new(0.0, 0.0);
        let leading = Point2::new(DOMAIN_NEG_X * ratio, 0.0);
        let top = Point2::new(0.0, DOMAIN_POS_Z * ratio);
        let trailing = Point2::new(DOMAIN_POS_X * ratio, 0.0);

        let inlet_radius = (DOMAIN_POS_X - DOMAIN_NEG_X) * ratio;
        let outlet_radius = DOMAIN_POS_X * ratio;

        let samples = [
            (Origin, origin),
            (Station(1), leading),
            (Midway(1), circle(trailing.x, trailing.y, inlet_radius, INLET_ANGLE_12)),
            (Station(2), circle(trailing.x, trailing.y, inlet_radius, INLET_ANGLE_2)),
            (Station(3), top),
            (Station(4), circle(origin.x, origin.y, outlet_radius, OUTLET_ANGLE_4)),
            (Midway(4), circle(origin.x, origin.y, outlet_radius, OUTLET_ANGLE_45)),
            (Station(5), circle(origin.x, origin.y, outlet_radius, OUTLET_ANGLE_5)),
            (Midway(5), circle(origin.x, origin.y, outlet_radius, OUTLET_ANGLE_56)),
            (Station(6), trailing),
        ];

        let mut points = PointMap::new();
        for (position, point) in samples {
            insert_unique(&mut points, ContourKey::far_field(position), point)?;
        }
        log::debug!("far field: {} circle and axis points", points.len());

        Ok(Self {
            diameter,
            spline_samples,
            points,
        })
    }

    fn station(&self, k: u8) -> MeshResult<Point2<f64>> {
        let key = ContourKey::far_field(Station(k));
        self.points
            .get(&key)
            .copied()
            .ok_or_else(|| MeshError::dangling_reference("far-field spline", key))
    }

    /// Add the two transition splines that join the circular arcs to the top
    /// of the domain (stations 2 -> 3 and 4 -> 3).
    pub fn with_splines(self) -> MeshResult<FarFieldWithSplines> {
        let ratio = self.diameter / REFERENCE_DIAMETER;
        let inlet_radius = (DOMAIN_POS_X - DOMAIN_NEG_X) * ratio;
        let outlet_radius = DOMAIN_POS_X * ratio;

        let transitions = [
            (2, INLET_ANGLE_2, inlet_radius),
            (4, OUTLET_ANGLE_4, outlet_radius),
        ];

        let mut segments = Vec::with_capacity(transitions.len());
        for (from, angle, radius) in transitions {
            let start = self.station(from)?;
            let xs = linspace(start.x, 0.0, self.spline_samples);
            let zs = fit_spline(start.x, &xs, angle, radius, self.diameter, DOMAIN_POS_Z);
            segments.push(ContourSegment {
                from: Station(from),
                to: Station(3),
                points: xs.into_iter().zip(zs).map(|(x, z)| Point2::new(x, z)).collect(),
            });
        }
        log::debug!(
            "far field: {} spline segments of {} samples",
            segments.len(),
            self.spline_samples
        );

        Ok(FarFieldWithSplines {
            far_field: self,
            segments,
        })
    }
}

/// Far-field points plus the spline segments of the top half.
#[derive(Debug, Clone)]
pub struct FarFieldWithSplines {
    far_field: FarField,
    segments: Vec<ContourSegment>,
}

impl FarFieldWithSplines {
    /// Add the capsule surface points.
    pub fn with_body(self) -> MeshResult<HalfContour> {
        let ratio = self.far_field.diameter / REFERENCE_DIAMETER;
        let mut points = self.far_field.points;
        for (position, x, z) in BODY_SHAPE {
            insert_unique(&mut points, ContourKey::body(position), Point2::new(x * ratio, z * ratio))?;
        }

        Ok(HalfContour {
            diameter: self.far_field.diameter,
            points,
            segments: self.segments,
        })
    }
}

/// Complete top half of the contour.
#[derive(Debug, Clone)]
pub struct HalfContour {
    diameter: f64,
    points: PointMap,
    segments: Vec<ContourSegment>,
}

impl HalfContour {
    /// Derive the bottom half by mirroring every off-axis point and segment.
    ///
    /// A mirrored key that already exists means the ring numbering is broken
    /// and is reported as a topology inconsistency.
    pub fn mirrored(self) -> MeshResult<Contour> {
        let mut points = self.points.clone();
        for (key, point) in &self.points {
            if let Some(position) = key.position.mirrored() {
                let image = ContourKey { layer: key.layer, position };
                insert_unique(&mut points, image, Point2::new(point.x, -point.y))?;
            }
        }

        let mut segments = self.segments.clone();
        for segment in &self.segments {
            let image = segment.mirrored().ok_or_else(|| {
                MeshError::topology_inconsistency(format!(
                    "segment {} -> {} touches the symmetry axis",
                    segment.from, segment.to
                ))
            })?;
            if segments.iter().any(|s| s.joins(image.from, image.to)) {
                return Err(MeshError::topology_inconsistency(format!(
                    "segment {} -> {} generated twice",
                    image.from, image.to
                )));
            }
            segments.push(image);
        }

        log::debug!(
            "contour for diameter {}: {} points, {} spline segments",
            self.diameter,
            points.len(),
            segments.len()
        );

        Ok(Contour {
            diameter: self.diameter,
            points,
            segments,
        })
    }
}

/// Full ring of contour points, immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Contour {
    diameter: f64,
    #[serde(serialize_with = "serialize_points")]
    points: PointMap,
    segments: Vec<ContourSegment>,
}

fn serialize_points<S: serde::Serializer>(points: &PointMap, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(points.len()))?;
    for (key, point) in points {
        map.serialize_entry(&key.to_string(), &[point.x, point.y])?;
    }
    map.end()
}

impl Contour {
    /// Run every stage for a body of the given diameter.
    pub fn generate(diameter: f64, spline_samples: usize) -> MeshResult<Self> {
        FarField::compute(diameter, spline_samples)?
            .with_splines()?
            .with_body()?
            .mirrored()
    }

    #[must_use]
    pub const fn diameter(&self) -> f64 {
        self.diameter
    }

    #[must_use]
    pub fn point(&self, key: ContourKey) -> Option<Point2<f64>> {
        self.points.get(&key).copied()
    }

    /// Look up a point that must exist.
    pub fn require(&self, key: ContourKey) -> MeshResult<Point2<f64>> {
        self.point(key)
            .ok_or_else(|| MeshError::dangling_reference("contour", key))
    }

    #[must_use]
    pub fn contains(&self, key: ContourKey) -> bool {
        self.points.contains_key(&key)
    }

    pub fn points(&self) -> impl Iterator<Item = (ContourKey, Point2<f64>)> + '_ {
        self.points.iter().map(|(k, p)| (*k, *p))
    }

    /// Points of one layer.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = (RingPosition, Point2<f64>)> + '_ {
        self.points()
            .filter(move |(k, _)| k.layer == layer)
            .map(|(k, p)| (k.position, p))
    }

    #[must_use]
    pub fn segments(&self) -> &[ContourSegment] {
        &self.segments
    }

    /// Spline segment joining two far-field stations, in either direction.
    #[must_use]
    pub fn segment_between(&self, a: RingPosition, b: RingPosition) -> Option<&ContourSegment> {
        self.segments.iter().find(|s| s.joins(a, b))
    }
}
