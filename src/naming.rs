//! Typed point keys
//!
//! Points are identified by where they sit on the ring rather than by
//! ad hoc strings. A key renders to the legacy `blockMeshDict` name through
//! `Display` (`v2f`, `c12b`, `e45`, ...), and the mapping is injective.
//!
//! The ring has ten stations. Station 1 is the leading-edge point on the
//! axis, stations 2..=5 run over the top half, station 6 is the
//! trailing-edge point on the axis and stations 7..=10 run back over the
//! bottom half.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of stations around the ring.
pub const RING_STATIONS: u8 = 10;
/// Station on the axis in front of the body.
pub const LEADING_STATION: u8 = 1;
/// Station on the axis behind the body.
pub const TRAILING_STATION: u8 = 6;

/// Station following `station` around the ring (10 wraps to 1).
#[must_use]
pub const fn next_station(station: u8) -> u8 {
    station % RING_STATIONS + 1
}

/// Which contour a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Outer boundary of the domain
    FarField,
    /// Surface of the capsule
    Body,
}

impl Layer {
    /// Prefix used for 2D contour names.
    #[must_use]
    pub const fn contour_prefix(self) -> char {
        match self {
            Self::FarField => 'e',
            Self::Body => 'c',
        }
    }

    /// Prefix used for extruded vertex names.
    #[must_use]
    pub const fn vertex_prefix(self) -> char {
        match self {
            Self::FarField => 'v',
            Self::Body => 'c',
        }
    }
}

/// Copy of a point across the thin extrusion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Front, Self::Back];

    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Front => 'f',
            Self::Back => 'b',
        }
    }

    /// Extrusion coordinate for a slab of half-thickness `half_thickness`.
    #[must_use]
    pub fn y(self, half_thickness: f64) -> f64 {
        match self {
            Self::Front => half_thickness,
            Self::Back => -half_thickness,
        }
    }
}

/// Position of a point around the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RingPosition {
    /// Centre of the outlet circle
    Origin,
    /// Block corner station, 1..=10
    Station(u8),
    /// Arc midpoint between station `k` and the next station
    Midway(u8),
}

impl RingPosition {
    /// Whether the position lies on the symmetry axis.
    #[must_use]
    pub const fn on_axis(self) -> bool {
        matches!(
            self,
            Self::Origin | Self::Station(LEADING_STATION) | Self::Station(TRAILING_STATION)
        )
    }

    /// Mirror image across the symmetry axis, `None` for on-axis positions.
    ///
    /// Station `k` maps to `12 - k`; the midpoint after station `k` maps to
    /// the midpoint after station `11 - k`.
    #[must_use]
    pub const fn mirrored(self) -> Option<Self> {
        if self.on_axis() {
            return None;
        }
        match self {
            Self::Station(k) => Some(Self::Station(RING_STATIONS + 2 - k)),
            Self::Midway(k) => Some(Self::Midway(RING_STATIONS + 1 - k)),
            Self::Origin => None,
        }
    }
}

impl fmt::Display for RingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "0"),
            Self::Station(k) => write!(f, "{k}"),
            // Midpoints keep the unwrapped neighbour number: 10 -> "1011".
            Self::Midway(k) => write!(f, "{}{}", k, k + 1),
        }
    }
}

/// Key of a 2D contour point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContourKey {
    pub layer: Layer,
    pub position: RingPosition,
}

impl ContourKey {
    #[must_use]
    pub const fn far_field(position: RingPosition) -> Self {
        Self { layer: Layer::FarField, position }
    }

    #[must_use]
    pub const fn body(position: RingPosition) -> Self {
        Self { layer: Layer::Body, position }
    }

    /// Extruded vertex for this contour point.
    #[must_use]
    pub const fn on(self, side: Side) -> VertexKey {
        VertexKey { layer: self.layer, position: self.position, side }
    }
}

impl fmt::Display for ContourKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.layer.contour_prefix(), self.position)
    }
}

/// Key of an extruded mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexKey {
    pub layer: Layer,
    pub position: RingPosition,
    pub side: Side,
}

impl VertexKey {
    #[must_use]
    pub const fn far_field(station: u8, side: Side) -> Self {
        Self { layer: Layer::FarField, position: RingPosition::Station(station), side }
    }

    #[must_use]
    pub const fn body(station: u8, side: Side) -> Self {
        Self { layer: Layer::Body, position: RingPosition::Station(station), side }
    }

    /// Contour point this vertex was extruded from.
    #[must_use]
    pub const fn contour(self) -> ContourKey {
        ContourKey { layer: self.layer, position: self.position }
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.layer.vertex_prefix(),
            self.position,
            self.side.suffix()
        )
    }
}
