//! Quadrant rotations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A page rotation, clockwise as displayed, restricted to the four quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Rotation {
    /// Upright
    #[default]
    Deg0,
    /// Quarter turn clockwise
    Deg90,
    /// Upside down
    Deg180,
    /// Quarter turn counter-clockwise
    Deg270,
}

impl Rotation {
    /// All four quadrants in ascending order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Normalize an arbitrary angle to the nearest quadrant.
    ///
    /// See [`normalize_rotation`].
    pub fn from_degrees(deg: i64) -> Self {
        normalize_rotation(deg)
    }

    /// Rotation in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether the page is displayed on its side (width and height swap).
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Add a relative rotation, staying within the four quadrants.
    pub fn compose(self, delta_deg: i64) -> Self {
        compose_rotation(i64::from(self.degrees()), delta_deg)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl From<i64> for Rotation {
    fn from(deg: i64) -> Self {
        normalize_rotation(deg)
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        i64::from(rotation.degrees())
    }
}

/// Reduce any angle (negative included) modulo 360 and snap it to the nearest
/// quadrant.
///
/// Angles exactly half-way between two quadrants (45, 135, 225, 315) snap to
/// the lower one.
///
/// ```
/// use folio::geometry::{normalize_rotation, Rotation};
///
/// assert_eq!(normalize_rotation(-90), Rotation::Deg270);
/// assert_eq!(normalize_rotation(45), Rotation::Deg0);
/// assert_eq!(normalize_rotation(46), Rotation::Deg90);
/// assert_eq!(normalize_rotation(720 + 180), Rotation::Deg180);
/// ```
pub fn normalize_rotation(deg: i64) -> Rotation {
    let reduced = deg.rem_euclid(360);
    // +44 makes exact half-way values fall to the lower quadrant.
    match ((reduced + 44) / 90) % 4 {
        0 => Rotation::Deg0,
        1 => Rotation::Deg90,
        2 => Rotation::Deg180,
        _ => Rotation::Deg270,
    }
}

/// Apply a relative rotation on top of an existing one.
pub fn compose_rotation(base_deg: i64, delta_deg: i64) -> Rotation {
    // Reduce separately so extreme inputs cannot overflow the sum.
    normalize_rotation(base_deg.rem_euclid(360) + delta_deg.rem_euclid(360))
}
