//! Shared types for the navcontrol simplification core.

use serde::{Deserialize, Serialize};

/// A navigation fix: a 2D point in geographic degrees, optionally labeled.
///
/// `x` is longitude and `y` is latitude. The `label` (typically the fix
/// timestamp) is carried through simplification untouched and never takes
/// part in distance or equality decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude in degrees, normalized to [-180, 180].
    pub x: f64,
    /// Latitude in degrees.
    pub y: f64,
    /// Elevation. Unused by any computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Opaque identity, round-tripped through simplification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Point {
    /// Create an unlabeled point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            label: None,
        }
    }

    /// Create a point carrying `label`.
    #[must_use]
    pub fn labeled(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            label: Some(label.into()),
        }
    }

    /// Returns `true` if both points have exactly the same `x` and `y`.
    ///
    /// `z` and `label` are ignored.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn equals_2d(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Squared Euclidean distance to another point in the (x, y) plane.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point in the (x, y) plane.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Parameters for one load-and-simplify run.
///
/// No `Default`: a usable tolerance depends on the units of the
/// coordinates, so callers always choose one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyConfig {
    /// Maximum perpendicular deviation of a discarded point, in the same
    /// units as the coordinates (degrees for navigation fixes).
    pub distance_tolerance: f64,

    /// Keep consecutive points with identical coordinates when loading.
    #[serde(default)]
    pub allow_repeated: bool,

    /// Append the first point after loading so the track forms a ring.
    #[serde(default)]
    pub close_ring: bool,
}

impl SimplifyConfig {
    /// Config with the given tolerance and all other options off.
    #[must_use]
    pub const fn new(distance_tolerance: f64) -> Self {
        Self {
            distance_tolerance,
            allow_repeated: false,
            close_ring: false,
        }
    }

    /// Check the configuration before use.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidArgument`] if `distance_tolerance` is
    /// negative or NaN.
    pub fn validate(&self) -> Result<(), NavError> {
        crate::simplify::validate_tolerance(self.distance_tolerance).map(|_| ())
    }
}

/// Errors raised by the coordinate sequence and the simplifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// An argument is outside its allowed domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An insertion index is past the end of the sequence.
    #[error("index {index} is out of bounds for a sequence of length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Length of the sequence at the time of the call.
        len: usize,
    },
}
