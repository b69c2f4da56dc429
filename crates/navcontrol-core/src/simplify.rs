//! Track simplification using the Douglas-Peucker algorithm.
//!
//! Reduces a navigation track to the subsequence of fixes needed to keep
//! every discarded fix within a perpendicular distance tolerance of the
//! simplified line. Output points are always selected from the input,
//! never synthesized, so labels survive unchanged.
//!
//! The divide-and-conquer step is driven by an explicit stack of index
//! ranges rather than recursion. The stack holds at most one range per
//! retained point, so memory is O(n) and the call stack stays flat for
//! any input. Running time is O(n log n) for
//! typical tracks and O(n^2) in the worst case; callers that need a hard
//! bound should cap the input size.

use tracing::{debug, trace};

use crate::sequence::CoordinateSequence;
use crate::types::{NavError, Point};

/// Douglas-Peucker simplifier over a borrowed point slice.
///
/// The tolerance has no default. It is expressed in the same units as
/// the point coordinates, and a suitable value depends on them.
#[derive(Debug, Clone)]
pub struct LineSimplifier<'a> {
    points: &'a [Point],
    distance_tolerance: f64,
}

impl<'a> LineSimplifier<'a> {
    /// Create a simplifier for `points`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidArgument`] if `distance_tolerance` is
    /// negative or NaN.
    pub fn new(points: &'a [Point], distance_tolerance: f64) -> Result<Self, NavError> {
        Ok(Self {
            points,
            distance_tolerance: validate_tolerance(distance_tolerance)?,
        })
    }

    /// The current distance tolerance.
    #[must_use]
    pub const fn distance_tolerance(&self) -> f64 {
        self.distance_tolerance
    }

    /// Replace the distance tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvalidArgument`] if `distance_tolerance` is
    /// negative or NaN. The previous tolerance is kept in that case.
    pub fn set_distance_tolerance(&mut self, distance_tolerance: f64) -> Result<(), NavError> {
        self.distance_tolerance = validate_tolerance(distance_tolerance)?;
        Ok(())
    }

    /// Indices of the input points retained by simplification, ascending.
    ///
    /// For a non-empty input the first and last indices are always
    /// present. Inputs with two or fewer points keep every index.
    #[must_use]
    pub fn simplify_indices(&self) -> Vec<usize> {
        let points = self.points;
        let n = points.len();
        if n <= 2 {
            return (0..n).collect();
        }

        let mut kept = vec![false; n];
        kept[0] = true;
        kept[n - 1] = true;

        let mut ranges = vec![(0, n - 1)];
        while let Some((first, last)) = ranges.pop() {
            let Some((farthest, max_distance)) = farthest_point(points, first, last) else {
                continue;
            };

            if max_distance > self.distance_tolerance {
                trace!(first, last, farthest, max_distance, "splitting range");
                kept[farthest] = true;
                // Pushed right-first so the left half is split first; the
                // result does not depend on the order.
                ranges.push((farthest, last));
                ranges.push((first, farthest));
            }
        }

        kept.iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect()
    }

    /// Run the simplification and return the retained points in order.
    #[must_use = "returns the simplified sequence"]
    pub fn simplify(&self) -> CoordinateSequence {
        let indices = self.simplify_indices();
        debug!(
            input = self.points.len(),
            output = indices.len(),
            tolerance = self.distance_tolerance,
            "simplified track"
        );
        indices.iter().map(|&i| self.points[i].clone()).collect()
    }
}

/// Simplify `points` with the given tolerance.
///
/// Shorthand for [`LineSimplifier::new`] followed by
/// [`LineSimplifier::simplify`].
///
/// # Errors
///
/// Returns [`NavError::InvalidArgument`] if `distance_tolerance` is
/// negative or NaN.
pub fn simplify(points: &[Point], distance_tolerance: f64) -> Result<CoordinateSequence, NavError> {
    Ok(LineSimplifier::new(points, distance_tolerance)?.simplify())
}

/// Accept non-negative tolerances (including `+inf`), reject the rest.
pub(crate) fn validate_tolerance(distance_tolerance: f64) -> Result<f64, NavError> {
    if distance_tolerance.is_nan() {
        return Err(NavError::InvalidArgument(
            "distance tolerance must be a number".to_string(),
        ));
    }
    if distance_tolerance < 0.0 {
        return Err(NavError::InvalidArgument(format!(
            "distance tolerance must be non-negative, got {distance_tolerance}"
        )));
    }
    Ok(distance_tolerance)
}

/// The intermediate point of `(first, last)` farthest from the line
/// through `points[first]` and `points[last]`, with its distance.
///
/// Ties keep the lowest index. Points whose distance is NaN are never
/// selected over a finite one. Returns `None` when the range has no
/// intermediate points.
fn farthest_point(points: &[Point], first: usize, last: usize) -> Option<(usize, f64)> {
    if last <= first + 1 {
        return None;
    }

    let a = &points[first];
    let b = &points[last];

    let mut max_distance = 0.0;
    let mut farthest = first + 1;

    for (i, p) in points.iter().enumerate().take(last).skip(first + 1) {
        let d = perpendicular_distance(p, a, b);
        if d > max_distance {
            max_distance = d;
            farthest = i;
        }
    }

    Some((farthest, max_distance))
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
