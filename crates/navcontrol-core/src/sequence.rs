//! An ordered list of points that can suppress consecutive duplicates.
//!
//! Every mutating method takes an `allow_repeated` flag. When it is
//! `false`, a point that is equal in (x, y) to its would-be neighbor is
//! silently dropped, so a sequence built exclusively with
//! `allow_repeated = false` never contains two consecutive coincident
//! points.

use serde::{Deserialize, Serialize};

use crate::types::{NavError, Point};

/// An ordered, growable sequence of [`Point`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSequence(Vec<Point>);

impl CoordinateSequence {
    /// Create an empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty sequence with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Create a sequence from `points`, in order.
    ///
    /// With `allow_repeated = false`, consecutive coincident points are
    /// collapsed to their first occurrence.
    #[must_use]
    pub fn from_points(points: Vec<Point>, allow_repeated: bool) -> Self {
        if allow_repeated {
            return Self(points);
        }
        let mut seq = Self::with_capacity(points.len());
        seq.bulk_load(points, false, true);
        seq
    }

    /// Returns the number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the sequence has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the point at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.0.get(index)
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Iterate over the points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }

    /// Consumes the sequence and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Returns a copy of the current points.
    ///
    /// The snapshot is independent: later mutations of either side are
    /// not visible to the other.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Point> {
        self.0.clone()
    }

    /// Returns `true` if the sequence is non-empty and its first and last
    /// points coincide in (x, y).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => first.equals_2d(last),
            _ => false,
        }
    }

    /// Append `point` to the end of the sequence.
    ///
    /// Returns `false` (and leaves the sequence untouched) when
    /// `allow_repeated` is `false` and `point` equals the current last
    /// point in (x, y).
    pub fn push(&mut self, point: Point, allow_repeated: bool) -> bool {
        if !allow_repeated && self.0.last().is_some_and(|last| last.equals_2d(&point)) {
            return false;
        }
        self.0.push(point);
        true
    }

    /// Insert `point` before `index`.
    ///
    /// When `allow_repeated` is `false`, the point is dropped (returning
    /// `Ok(false)`) if it equals either of its would-be neighbors: the
    /// point at `index - 1` or the point currently at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::IndexOutOfBounds`] if `index > len()`.
    pub fn insert(
        &mut self,
        index: usize,
        point: Point,
        allow_repeated: bool,
    ) -> Result<bool, NavError> {
        let len = self.0.len();
        if index > len {
            return Err(NavError::IndexOutOfBounds { index, len });
        }

        if !allow_repeated {
            let prev = index.checked_sub(1).and_then(|i| self.0.get(i));
            let next = self.0.get(index);
            if prev.is_some_and(|p| p.equals_2d(&point)) || next.is_some_and(|n| n.equals_2d(&point))
            {
                return Ok(false);
            }
        }

        self.0.insert(index, point);
        Ok(true)
    }

    /// Append every point of `points`, applying the duplicate rule of
    /// [`push`](Self::push) against the running last point.
    ///
    /// With `forward = false` the source is consumed back to front, which
    /// loads it reversed.
    ///
    /// Returns `true` whenever `points` was non-empty, even if every
    /// element turned out to be a duplicate. The return value reports that
    /// a load was attempted, not that the contents changed; compare
    /// [`len`](Self::len) before and after for the latter.
    pub fn bulk_load<I>(&mut self, points: I, allow_repeated: bool, forward: bool) -> bool
    where
        I: IntoIterator<Item = Point>,
        I::IntoIter: DoubleEndedIterator,
    {
        let iter = points.into_iter();
        let mut attempted = false;

        if forward {
            for point in iter {
                self.push(point, allow_repeated);
                attempted = true;
            }
        } else {
            for point in iter.rev() {
                self.push(point, allow_repeated);
                attempted = true;
            }
        }

        attempted
    }

    /// Close the sequence into a ring by appending a copy of the first
    /// point, unless the last point already equals it.
    ///
    /// No-op on an empty sequence. Calling it twice is the same as calling
    /// it once.
    pub fn close(&mut self) {
        if let Some(first) = self.0.first().cloned() {
            self.push(first, false);
        }
    }
}

impl From<CoordinateSequence> for Vec<Point> {
    fn from(seq: CoordinateSequence) -> Self {
        seq.0
    }
}

/// Collects points verbatim, duplicates included.
impl FromIterator<Point> for CoordinateSequence {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CoordinateSequence {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CoordinateSequence {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
