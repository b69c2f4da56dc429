//! navcontrol-core: navigation track simplification (sans-IO).
//!
//! Reduces an ordered track of navigation fixes to a small set of control
//! points through:
//! load (duplicate suppression, optional ring closing) ->
//! Douglas-Peucker simplification.
//!
//! This crate has **no I/O dependencies**. Parsing and serializing the
//! text formats lives in `navcontrol-format`; files and arguments are
//! handled by the `navcontrol` binary.

pub mod diagnostics;
pub mod sequence;
pub mod simplify;
pub mod types;

pub use diagnostics::{SimplifyDiagnostics, simplify_with_diagnostics};
pub use sequence::CoordinateSequence;
pub use simplify::{LineSimplifier, simplify};
pub use types::{NavError, Point, SimplifyConfig};

/// Load a track and simplify it.
///
/// Takes the fixes in track order and a configuration, then produces
/// the retained fixes in the same order.
///
/// # Steps
///
/// 1. Load into a [`CoordinateSequence`], dropping consecutive duplicates
///    unless `config.allow_repeated` is set
/// 2. Optionally close the sequence into a ring
/// 3. Douglas-Peucker simplification with `config.distance_tolerance`
///
/// # Errors
///
/// Returns [`NavError::InvalidArgument`] if the tolerance is negative or
/// NaN.
pub fn process(points: Vec<Point>, config: &SimplifyConfig) -> Result<CoordinateSequence, NavError> {
    config.validate()?;

    let mut sequence = CoordinateSequence::from_points(points, config.allow_repeated);
    if config.close_ring {
        sequence.close();
    }

    Ok(LineSimplifier::new(sequence.points(), config.distance_tolerance)?.simplify())
}
