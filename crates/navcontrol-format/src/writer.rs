//! r2rnav control-point writer.
//!
//! Emits one fix per line as `label<DELIM>longitude<DELIM>latitude`,
//! preceded by `//` comment lines describing the columns and the run.
//! Readers of the format skip any line beginning with `//`, so the
//! output can be fed straight back into [`crate::parse_points`].
//!
//! Coordinates are written with the shortest representation that
//! round-trips to the same `f64`, so no precision is lost between runs.
//!
//! This is a pure function with no I/O; it returns a `String`.

use std::fmt::Write;

use navcontrol_core::Point;

/// Column description line of an r2rnav file.
pub const COLUMNS_LINE: &str = "Datetime [UTC], Longitude [deg], Latitude [deg]";

/// Pointer to the published format description.
pub const FORMAT_REFERENCE: &str =
    "More detailed information may be found here: http://get.rvdata.us/format/100002/format-r2rnav.txt";

/// Metadata to embed as `//`-prefixed comment lines at the top of the
/// output.
///
/// Optional fields emit their line only when present. Multi-line values
/// produce one comment line per input line.
#[derive(Debug, Clone)]
pub struct NavMetadata<'a> {
    /// Emit any header at all. When `false` only records are written.
    pub header: bool,

    /// Input filename, emitted as `// Source: <name>`.
    pub source: Option<&'a str>,

    /// Free-form run description, emitted verbatim as `// <text>`.
    pub description: Option<&'a str>,

    /// Creation timestamp, emitted as `// Creation date: <timestamp>`.
    pub created: Option<&'a str>,
}

impl Default for NavMetadata<'_> {
    fn default() -> Self {
        Self {
            header: true,
            source: None,
            description: None,
            created: None,
        }
    }
}

/// Serialize fixes into r2rnav text.
///
/// Fixes without a label are written with an empty first column.
///
/// # Examples
///
/// ```
/// use navcontrol_core::Point;
/// use navcontrol_format::{NavMetadata, to_r2rnav};
///
/// let points = vec![Point::labeled("2014-01-01T00:00:00Z", -117.25, 32.5)];
/// let text = to_r2rnav(&points, "\t", &NavMetadata::default());
/// assert!(text.starts_with("// Datetime [UTC]"));
/// assert!(text.ends_with("2014-01-01T00:00:00Z\t-117.25\t32.5\n"));
/// ```
#[must_use]
pub fn to_r2rnav(points: &[Point], delimiter: &str, metadata: &NavMetadata<'_>) -> String {
    let mut out = String::new();

    // --- Header ---
    if metadata.header {
        let _ = writeln!(out, "// {COLUMNS_LINE}");
        let _ = writeln!(out, "// {FORMAT_REFERENCE}");
        if let Some(source) = metadata.source {
            for line in source.lines() {
                let _ = writeln!(out, "// Source: {line}");
            }
        }
        if let Some(description) = metadata.description {
            for line in description.lines() {
                let _ = writeln!(out, "// {line}");
            }
        }
        if let Some(created) = metadata.created {
            for line in created.lines() {
                let _ = writeln!(out, "// Creation date: {line}");
            }
        }
    }

    // --- Records ---
    for point in points {
        let label = point.label.as_deref().unwrap_or_default();
        let _ = writeln!(out, "{label}{delimiter}{:?}{delimiter}{:?}", point.x, point.y);
    }

    out
}
