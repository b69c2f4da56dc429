//! Delimited navigation text reader.
//!
//! Each data line holds one fix as delimiter-separated columns. The
//! default layout is the r2rnav one: `label<TAB>longitude<TAB>latitude`,
//! where the label is the fix timestamp. Lines starting with one of the
//! configured comment prefixes (`//`, `#` and `>` by default) and blank
//! lines are skipped.
//!
//! Longitudes east of 180 are wrapped into [-180, 180] by subtracting
//! 360 so that tracks recorded in [0, 360] simplify correctly.

use std::num::ParseFloatError;

use navcontrol_core::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Column layout and comment syntax of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Column separator. Matched literally.
    pub delimiter: String,

    /// Lines whose first non-blank characters match any of these are
    /// skipped.
    pub comment_prefixes: Vec<String>,

    /// Skip the first non-comment line, for files that carry a row of
    /// column names.
    pub skip_first_record: bool,

    /// Zero-based column holding the fix label.
    pub label_column: usize,

    /// Zero-based column holding the longitude.
    pub lon_column: usize,

    /// Zero-based column holding the latitude.
    pub lat_column: usize,
}

impl ReaderConfig {
    /// Default column separator: a tab.
    pub const DEFAULT_DELIMITER: &'static str = "\t";

    /// Default comment prefixes.
    pub const DEFAULT_COMMENT_PREFIXES: [&'static str; 3] = ["//", "#", ">"];

    /// Default zero-based longitude column.
    pub const DEFAULT_LON_COLUMN: usize = 1;

    /// Default zero-based latitude column.
    pub const DEFAULT_LAT_COLUMN: usize = 2;

    /// Check the configuration before use.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::EmptyDelimiter`] for an empty delimiter and
    /// [`FormatError::ColumnCollision`] if longitude and latitude are read
    /// from the same column.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.delimiter.is_empty() {
            return Err(FormatError::EmptyDelimiter);
        }
        if self.lon_column == self.lat_column {
            return Err(FormatError::ColumnCollision(self.lon_column));
        }
        Ok(())
    }

    fn is_comment(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.comment_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && line.starts_with(prefix.as_str()))
    }

    /// Number of columns a data line must have.
    fn required_columns(&self) -> usize {
        self.label_column
            .max(self.lon_column)
            .max(self.lat_column)
            .saturating_add(1)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: Self::DEFAULT_DELIMITER.to_string(),
            comment_prefixes: Self::DEFAULT_COMMENT_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            skip_first_record: false,
            label_column: 0,
            lon_column: Self::DEFAULT_LON_COLUMN,
            lat_column: Self::DEFAULT_LAT_COLUMN,
        }
    }
}

/// Errors raised while reading navigation text.
///
/// Line numbers are one-based and count every line of the input,
/// comments included. Column numbers are zero-based, as configured.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The configured delimiter is empty.
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    /// Longitude and latitude point at the same column.
    #[error("longitude and latitude are both read from column {0}")]
    ColumnCollision(usize),

    /// A data line has fewer columns than the layout needs.
    #[error("line {line}: expected at least {expected} columns, found {found} (check the delimiter)")]
    MissingColumns {
        /// One-based line number.
        line: usize,
        /// Columns required by the layout.
        expected: usize,
        /// Columns present on the line.
        found: usize,
    },

    /// A coordinate column does not hold a number.
    #[error("line {line}, column {column}: invalid coordinate {value:?}")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// Zero-based column index.
        column: usize,
        /// The offending text.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: ParseFloatError,
    },

    /// A coordinate parsed to NaN or infinity.
    #[error("line {line}, column {column}: coordinate {value} is not finite")]
    NonFinite {
        /// One-based line number.
        line: usize,
        /// Zero-based column index.
        column: usize,
        /// The parsed value.
        value: f64,
    },
}

/// Wrap a longitude above 180 degrees into the western hemisphere.
///
/// Only values greater than 180 are shifted (by exactly -360); everything
/// else is returned unchanged.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 { lon - 360.0 } else { lon }
}

/// Parse navigation text into labeled points, in file order.
///
/// Duplicate fixes are kept; duplicate suppression belongs to the
/// coordinate sequence the points are loaded into.
///
/// # Errors
///
/// Returns a [`FormatError`] for an invalid configuration or the first
/// malformed data line.
pub fn parse_points(text: &str, config: &ReaderConfig) -> Result<Vec<Point>, FormatError> {
    config.validate()?;

    let required = config.required_columns();
    let mut points = Vec::new();
    let mut skip_pending = config.skip_first_record;
    let mut comment_lines = 0_usize;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() {
            continue;
        }
        if config.is_comment(line) {
            comment_lines += 1;
            continue;
        }
        if skip_pending {
            skip_pending = false;
            continue;
        }

        let fields: Vec<&str> = line
            .split(config.delimiter.as_str())
            .map(str::trim)
            .collect();
        if fields.len() < required {
            return Err(FormatError::MissingColumns {
                line: line_number,
                expected: required,
                found: fields.len(),
            });
        }

        let lon = parse_coordinate(fields[config.lon_column], line_number, config.lon_column)?;
        let lat = parse_coordinate(fields[config.lat_column], line_number, config.lat_column)?;
        points.push(Point::labeled(
            fields[config.label_column],
            normalize_longitude(lon),
            lat,
        ));
    }

    debug!(
        records = points.len(),
        comment_lines, "parsed navigation records"
    );
    Ok(points)
}

fn parse_coordinate(field: &str, line: usize, column: usize) -> Result<f64, FormatError> {
    let value: f64 = field.parse().map_err(|source| FormatError::InvalidNumber {
        line,
        column,
        value: field.to_string(),
        source,
    })?;
    if !value.is_finite() {
        return Err(FormatError::NonFinite {
            line,
            column,
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn coords(points: &[Point]) -> Vec<(f64, f64)> {
        points.iter().map(|p| (p.x, p.y)).collect()
    }

    // --- config ---

    #[test]
    fn default_layout_is_r2rnav() {
        let config = ReaderConfig::default();
        assert_eq!(config.delimiter, "\t");
        assert_eq!(config.comment_prefixes, vec!["//", "#", ">"]);
        assert!(!config.skip_first_record);
        assert_eq!(
            (config.label_column, config.lon_column, config.lat_column),
            (0, 1, 2)
        );
    }

    #[test]
    fn config_partial_json_fills_defaults() {
        let config: ReaderConfig = serde_json::from_str(r#"{"delimiter":","}"#).unwrap();
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.lat_column, ReaderConfig::DEFAULT_LAT_COLUMN);
    }

    #[test]
    fn empty_delimiter_rejected() {
        let config = ReaderConfig {
            delimiter: String::new(),
            ..ReaderConfig::default()
        };
        assert!(matches!(
            parse_points("a\t1\t2", &config),
            Err(FormatError::EmptyDelimiter)
        ));
    }

    #[test]
    fn same_lon_lat_column_rejected() {
        let config = ReaderConfig {
            lat_column: 1,
            ..ReaderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FormatError::ColumnCollision(1))
        ));
    }

    // --- parsing ---

    #[test]
    fn parses_tab_separated_records() {
        let text = "2014-01-01T00:00:00Z\t-117.2345\t32.7140\n\
                    2014-01-01T00:01:00Z\t-117.2350\t32.7150\n";
        let points = parse_points(text, &ReaderConfig::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label.as_deref(), Some("2014-01-01T00:00:00Z"));
        assert_eq!(coords(&points), vec![(-117.2345, 32.714), (-117.235, 32.715)]);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "// Datetime [UTC], Longitude [deg], Latitude [deg]\n\
                    # generated\n\
                    > block marker\n\
                    \n\
                    t0\t1.0\t2.0\n\
                    \x20\x20// indented comment\n\
                    t1\t3.0\t4.0\n";
        let points = parse_points(text, &ReaderConfig::default()).unwrap();
        assert_eq!(coords(&points), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let text = "t0\t1.0\t2.0\r\nt1\t3.0\t4.0\r\n";
        let points = parse_points(text, &ReaderConfig::default()).unwrap();
        assert_eq!(coords(&points), vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn skip_first_record_drops_column_names() {
        let text = "// header\ntime,lon,lat\nt0,10.5,20.5\n";
        let config = ReaderConfig {
            delimiter: ",".to_string(),
            skip_first_record: true,
            ..ReaderConfig::default()
        };
        let points = parse_points(text, &config).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label.as_deref(), Some("t0"));
    }

    #[test]
    fn custom_column_order() {
        let text = "42.0;-70.5;fix-a;extra\n";
        let config = ReaderConfig {
            delimiter: ";".to_string(),
            label_column: 2,
            lon_column: 1,
            lat_column: 0,
            ..ReaderConfig::default()
        };
        let points = parse_points(text, &config).unwrap();
        assert_eq!(coords(&points), vec![(-70.5, 42.0)]);
        assert_eq!(points[0].label.as_deref(), Some("fix-a"));
    }

    #[test]
    fn trims_whitespace_around_fields() {
        let text = "t0 ,  1.5 , 2.5 \n";
        let config = ReaderConfig {
            delimiter: ",".to_string(),
            ..ReaderConfig::default()
        };
        let points = parse_points(text, &config).unwrap();
        assert_eq!(points[0].label.as_deref(), Some("t0"));
        assert_eq!(coords(&points), vec![(1.5, 2.5)]);
    }

    #[test]
    fn keeps_duplicate_fixes() {
        let text = "t0\t1.0\t1.0\nt1\t1.0\t1.0\n";
        let points = parse_points(text, &ReaderConfig::default()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn wraps_eastern_longitudes() {
        let text = "t0\t190.0\t10.0\nt1\t180.0\t10.0\nt2\t359.5\t10.0\n";
        let points = parse_points(text, &ReaderConfig::default()).unwrap();
        assert_eq!(
            coords(&points),
            vec![(-170.0, 10.0), (180.0, 10.0), (-0.5, 10.0)]
        );
    }

    #[test]
    fn normalize_longitude_leaves_range_untouched() {
        assert!((normalize_longitude(-180.0) + 180.0).abs() < f64::EPSILON);
        assert!((normalize_longitude(180.0) - 180.0).abs() < f64::EPSILON);
        assert!((normalize_longitude(180.5) + 179.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_text_yields_no_points() {
        let points = parse_points("", &ReaderConfig::default()).unwrap();
        assert!(points.is_empty());
    }

    // --- errors ---

    #[test]
    fn wrong_delimiter_reports_missing_columns() {
        let text = "// header\nt0,1.0,2.0\n";
        let err = parse_points(text, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingColumns {
                line: 2,
                expected: 3,
                found: 1,
            }
        ));
        assert!(err.to_string().contains("check the delimiter"));
    }

    #[test]
    fn invalid_number_reports_position() {
        let text = "t0\t1.0\t2.0\nt1\tabc\t2.0\n";
        let err = parse_points(text, &ReaderConfig::default()).unwrap_err();
        match err {
            FormatError::InvalidNumber {
                line,
                column,
                ref value,
                ..
            } => {
                assert_eq!((line, column), (2, 1));
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        let text = "t0\t1.0\tNaN\n";
        let err = parse_points(text, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            FormatError::NonFinite {
                line: 1,
                column: 2,
                ..
            }
        ));
    }
}
