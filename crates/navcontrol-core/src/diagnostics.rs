//! Run diagnostics: timing and point counts for each step.
//!
//! [`simplify_with_diagnostics`] performs the same work as
//! [`crate::process`] and additionally reports how many fixes each step
//! consumed and produced and how long it took. The CLI prints these as a
//! report or as JSON.
//!
//! Timestamps are captured via the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::sequence::CoordinateSequence;
use crate::simplify::LineSimplifier;
use crate::types::{NavError, Point, SimplifyConfig};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single load-and-simplify run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyDiagnostics {
    /// Loading fixes into a [`CoordinateSequence`].
    pub load: StageDiagnostics,
    /// Douglas-Peucker simplification.
    pub simplification: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across both steps.
    pub summary: SimplifySummary,
}

/// Diagnostics for a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Step-specific counts.
    pub metrics: StageMetrics,
}

/// Step-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Sequence loading metrics.
    Load {
        /// Fixes handed to the loader.
        records_in: usize,
        /// Consecutive duplicates dropped by the sequence.
        duplicates_dropped: usize,
        /// Whether a closing point was appended.
        ring_closed: bool,
        /// Points in the loaded sequence.
        points_out: usize,
    },
    /// Simplification metrics.
    Simplification {
        /// Distance tolerance used.
        tolerance: f64,
        /// Points before simplification.
        points_before: usize,
        /// Points after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
}

/// High-level counts for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifySummary {
    /// Fixes received from the reader.
    pub input_count: usize,
    /// Fixes in the simplified output.
    pub output_count: usize,
}

impl SimplifyDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Simplification Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Fixes: {} in, {} out",
            self.summary.input_count, self.summary.output_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Step", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in [("Load", &self.load), ("Simplify", &self.simplification)] {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Load `points` and simplify them per `config`, collecting diagnostics.
///
/// # Errors
///
/// Returns [`NavError::InvalidArgument`] if the configured tolerance is
/// negative or NaN. Validation happens before any work is done.
pub fn simplify_with_diagnostics(
    points: Vec<Point>,
    config: &SimplifyConfig,
) -> Result<(CoordinateSequence, SimplifyDiagnostics), NavError> {
    config.validate()?;

    let run_start = Instant::now();

    // Load.
    let start = Instant::now();
    let records_in = points.len();
    let mut sequence = CoordinateSequence::from_points(points, config.allow_repeated);
    let deduplicated = sequence.len();
    if config.close_ring {
        sequence.close();
    }
    let ring_closed = sequence.len() > deduplicated;
    let load = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Load {
            records_in,
            duplicates_dropped: records_in - deduplicated,
            ring_closed,
            points_out: sequence.len(),
        },
    };

    // Simplify.
    let start = Instant::now();
    let simplified = LineSimplifier::new(sequence.points(), config.distance_tolerance)?.simplify();
    let simplification = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Simplification {
            tolerance: config.distance_tolerance,
            points_before: sequence.len(),
            points_after: simplified.len(),
            reduction_ratio: reduction_ratio(sequence.len(), simplified.len()),
        },
    };

    let diagnostics = SimplifyDiagnostics {
        load,
        simplification,
        total_duration: run_start.elapsed(),
        summary: SimplifySummary {
            input_count: records_in,
            output_count: simplified.len(),
        },
    };

    Ok((simplified, diagnostics))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[allow(clippy::cast_precision_loss)]
fn reduction_ratio(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        1.0 - after as f64 / before as f64
    }
}

/// Format step metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Load {
            records_in,
            duplicates_dropped,
            ring_closed,
            points_out,
        } => {
            let ring = if *ring_closed { ", ring closed" } else { "" };
            format!("{records_in}->{points_out} pts ({duplicates_dropped} duplicates{ring})")
        }
        StageMetrics::Simplification {
            tolerance,
            points_before,
            points_after,
            reduction_ratio,
        } => {
            format!(
                "tol={tolerance} {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn track() -> Vec<Point> {
        vec![
            Point::labeled("t0", 0.0, 0.0),
            Point::labeled("t1", 0.0, 0.0),
            Point::labeled("t2", 1.0, 0.1),
            Point::labeled("t3", 2.0, -0.1),
            Point::labeled("t4", 3.0, 5.0),
            Point::labeled("t5", 4.0, 6.0),
            Point::labeled("t6", 5.0, 7.0),
        ]
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        assert!((duration_ms(d) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn reduction_ratio_handles_empty() {
        assert!(reduction_ratio(0, 0).abs() < f64::EPSILON);
        assert!((reduction_ratio(4, 1) - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_duplicates_and_output() {
        let (simplified, diag) =
            simplify_with_diagnostics(track(), &SimplifyConfig::new(0.5)).unwrap();

        assert_eq!(simplified.len(), 4);
        assert_eq!(diag.summary.input_count, 7);
        assert_eq!(diag.summary.output_count, 4);
        match diag.load.metrics {
            StageMetrics::Load {
                records_in,
                duplicates_dropped,
                ring_closed,
                points_out,
            } => {
                assert_eq!(records_in, 7);
                assert_eq!(duplicates_dropped, 1);
                assert!(!ring_closed);
                assert_eq!(points_out, 6);
            }
            StageMetrics::Simplification { .. } => panic!("expected load metrics"),
        }
    }

    #[test]
    fn keeps_repeats_when_allowed() {
        let config = SimplifyConfig {
            allow_repeated: true,
            ..SimplifyConfig::new(0.5)
        };
        let (_, diag) = simplify_with_diagnostics(track(), &config).unwrap();
        assert!(matches!(
            diag.load.metrics,
            StageMetrics::Load {
                duplicates_dropped: 0,
                points_out: 7,
                ..
            }
        ));
    }

    #[test]
    fn closing_ring_reported() {
        let config = SimplifyConfig {
            close_ring: true,
            ..SimplifyConfig::new(0.5)
        };
        let (simplified, diag) = simplify_with_diagnostics(track(), &config).unwrap();
        assert!(simplified.is_closed());
        assert_eq!(simplified.last().unwrap().label.as_deref(), Some("t0"));
        assert!(matches!(
            diag.load.metrics,
            StageMetrics::Load {
                ring_closed: true,
                points_out: 7,
                ..
            }
        ));
    }

    #[test]
    fn invalid_tolerance_fails_before_work() {
        let result = simplify_with_diagnostics(track(), &SimplifyConfig::new(-1.0));
        assert!(matches!(result, Err(NavError::InvalidArgument(_))));
    }

    #[test]
    fn report_mentions_each_step() {
        let (_, diag) = simplify_with_diagnostics(track(), &SimplifyConfig::new(0.5)).unwrap();
        let report = diag.report();
        assert!(report.contains("Simplification Report"));
        assert!(report.contains("Load"));
        assert!(report.contains("Simplify"));
        assert!(report.contains("7 in, 4 out"));
    }

    #[test]
    fn diagnostics_serialize_durations_as_seconds() {
        let (_, diag) = simplify_with_diagnostics(track(), &SimplifyConfig::new(0.5)).unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json["total_duration"].is_f64());
        assert_eq!(json["summary"]["output_count"], 4);
    }
}
