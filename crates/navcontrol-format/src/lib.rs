//! navcontrol-format: Pure navigation text readers and writers (sans-IO)
//!
//! Parses delimited navigation records into points and serializes
//! simplified tracks back to the same column layout. Both directions
//! work on in-memory strings; the `navcontrol` binary owns the files.

pub mod reader;
pub mod writer;

pub use reader::{FormatError, ReaderConfig, normalize_longitude, parse_points};
pub use writer::{NavMetadata, to_r2rnav};
