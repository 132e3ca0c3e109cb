//! Error types for the republish pipeline.
//!
//! This module defines the central `Error` enum, which captures the failures
//! that are reported back to a caller. Failures that happen while a worker is
//! probing collections or publishing are *not* represented here: workers log
//! them and settle on a [`RepublishOutcome`](super::types::RepublishOutcome)
//! instead.
//!
//! ## Error Cases
//! - `Io`: The identifiers file could not be read.
//! - `InvalidIdentifier`: An entry does not parse as a UUID.
//! - `NonCanonicalIdentifier`: An entry parses as a UUID but is not in the
//!   hyphenated 8-4-4-4-12 form.
//! - `InvalidCollection`: A collection table entry is malformed.
//! - `InvalidEndpoint`: A read or publish endpoint is not a usable HTTP URL.
//! - `HttpClient`: The shared HTTP client could not be built.

use std::path::PathBuf;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the republish pipeline.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The identifiers file could not be opened or read.
    #[error("Cannot read uuids file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entry is not a UUID at all.
    #[error("{source}")]
    InvalidIdentifier {
        value: String,
        #[source]
        source: uuid::Error,
    },

    /// The entry is a UUID in braced, URN or simple form.
    #[error("UUID {value:?} is not in canonical hyphenated form")]
    NonCanonicalIdentifier { value: String },

    /// A collection definition could not be accepted.
    #[error("Invalid collection {entry:?}: {reason}")]
    InvalidCollection { entry: String, reason: String },

    /// A read or publish endpoint could not be accepted.
    #[error("Invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The shared HTTP client failed to initialize.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
