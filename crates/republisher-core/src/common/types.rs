//! # Identifier and Outcome Types
//!
//! - [`ContentId`] - a validated, case-preserving content UUID
//! - [`RepublishOutcome`] - what a single worker did with one identifier
//! - [`RunSummary`] - per-outcome tallies for a whole run

use super::error::{Error, Result};
use core::fmt;
use core::str::FromStr;
use uuid::Uuid;

/// A content identifier that parsed as a canonical hyphenated UUID.
///
/// The original text is kept verbatim: `ContentId` never re-renders the UUID,
/// so upper-case input stays upper-case in request paths and log lines.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Validates `value` and takes ownership of it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidIdentifier`] if `value` is not a UUID.
    /// - [`Error::NonCanonicalIdentifier`] if `value` is a UUID in braced,
    ///   URN, or dash-less form.
    pub fn parse(value: String) -> Result<Self> {
        if let Err(source) = Uuid::try_parse(&value) {
            return Err(Error::InvalidIdentifier { value, source });
        }
        if value.len() != uuid::fmt::Hyphenated::LENGTH {
            return Err(Error::NonCanonicalIdentifier { value });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.to_owned())
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal state of one republish worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepublishOutcome {
    /// Found in `collection` and accepted by the publish endpoint.
    Published { collection: String },
    /// Found in `collection` but the publish request failed or was rejected.
    PublishFailed { collection: String },
    /// No collection answered the read with `200 OK`.
    NotFound,
    /// The run was cancelled before the identifier was resolved.
    Cancelled,
}

impl RepublishOutcome {
    pub const fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Per-outcome tallies collected by the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub publish_failed: usize,
    pub not_found: usize,
    pub cancelled: usize,
    /// Workers that panicked before producing an outcome.
    pub panicked: usize,
    /// Input entries dropped before dispatch because they were not UUIDs.
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RepublishOutcome) {
        match outcome {
            RepublishOutcome::Published { .. } => self.published += 1,
            RepublishOutcome::PublishFailed { .. } => self.publish_failed += 1,
            RepublishOutcome::NotFound => self.not_found += 1,
            RepublishOutcome::Cancelled => self.cancelled += 1,
        }
    }

    pub const fn total(&self) -> usize {
        self.published
            + self.publish_failed
            + self.not_found
            + self.cancelled
            + self.panicked
            + self.skipped
    }

    /// `true` when every input entry was a UUID and was published.
    pub const fn is_clean(&self) -> bool {
        self.published == self.total()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} published, {} publish failures, {} not found, {} cancelled, {} panicked, {} skipped",
            self.published,
            self.publish_failed,
            self.not_found,
            self.cancelled,
            self.panicked,
            self.skipped
        )
    }
}
