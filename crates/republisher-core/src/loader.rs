//! Identifier file loading.
//!
//! Two file layouts are accepted:
//!
//! - a JSON array of strings, e.g. `["6ba7b810-...", "6ba7b811-..."]`
//! - plain text with one identifier per line
//!
//! JSON is tried first; anything that does not start with a string array is
//! read as lines. Only the first JSON value is decoded, so trailing data after
//! the array is ignored. No filtering happens here: blank lines and junk entries
//! are passed through and rejected later by the validator.

use crate::common::{Error, Result};
use std::{fs, path::Path};

/// Layout detected by [`parse_identifiers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    JsonArray,
    Lines,
}

/// Reads and decodes the identifiers file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read. Decoding itself never
/// fails since every byte sequence is valid line-delimited input.
pub fn load_identifiers(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (format, identifiers) = parse_identifiers(&bytes);
    tracing::info!(
        "Read {} entries from [{}] as {format:?}",
        identifiers.len(),
        path.display()
    );
    Ok(identifiers)
}

/// Decodes file contents into raw identifier strings, order and duplicates
/// preserved.
///
/// A JSON `null` document decodes to an empty list, and anything after the
/// first JSON value is ignored. Line input strips `\n`
/// and `\r\n` terminators; invalid UTF-8 is replaced rather than rejected so
/// the offending line still reaches the validator.
pub fn parse_identifiers(bytes: &[u8]) -> (SourceFormat, Vec<String>) {
    let first = serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Option<Vec<String>>>()
        .next();
    if let Some(Ok(identifiers)) = first {
        return (SourceFormat::JsonArray, identifiers.unwrap_or_default());
    }

    let text = String::from_utf8_lossy(bytes);
    let identifiers = text.lines().map(str::to_owned).collect();
    (SourceFormat::Lines, identifiers)
}
