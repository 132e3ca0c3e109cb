//! Ordered collection table.
//!
//! Each [`Collection`] names one partition of the native content store (used
//! as a read path segment) and the origin system tag sent with content found
//! there. The [`CollectionTable`] keeps collections in probing order; workers
//! walk it front to back and stop at the first hit.

use crate::common::{Error, Result};
use core::fmt;
use core::str::FromStr;
use reqwest::header::HeaderValue;

/// One named partition of the native store and its origin system tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    name: String,
    origin_system_id: HeaderValue,
}

impl Collection {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCollection`] if `name` is empty or uses
    /// anything but unreserved URL characters (`A-Z a-z 0-9 - . _ ~`), or if
    /// `origin_system_id` is empty or not a valid HTTP header value.
    pub fn new(name: impl Into<String>, origin_system_id: &str) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: &str| Error::InvalidCollection {
            entry: format!("{name}={origin_system_id}"),
            reason: reason.to_owned(),
        };

        if name.is_empty() {
            return Err(invalid("collection name is empty"));
        }
        if !name.chars().all(is_unreserved) {
            return Err(invalid(
                "collection name may only contain letters, digits, '-', '.', '_' and '~'",
            ));
        }
        if origin_system_id.is_empty() {
            return Err(invalid("origin system id is empty"));
        }
        let origin_system_id = HeaderValue::from_str(origin_system_id)
            .map_err(|_| invalid("origin system id is not a valid header value"))?;

        Ok(Self {
            name,
            origin_system_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin_system_id(&self) -> &HeaderValue {
        &self.origin_system_id
    }
}

/// Characters that pass through a URL path segment unescaped.
const fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// Parses `name=origin`, e.g. `methode=methode-web-pub`.
impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, origin) = s.split_once('=').ok_or_else(|| Error::InvalidCollection {
            entry: s.to_owned(),
            reason: "expected NAME=ORIGIN".to_owned(),
        })?;
        Self::new(name.trim(), origin.trim())
    }
}

/// Collections in probing order. Never empty, names are unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionTable {
    collections: Vec<Collection>,
}

impl CollectionTable {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCollection`] if `collections` is empty or
    /// names the same collection twice.
    pub fn new(collections: Vec<Collection>) -> Result<Self> {
        if collections.is_empty() {
            return Err(Error::InvalidCollection {
                entry: String::new(),
                reason: "at least one collection is required".to_owned(),
            });
        }
        for (i, collection) in collections.iter().enumerate() {
            if collections[..i].iter().any(|c| c.name == collection.name) {
                return Err(Error::InvalidCollection {
                    entry: collection.name.clone(),
                    reason: "duplicate collection name".to_owned(),
                });
            }
        }
        Ok(Self { collections })
    }

    /// The native store's collections: `methode` first, then `wordpress`.
    pub fn reference() -> Self {
        Self {
            collections: vec![
                Collection {
                    name: "methode".to_owned(),
                    origin_system_id: HeaderValue::from_static("methode-web-pub"),
                },
                Collection {
                    name: "wordpress".to_owned(),
                    origin_system_id: HeaderValue::from_static("wordpress"),
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl Default for CollectionTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Renders the names as `[methode wordpress]`.
impl fmt::Display for CollectionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, collection) in self.collections.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&collection.name)?;
        }
        f.write_str("]")
    }
}
