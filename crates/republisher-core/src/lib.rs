#![doc = include_str!("../README.md")]

pub mod collection;
mod common;
pub mod dispatcher;
pub mod endpoint;
pub mod loader;
pub mod validator;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::collection::{Collection, CollectionTable};
pub use crate::common::*;
pub use crate::dispatcher::{DispatchMode, Dispatcher};
pub use crate::endpoint::{Endpoints, HttpSettings, build_client};
pub use crate::loader::{SourceFormat, load_identifiers, parse_identifiers};
pub use crate::validator::validate_identifiers;
pub use crate::worker::{ORIGIN_SYSTEM_HEADER, Republisher};
