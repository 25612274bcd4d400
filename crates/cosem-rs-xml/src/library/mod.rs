//! The on-disk library of type documents.
//!
//! Layout: `Types/<manufacturer>/<firmware id>/<version>.<ext>`. 5.0 files
//! use hex names throughout; 3.x libraries name the manufacturer directory
//! with three ASCII letters and the files with a `.typ` semantic version.

mod index;
mod resolver;

pub use index::{CollectionId, ManufacturerIndex, ManufacturerMap, TypeMap, VersionMap};
pub use resolver::{VersionResolver, parse_semver, version_of};
