// src/lib.rs

#![doc = "Stores COSEM device types, device data and templates as versioned XML documents."]
#![doc = ""]
#![doc = "Documents from every schema generation (3.x, 4.0, 4.1 and 5.0) can be read;"]
#![doc = "new documents are always written in the 5.0 layout."]
#![doc = ""]
#![doc = "It provides:"]
#![doc = "- `codec`: encoding a `Collection` into type and data documents and decoding them back."]
#![doc = "- `template`: attribute values shared between device types, fanned out on load."]
#![doc = "- `XmlAdapter`: the file-backed type library with nearest-version lookup."]
#![doc = "- `AdapterPool`: routing of each operation to one or more configured adapters."]

// --- Crate Modules ---

mod builder;
mod loader;
mod model;
mod parser;

pub mod adapter;
pub mod codec;
pub mod config;
pub mod error;
pub mod library;
pub mod pool;
pub mod report;
pub mod schema;
pub mod selector;
pub mod template;

// --- Public API Re-exports ---

pub use adapter::{Adapter, DEFAULT_ASSOCIATION, XmlAdapter};
pub use config::{AdapterConfig, PoolConfig, StorageLayout};
pub use error::AdapterError;
pub use library::{CollectionId, ManufacturerIndex, VersionResolver};
pub use pool::{AdapterPool, Operation};
pub use report::{AttributeDecodeError, DecodeReport, SkippedAttribute};
pub use schema::{DocumentKind, SchemaVersion, VersionedSchema};
