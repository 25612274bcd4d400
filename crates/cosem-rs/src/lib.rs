// crates/cosem-rs/src/lib.rs

//! In-memory model of a DLMS/COSEM server as seen by a client: logical
//! names, A-XDR encoded attribute values, the supported interface classes
//! and the per-device object collection.

// --- Foundation Modules ---
pub mod data;
pub mod error;
pub mod types;

// --- Object Model ---
pub mod association;
pub mod classes;
pub mod object;

// --- Device Model ---
pub mod collection;

// --- Top-level Exports ---
pub use association::{AccessMode, AttributeAccess, ObjectListElement};
pub use collection::{Collection, Template, UsedAttributes};
pub use data::{Data, DataType};
pub use error::CosemError;
pub use object::{AttributeElement, Classifier, CosemObject};
pub use types::{LogicalName, ParameterValue};
