//! # Codemodel - Semantic Model Builder for Static Source Analysis
//!
//! Turns the stream of constructs a parser discovers into one
//! cross-referenced, de-duplicated code model.
//!
//! Codemodel provides:
//! - Identifier analysis (package / local name split, built-in pseudo-packages)
//! - Identity-managed registries for packages, types, functions and proxies
//! - Forward references that resolve against the final registry state
//! - JSONL discovery-event replay and serializable model snapshots

pub mod identifier;
pub mod internal_types;
pub mod value;
pub mod node;
pub mod registry;
pub mod builder;
pub mod event;
pub mod snapshot;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use builder::{ModelBuilder, ModelStats};
pub use identifier::{IdentifierAnalyzer, TypeIdentifier, DEFAULT_PACKAGE, SEPARATOR};
pub use internal_types::{BuiltinTypes, InternalTypes};
pub use node::{
    FunctionId, Package, PackageId, ProxyId, SourceFileId, TypeId, TypeKind, TypeNode,
};
pub use snapshot::ModelSnapshot;
pub use value::{MemberValue, ValueType};

/// Result type alias for Codemodel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Codemodel operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown value type: {0}")]
    UnknownValueType(String),

    #[error("Malformed event on line {line}: {source}")]
    Event {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
