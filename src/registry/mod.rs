//! Registries - Get-or-create maps owning every node of the code tree
//!
//! Each registry is the single owner of one node kind and hands out typed ids.
//! The [`ModelBuilder`](crate::ModelBuilder) owns all registries for one
//! analysis session; nothing else mutates them.

pub mod files;
pub mod functions;
pub mod packages;
pub mod proxies;
pub mod types;

pub use files::SourceFileRegistry;
pub use functions::FunctionRegistry;
pub use packages::PackageRegistry;
pub use proxies::ProxyRegistry;
pub use types::TypeRegistry;
