//! Identifier Analyzer - Splits qualified type identifiers
//!
//! Format: `<package>::<package>::<Name>`
//!
//! Examples:
//! - `php::depend::Parser` → local `Parser`, package `php::depend`
//! - `Parser` → local `Parser`, package `+global`
//! - `::Iterator` → local `Iterator`, package `+spl` (built-in at root scope)
//!
//! Malformed identifiers never fail: they degrade to "whole string is the
//! local name, package is the default package".

use crate::internal_types::InternalTypes;
use regex::Regex;
use std::sync::OnceLock;

/// Separator between package segments and the local name
pub const SEPARATOR: &str = "::";

/// Sentinel name of the default/global package
pub const DEFAULT_PACKAGE: &str = "+global";

static ROOT_SCOPED: OnceLock<Regex> = OnceLock::new();

fn root_scoped() -> &'static Regex {
    ROOT_SCOPED
        .get_or_init(|| Regex::new(r"(?i)^::[a-z_][a-z0-9_]*$").expect("valid root-scope pattern"))
}

/// Check if a package name is the default package sentinel
pub fn is_default_package(name: &str) -> bool {
    name == DEFAULT_PACKAGE
}

/// Split at the last separator, rejecting empty halves.
fn split_qualified(qualified: &str) -> Option<(&str, &str)> {
    let (package, local) = qualified.rsplit_once(SEPARATOR)?;
    if package.is_empty() || local.is_empty() {
        return None;
    }
    Some((package, local))
}

/// Get the local (unqualified) part of an identifier.
///
/// A leading `::` marks root scope and is not part of the name; any other
/// degenerate form returns the input unchanged.
pub fn local_name(qualified: &str) -> &str {
    if root_scoped().is_match(qualified) {
        return &qualified[SEPARATOR.len()..];
    }
    match split_qualified(qualified) {
        Some((_, local)) => local,
        None => qualified,
    }
}

/// Get the package part of an identifier.
///
/// Unqualified built-in names are placed in the oracle's pseudo-package,
/// everything else without a package goes to [`DEFAULT_PACKAGE`].
pub fn package_name(qualified: &str, internal: &dyn InternalTypes) -> String {
    let name = if root_scoped().is_match(qualified) {
        &qualified[SEPARATOR.len()..]
    } else {
        qualified
    };

    if name.contains(SEPARATOR) {
        return match split_qualified(name) {
            Some((package, _)) => package.to_string(),
            None => DEFAULT_PACKAGE.to_string(),
        };
    }

    match internal.package_for(name) {
        Some(package) if internal.is_internal(name) => package.to_string(),
        _ => DEFAULT_PACKAGE.to_string(),
    }
}

/// A qualified identifier broken into its registry keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentifier {
    /// Local name as spelled by the caller
    pub local_name: String,
    /// Case-folded local name used as the registry key
    pub normalized_name: String,
    /// Owning package name (`+global` when unknown)
    pub package_name: String,
}

impl TypeIdentifier {
    /// Check if this identifier points into the default package
    pub fn is_default(&self) -> bool {
        is_default_package(&self.package_name)
    }
}

impl std::fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.package_name, SEPARATOR, self.local_name)
    }
}

/// Analyzer bundling the internal-types oracle.
pub struct IdentifierAnalyzer {
    internal: Box<dyn InternalTypes>,
}

impl IdentifierAnalyzer {
    pub fn new(internal: impl InternalTypes + 'static) -> Self {
        Self {
            internal: Box::new(internal),
        }
    }

    /// Analyze a qualified identifier
    pub fn analyze(&self, qualified: &str) -> TypeIdentifier {
        let local = local_name(qualified);
        TypeIdentifier {
            local_name: local.to_string(),
            normalized_name: local.to_lowercase(),
            package_name: package_name(qualified, self.internal.as_ref()),
        }
    }

    pub fn internal_types(&self) -> &dyn InternalTypes {
        self.internal.as_ref()
    }
}

impl std::fmt::Debug for IdentifierAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierAnalyzer").finish_non_exhaustive()
    }
}
