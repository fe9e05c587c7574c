//! Internal Types - Oracle for language built-in types
//!
//! Built-in classes and interfaces are never declared in analyzed source, so
//! an unqualified reference to one of them (`Iterator`, `Exception`) must not
//! land in the default package. The oracle answers two questions:
//! - is this bare name a built-in type?
//! - which fixed pseudo-package does it belong to?

use std::collections::HashMap;

/// Boundary consulted during package-name extraction.
pub trait InternalTypes {
    /// Check whether `name` is a built-in type (case-insensitive)
    fn is_internal(&self, name: &str) -> bool;

    /// Get the pseudo-package for a built-in type, if it is one
    fn package_for(&self, name: &str) -> Option<&str>;
}

/// Pseudo-package holding core language types
pub const STANDARD_PACKAGE: &str = "+standard";
/// Pseudo-package holding the standard PHP library
pub const SPL_PACKAGE: &str = "+spl";
/// Pseudo-package holding the reflection API
pub const REFLECTION_PACKAGE: &str = "+reflection";

const BUILTINS: &[(&str, &str)] = &[
    // core
    ("stdClass", STANDARD_PACKAGE),
    ("Exception", STANDARD_PACKAGE),
    ("ErrorException", STANDARD_PACKAGE),
    ("Closure", STANDARD_PACKAGE),
    ("Traversable", STANDARD_PACKAGE),
    ("IteratorAggregate", STANDARD_PACKAGE),
    ("ArrayAccess", STANDARD_PACKAGE),
    ("Serializable", STANDARD_PACKAGE),
    // spl
    ("Iterator", SPL_PACKAGE),
    ("Countable", SPL_PACKAGE),
    ("OuterIterator", SPL_PACKAGE),
    ("RecursiveIterator", SPL_PACKAGE),
    ("SeekableIterator", SPL_PACKAGE),
    ("SplObserver", SPL_PACKAGE),
    ("SplSubject", SPL_PACKAGE),
    ("ArrayIterator", SPL_PACKAGE),
    ("ArrayObject", SPL_PACKAGE),
    ("IteratorIterator", SPL_PACKAGE),
    ("RecursiveIteratorIterator", SPL_PACKAGE),
    ("RecursiveArrayIterator", SPL_PACKAGE),
    ("FilterIterator", SPL_PACKAGE),
    ("LimitIterator", SPL_PACKAGE),
    ("DirectoryIterator", SPL_PACKAGE),
    ("RecursiveDirectoryIterator", SPL_PACKAGE),
    ("SplFileInfo", SPL_PACKAGE),
    ("SplFileObject", SPL_PACKAGE),
    ("SplObjectStorage", SPL_PACKAGE),
    ("LogicException", SPL_PACKAGE),
    ("BadFunctionCallException", SPL_PACKAGE),
    ("BadMethodCallException", SPL_PACKAGE),
    ("DomainException", SPL_PACKAGE),
    ("InvalidArgumentException", SPL_PACKAGE),
    ("LengthException", SPL_PACKAGE),
    ("OutOfRangeException", SPL_PACKAGE),
    ("RuntimeException", SPL_PACKAGE),
    ("OutOfBoundsException", SPL_PACKAGE),
    ("OverflowException", SPL_PACKAGE),
    ("RangeException", SPL_PACKAGE),
    ("UnderflowException", SPL_PACKAGE),
    ("UnexpectedValueException", SPL_PACKAGE),
    // reflection
    ("Reflector", REFLECTION_PACKAGE),
    ("Reflection", REFLECTION_PACKAGE),
    ("ReflectionException", REFLECTION_PACKAGE),
    ("ReflectionClass", REFLECTION_PACKAGE),
    ("ReflectionObject", REFLECTION_PACKAGE),
    ("ReflectionMethod", REFLECTION_PACKAGE),
    ("ReflectionFunction", REFLECTION_PACKAGE),
    ("ReflectionParameter", REFLECTION_PACKAGE),
    ("ReflectionProperty", REFLECTION_PACKAGE),
    ("ReflectionExtension", REFLECTION_PACKAGE),
    // extensions
    ("DateTime", "+date"),
    ("DateTimeZone", "+date"),
    ("DOMDocument", "+dom"),
    ("DOMElement", "+dom"),
    ("DOMNode", "+dom"),
    ("DOMXPath", "+dom"),
    ("SimpleXMLElement", "+simplexml"),
    ("SimpleXMLIterator", "+simplexml"),
    ("PDO", "+pdo"),
    ("PDOStatement", "+pdo"),
    ("PDOException", "+pdo"),
];

/// Default oracle backed by a fixed table of built-in names.
///
/// Lookups are keyed by the lowercased type name.
#[derive(Debug, Clone)]
pub struct BuiltinTypes {
    packages: HashMap<String, String>,
}

impl BuiltinTypes {
    /// Create the oracle with the built-in table
    pub fn new() -> Self {
        let packages = BUILTINS
            .iter()
            .map(|(name, package)| (name.to_lowercase(), package.to_string()))
            .collect();
        Self { packages }
    }

    /// Register an additional built-in type (later entries win)
    pub fn with_extra(mut self, name: &str, package: impl Into<String>) -> Self {
        self.packages.insert(name.to_lowercase(), package.into());
        self
    }

    /// Number of known built-in types
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Default for BuiltinTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl InternalTypes for BuiltinTypes {
    fn is_internal(&self, name: &str) -> bool {
        self.packages.contains_key(&name.to_lowercase())
    }

    fn package_for(&self, name: &str) -> Option<&str> {
        self.packages.get(&name.to_lowercase()).map(String::as_str)
    }
}
