//! Code tree nodes
//!
//! Nodes never own each other. Every cross-reference (type → package,
//! type → dependency, constant value → owner) is a typed id resolved through
//! the registry that owns the target.

use crate::value::MemberValue;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(&self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

node_id!(
    /// Index of a package in the package registry
    PackageId
);
node_id!(
    /// Index of a class or interface in the type registry
    TypeId
);
node_id!(
    /// Index of a function in the function registry
    FunctionId
);
node_id!(
    /// Index of a proxy in the proxy registry
    ProxyId
);
node_id!(
    /// Index of a source file in the file registry
    SourceFileId
);

impl PackageId {
    /// The default package always occupies the first slot
    pub fn default_package() -> Self {
        Self(0)
    }
}

impl SourceFileId {
    /// The dummy source file attached to nodes before their file is known
    pub fn unknown() -> Self {
        Self(0)
    }
}

/// Discriminates the two type node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: Option<PathBuf>,
}

impl SourceFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Path of the file, `None` for the placeholder file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Package node; owns the membership sets of its types and functions.
#[derive(Debug, Clone)]
pub struct Package {
    id: PackageId,
    name: String,
    types: indexmap::IndexSet<TypeId>,
    functions: indexmap::IndexSet<FunctionId>,
}

impl Package {
    pub(crate) fn new(id: PackageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            types: indexmap::IndexSet::new(),
            functions: indexmap::IndexSet::new(),
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Types in insertion order
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().copied()
    }

    /// Functions in insertion order
    pub fn functions(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.functions.iter().copied()
    }

    pub fn contains_type(&self, id: TypeId) -> bool {
        self.types.contains(&id)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.functions.is_empty()
    }

    pub(crate) fn insert_type(&mut self, id: TypeId) -> bool {
        self.types.insert(id)
    }

    pub(crate) fn remove_type(&mut self, id: TypeId) -> bool {
        self.types.shift_remove(&id)
    }

    pub(crate) fn insert_function(&mut self, id: FunctionId) -> bool {
        self.functions.insert(id)
    }
}

/// A class or interface.
///
/// Created once per (normalized name, package) pair and filled in by later
/// build calls. The package reference is only changed by the type registry.
#[derive(Debug, Clone)]
pub struct TypeNode {
    id: TypeId,
    kind: TypeKind,
    name: String,
    normalized_name: String,
    line: u32,
    package: Option<PackageId>,
    source_file: SourceFileId,
    is_abstract: bool,
    doc_comment: Option<String>,
    methods: Vec<Method>,
    properties: Vec<Property>,
    constants: Vec<ClassOrInterfaceConstant>,
    dependencies: Vec<ProxyId>,
    child_types: Vec<TypeId>,
}

impl TypeNode {
    pub(crate) fn new(id: TypeId, kind: TypeKind, name: impl Into<String>, line: u32) -> Self {
        let name = name.into();
        let normalized_name = name.to_lowercase();
        Self {
            id,
            kind,
            name,
            normalized_name,
            line,
            package: None,
            source_file: SourceFileId::unknown(),
            is_abstract: false,
            doc_comment: None,
            methods: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
            dependencies: Vec::new(),
            child_types: Vec::new(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Display name, as spelled by the call that created the node
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Owning package; `None` once the node has been detached
    pub fn package(&self) -> Option<PackageId> {
        self.package
    }

    /// Check if the node was dropped from the registry
    pub fn is_detached(&self) -> bool {
        self.package.is_none()
    }

    pub fn source_file(&self) -> SourceFileId {
        self.source_file
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn constants(&self) -> &[ClassOrInterfaceConstant] {
        &self.constants
    }

    /// Proxies of the types this node depends on (parents, interfaces, hints)
    pub fn dependencies(&self) -> &[ProxyId] {
        &self.dependencies
    }

    pub fn child_types(&self) -> &[TypeId] {
        &self.child_types
    }

    pub(crate) fn set_package(&mut self, package: Option<PackageId>) {
        self.package = package;
    }

    pub fn set_source_file(&mut self, file: SourceFileId) {
        self.source_file = file;
    }

    pub fn set_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }

    pub fn set_doc_comment(&mut self, doc: impl Into<String>) {
        self.doc_comment = Some(doc.into());
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn add_constant(&mut self, constant: ClassOrInterfaceConstant) {
        self.constants.push(constant);
    }

    /// Record a dependency; duplicates are ignored
    pub fn add_dependency(&mut self, proxy: ProxyId) -> bool {
        if self.dependencies.contains(&proxy) {
            return false;
        }
        self.dependencies.push(proxy);
        true
    }

    /// Record a child type link; duplicates and self-links are ignored
    pub fn add_child_type(&mut self, child: TypeId) -> bool {
        if child == self.id || self.child_types.contains(&child) {
            return false;
        }
        self.child_types.push(child);
        true
    }

    /// Point a child link at `to` instead of `from`
    pub(crate) fn replace_child_type(&mut self, from: TypeId, to: TypeId) {
        if !self.child_types.contains(&from) {
            return;
        }
        self.child_types.retain(|child| *child != from);
        self.add_child_type(to);
    }

    /// Hand every member and link of this node over to `target`, leaving this
    /// node empty
    pub(crate) fn move_members_into(&mut self, target: &mut TypeNode) {
        target.methods.append(&mut self.methods);
        target.properties.append(&mut self.properties);
        target.constants.append(&mut self.constants);
        for proxy in std::mem::take(&mut self.dependencies) {
            target.add_dependency(proxy);
        }
        for child in std::mem::take(&mut self.child_types) {
            target.add_child_type(child);
        }
    }
}

/// A free function; always lives in the default package.
#[derive(Debug, Clone)]
pub struct Function {
    id: FunctionId,
    name: String,
    line: u32,
    package: PackageId,
    source_file: SourceFileId,
    parameters: Vec<Parameter>,
    dependencies: Vec<ProxyId>,
}

impl Function {
    pub(crate) fn new(id: FunctionId, name: impl Into<String>, line: u32) -> Self {
        Self {
            id,
            name: name.into(),
            line,
            package: PackageId::default_package(),
            source_file: SourceFileId::unknown(),
            parameters: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line of the first registration
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn package(&self) -> PackageId {
        self.package
    }

    pub fn source_file(&self) -> SourceFileId {
        self.source_file
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn dependencies(&self) -> &[ProxyId] {
        &self.dependencies
    }

    pub fn set_source_file(&mut self, file: SourceFileId) {
        self.source_file = file;
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn add_dependency(&mut self, proxy: ProxyId) -> bool {
        if self.dependencies.contains(&proxy) {
            return false;
        }
        self.dependencies.push(proxy);
        true
    }
}

/// Deferred reference to a class or interface.
///
/// Holds only the identifier; resolution goes through
/// [`ModelBuilder::resolve_proxy`](crate::ModelBuilder::resolve_proxy) on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOrInterfaceProxy {
    id: ProxyId,
    identifier: String,
}

impl ClassOrInterfaceProxy {
    pub(crate) fn new(id: ProxyId, identifier: impl Into<String>) -> Self {
        Self {
            id,
            identifier: identifier.into(),
        }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// Identifier as spelled by the first request
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone, Default)]
pub struct Method {
    pub name: String,
    pub line: u32,
    pub is_abstract: bool,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<ProxyId>,
}

impl Method {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parameter {
    pub name: String,
    pub line: u32,
    pub position: usize,
    pub type_hint: Option<ProxyId>,
    pub default_value: Option<Rc<MemberValue>>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Property {
    pub name: String,
    pub line: u32,
    pub is_static: bool,
    pub type_hint: Option<ProxyId>,
    pub default_value: Option<Rc<MemberValue>>,
}

impl Property {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            ..Self::default()
        }
    }
}

/// A `const` declared inside a class or interface body.
#[derive(Debug, Clone, Default)]
pub struct ClassOrInterfaceConstant {
    pub name: String,
    pub value: Option<Rc<MemberValue>>,
}

impl ClassOrInterfaceConstant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Reference to a constant of a known owner type (`Owner::NAME`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOrInterfaceConstantValue {
    pub owner: TypeId,
    pub identifier: String,
}

/// Reference to a global constant (`PHP_EOL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValue {
    pub identifier: String,
}

/// Any value an array element or default can hold.
#[derive(Debug, Clone)]
pub enum ValueNode {
    Member(Rc<MemberValue>),
    Constant(ConstantValue),
    ClassConstant(ClassOrInterfaceConstantValue),
    Array(ArrayExpression),
}

#[derive(Debug, Clone, Default)]
pub struct ArrayExpression {
    pub elements: Vec<ArrayElement>,
}

impl ArrayExpression {
    pub fn add_element(&mut self, element: ArrayElement) {
        self.elements.push(element);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArrayElement {
    pub key: Option<ValueNode>,
    pub value: Option<ValueNode>,
}

#[derive(Debug, Clone, Default)]
pub struct CatchStatement {
    pub exception_type: Option<ProxyId>,
    pub variable: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_node_normalizes_name() {
        let node = TypeNode::new(TypeId(0), TypeKind::Class, "FooBar", 12);
        assert_eq!(node.name(), "FooBar");
        assert_eq!(node.normalized_name(), "foobar");
        assert_eq!(node.line(), 12);
        assert!(node.is_class());
        assert!(node.is_detached());
        assert_eq!(node.source_file(), SourceFileId::unknown());
    }

    #[test]
    fn test_dependencies_are_unique() {
        let mut node = TypeNode::new(TypeId(0), TypeKind::Interface, "I", 1);
        assert!(node.add_dependency(ProxyId(3)));
        assert!(!node.add_dependency(ProxyId(3)));
        assert!(node.add_child_type(TypeId(1)));
        assert!(!node.add_child_type(TypeId(1)));
        assert!(!node.add_child_type(TypeId(0)));
        assert_eq!(node.dependencies(), &[ProxyId(3)]);
        assert_eq!(node.child_types(), &[TypeId(1)]);
    }

    #[test]
    fn test_package_membership_keeps_order() {
        let mut package = Package::new(PackageId(1), "pkg");
        assert!(package.insert_type(TypeId(2)));
        assert!(package.insert_type(TypeId(0)));
        assert!(!package.insert_type(TypeId(2)));
        assert_eq!(package.types().collect::<Vec<_>>(), vec![TypeId(2), TypeId(0)]);

        assert!(package.remove_type(TypeId(2)));
        assert!(!package.contains_type(TypeId(2)));
        assert!(!package.is_empty());
        package.remove_type(TypeId(0));
        assert!(package.is_empty());
    }

    #[test]
    fn test_move_members_into() {
        let mut class = TypeNode::new(TypeId(0), TypeKind::Class, "Shape", 0);
        class.add_method(Method::new("area", 3));
        class.add_constant(ClassOrInterfaceConstant::new("SIDES"));
        class.add_dependency(ProxyId(1));
        class.add_child_type(TypeId(2));
        class.add_child_type(TypeId(1));

        let mut interface = TypeNode::new(TypeId(1), TypeKind::Interface, "Shape", 9);
        interface.add_dependency(ProxyId(1));
        class.move_members_into(&mut interface);

        assert!(class.methods().is_empty());
        assert!(class.child_types().is_empty());
        assert_eq!(interface.methods()[0].name, "area");
        assert_eq!(interface.constants()[0].name, "SIDES");
        assert_eq!(interface.dependencies(), &[ProxyId(1)]);
        // the interface cannot be its own child
        assert_eq!(interface.child_types(), &[TypeId(2)]);
    }

    #[test]
    fn test_replace_child_type() {
        let mut node = TypeNode::new(TypeId(0), TypeKind::Class, "Base", 1);
        node.add_child_type(TypeId(1));
        node.add_child_type(TypeId(2));
        node.replace_child_type(TypeId(1), TypeId(2));
        assert_eq!(node.child_types(), &[TypeId(2)]);
        node.replace_child_type(TypeId(5), TypeId(6));
        assert_eq!(node.child_types(), &[TypeId(2)]);
    }

    #[test]
    fn test_function_defaults() {
        let function = Function::new(FunctionId(0), "strlen_wrapper", 4);
        assert_eq!(function.package(), PackageId::default_package());
        assert_eq!(function.line(), 4);
    }
}
