//! Model Builder - Facade driven by the parser, one call per discovered construct
//!
//! The builder owns every registry for one analysis session. Build calls
//! return canonical ids for anything that has identity (packages, types,
//! functions, proxies) and fresh owned nodes for everything else.

use crate::identifier::{IdentifierAnalyzer, TypeIdentifier};
use crate::internal_types::{BuiltinTypes, InternalTypes};
use crate::node::{
    ArrayElement, ArrayExpression, CatchStatement, ClassOrInterfaceConstant,
    ClassOrInterfaceConstantValue, ClassOrInterfaceProxy, ConstantValue, Function, FunctionId,
    Method, Package, PackageId, Parameter, Property, ProxyId, SourceFile, SourceFileId, TypeId,
    TypeNode,
};
use crate::registry::{
    FunctionRegistry, PackageRegistry, ProxyRegistry, SourceFileRegistry, TypeRegistry,
};
use crate::value::{MemberValue, ValueCache, ValueType};
use crate::{Error, Result};
use std::path::Path;
use std::rc::Rc;

/// Builds the cross-referenced code model for one codebase snapshot.
#[derive(Debug)]
pub struct ModelBuilder {
    analyzer: IdentifierAnalyzer,
    packages: PackageRegistry,
    types: TypeRegistry,
    functions: FunctionRegistry,
    proxies: ProxyRegistry,
    files: SourceFileRegistry,
    values: ValueCache,
}

impl ModelBuilder {
    /// Create a builder using the built-in type table
    pub fn new() -> Self {
        Self::with_internal_types(BuiltinTypes::new())
    }

    /// Create a builder with a custom internal-types oracle
    pub fn with_internal_types(internal: impl InternalTypes + 'static) -> Self {
        Self {
            analyzer: IdentifierAnalyzer::new(internal),
            packages: PackageRegistry::new(),
            types: TypeRegistry::new(),
            functions: FunctionRegistry::new(),
            proxies: ProxyRegistry::new(),
            files: SourceFileRegistry::new(),
            values: ValueCache::new(),
        }
    }

    /// Split a qualified identifier the way every type operation does
    pub fn analyze(&self, qualified: &str) -> TypeIdentifier {
        self.analyzer.analyze(qualified)
    }

    // ============================================================
    // Identity-managed nodes
    // ============================================================

    pub fn build_package(&mut self, name: &str) -> PackageId {
        self.packages.get_or_create(name)
    }

    pub fn build_class(&mut self, name: &str, line: u32) -> TypeId {
        let ident = self.analyzer.analyze(name);
        self.types.build_class(&ident, line, &mut self.packages)
    }

    pub fn build_interface(&mut self, name: &str, line: u32) -> TypeId {
        let ident = self.analyzer.analyze(name);
        self.types.build_interface(&ident, line, &mut self.packages)
    }

    /// Resolve a type named where its kind is unknown (e.g. a type hint).
    ///
    /// Returns an existing class or interface when one matches, otherwise a
    /// new class.
    pub fn build_proxy_subject(&mut self, identifier: &str) -> TypeId {
        let ident = self.analyzer.analyze(identifier);
        self.types.build_proxy_subject(&ident, &mut self.packages)
    }

    pub fn build_function(&mut self, name: &str, line: u32) -> FunctionId {
        self.functions.build(name, line, &mut self.packages)
    }

    /// Get the deferred reference for an identifier (one per case-folded name)
    pub fn build_class_or_interface_proxy(&mut self, identifier: &str) -> ProxyId {
        self.proxies.get_or_create(identifier)
    }

    pub fn build_source_file(&mut self, path: impl AsRef<Path>) -> SourceFileId {
        self.files.get_or_create(path)
    }

    // ============================================================
    // Plain node allocation
    // ============================================================

    pub fn build_method(&self, name: &str, line: u32) -> Method {
        Method::new(name, line)
    }

    pub fn build_parameter(&self, name: &str, line: u32) -> Parameter {
        Parameter::new(name, line)
    }

    pub fn build_property(&self, name: &str, line: u32) -> Property {
        Property::new(name, line)
    }

    pub fn build_class_or_interface_constant(&self, identifier: &str) -> ClassOrInterfaceConstant {
        ClassOrInterfaceConstant::new(identifier)
    }

    /// Build a reference to `Owner::IDENTIFIER`.
    ///
    /// The owner must be a type of this session.
    pub fn build_class_or_interface_constant_value(
        &self,
        owner: Option<TypeId>,
        identifier: &str,
    ) -> Result<ClassOrInterfaceConstantValue> {
        let owner = owner.ok_or_else(|| {
            Error::InvalidArgument(format!("constant '{identifier}' has no owner type"))
        })?;
        if self.types.get(owner).is_none() {
            return Err(Error::InvalidArgument(format!(
                "constant '{identifier}' refers to unknown owner {owner:?}"
            )));
        }
        Ok(ClassOrInterfaceConstantValue {
            owner,
            identifier: identifier.to_string(),
        })
    }

    pub fn build_constant_value(&self, identifier: &str) -> ConstantValue {
        ConstantValue {
            identifier: identifier.to_string(),
        }
    }

    pub fn build_array_expression(&self) -> ArrayExpression {
        ArrayExpression::default()
    }

    pub fn build_array_element(&self) -> ArrayElement {
        ArrayElement::default()
    }

    pub fn build_catch_statement(&self) -> CatchStatement {
        CatchStatement::default()
    }

    // ============================================================
    // Values
    // ============================================================

    pub fn build_null_value(&self) -> Rc<MemberValue> {
        self.values.null()
    }

    pub fn build_true_value(&self) -> Rc<MemberValue> {
        self.values.true_value()
    }

    pub fn build_false_value(&self) -> Rc<MemberValue> {
        self.values.false_value()
    }

    /// Always a new instance, even for equal input
    pub fn build_numeric_value(
        &self,
        value_type: ValueType,
        raw: &str,
        negative: bool,
    ) -> Rc<MemberValue> {
        self.values.numeric(value_type, raw, negative)
    }

    /// Always a new instance, even for equal input
    pub fn build_scalar_value(&self, value_type: ValueType, raw: Option<&str>) -> Rc<MemberValue> {
        self.values.scalar(value_type, raw.map(str::to_string))
    }

    // ============================================================
    // Proxy resolution
    // ============================================================

    /// Resolve a proxy against the current registry state.
    ///
    /// Nothing is cached: a proxy created before its target was declared
    /// resolves to the declaration once it exists.
    pub fn resolve_proxy(&mut self, proxy: ProxyId) -> Option<TypeId> {
        let identifier = self.proxies.get(proxy)?.identifier().to_string();
        Some(self.build_proxy_subject(&identifier))
    }

    /// Resolve a proxy to the package of its target
    pub fn resolve_proxy_package(&mut self, proxy: ProxyId) -> Option<PackageId> {
        let target = self.resolve_proxy(proxy)?;
        self.types.get(target)?.package()
    }

    /// Resolve every proxy so forward-referenced packages exist.
    ///
    /// Returns the number of proxies resolved.
    pub fn resolve_all_proxies(&mut self) -> usize {
        let ids = self.proxies.ids();
        let before = self.packages.len();
        for id in &ids {
            self.resolve_proxy_package(*id);
        }
        let materialized = self.packages.len() - before;
        if materialized > 0 {
            tracing::debug!(
                "[BUILDER] {} package(s) materialized through proxies",
                materialized
            );
        }
        ids.len()
    }

    /// All packages for downstream consumers, in creation order.
    ///
    /// Resolves outstanding proxies first. The default package is left out
    /// when it holds no types and no functions.
    pub fn packages(&mut self) -> Vec<&Package> {
        self.resolve_all_proxies();
        let default_id = self.packages.default_id();
        self.packages
            .iter()
            .filter(|package| package.id() != default_id || !package.is_empty())
            .collect()
    }

    // ============================================================
    // Linking helpers
    // ============================================================

    pub fn set_type_source_file(&mut self, id: TypeId, file: SourceFileId) -> bool {
        match self.types.get_mut(id) {
            Some(node) => {
                node.set_source_file(file);
                true
            }
            None => false,
        }
    }

    pub fn set_function_source_file(&mut self, id: FunctionId, file: SourceFileId) -> bool {
        match self.functions.get_mut(id) {
            Some(function) => {
                function.set_source_file(file);
                true
            }
            None => false,
        }
    }

    /// Record that `owner` depends on the type named `identifier`
    pub fn add_type_dependency(&mut self, owner: TypeId, identifier: &str) -> Option<ProxyId> {
        let proxy = self.build_class_or_interface_proxy(identifier);
        self.types.get_mut(owner)?.add_dependency(proxy);
        Some(proxy)
    }

    /// Record that `child` extends or implements `parent`
    pub fn add_child_type(&mut self, parent: TypeId, child: TypeId) -> bool {
        if self.types.get(child).is_none() {
            return false;
        }
        self.types
            .get_mut(parent)
            .is_some_and(|node| node.add_child_type(child))
    }

    // ============================================================
    // Read access
    // ============================================================

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id)
    }

    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.packages.by_name(name)
    }

    pub fn default_package(&self) -> &Package {
        self.packages.default_package()
    }

    pub fn type_node(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(id)
    }

    pub fn type_node_mut(&mut self, id: TypeId) -> Option<&mut TypeNode> {
        self.types.get_mut(id)
    }

    /// Look up a registered type without creating one
    pub fn find_type(&self, qualified: &str) -> Option<TypeId> {
        let ident = self.analyzer.analyze(qualified);
        self.types
            .find_class(&ident)
            .or_else(|| self.types.find_interface(&ident))
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id)
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut Function> {
        self.functions.get_mut(id)
    }

    pub fn proxy(&self, id: ProxyId) -> Option<&ClassOrInterfaceProxy> {
        self.proxies.get(id)
    }

    pub fn source_file(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.files.get(id)
    }

    /// Get statistics about the model built so far
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            packages: self.packages.len(),
            classes: self.types.class_count(),
            interfaces: self.types.interface_count(),
            detached: self.types.iter().filter(|t| t.is_detached()).count(),
            functions: self.functions.len(),
            proxies: self.proxies.len(),
            files: self.files.len(),
        }
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a built model
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ModelStats {
    pub packages: usize,
    pub classes: usize,
    pub interfaces: usize,
    /// Class guesses dropped in favour of an interface
    pub detached: usize,
    pub functions: usize,
    pub proxies: usize,
    pub files: usize,
}

impl std::fmt::Display for ModelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Code Model Statistics:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Packages: {}", self.packages)?;
        writeln!(
            f,
            "  Types: {} (classes: {}, interfaces: {})",
            self.classes + self.interfaces,
            self.classes,
            self.interfaces
        )?;
        writeln!(f, "  Functions: {}", self.functions)?;
        writeln!(f, "  Proxies: {}", self.proxies)
    }
}
