//! Type Registry - Classes and interfaces keyed by (normalized name, package)
//!
//! Resolution algorithm for `build_class` / `build_interface`:
//! 1. Exact match at (name, package) → reuse it
//! 2. A node at (name, +global) → move it into the requested package
//! 3. Requested package is +global and the name exists anywhere → reuse the
//!    first registered node without moving it
//! 4. Create a new node in the requested package
//!
//! Every path terminates with a node; lookups never fail.
//!
//! Slot maps are `normalized name → package name → id`. Inner maps keep
//! registration order and a moved entry is re-appended, so "first registered"
//! always means the oldest entry still at its current key.

use super::packages::PackageRegistry;
use crate::identifier::{DEFAULT_PACKAGE, TypeIdentifier};
use crate::node::{SourceFileId, TypeId, TypeKind, TypeNode};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};

type Slots = HashMap<String, IndexMap<String, TypeId>>;

#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Arena of every type node ever created, detached ones included
    nodes: Vec<TypeNode>,
    classes: Slots,
    interfaces: Slots,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a class
    pub fn build_class(
        &mut self,
        ident: &TypeIdentifier,
        line: u32,
        packages: &mut PackageRegistry,
    ) -> TypeId {
        self.build(TypeKind::Class, ident, line, packages)
    }

    /// Get or create an interface.
    ///
    /// A class guessed at the same (name, package) pair is dropped first when
    /// it still sits in the default package. Its members and links move to
    /// the interface, and child links elsewhere that point at it are redirected.
    pub fn build_interface(
        &mut self,
        ident: &TypeIdentifier,
        line: u32,
        packages: &mut PackageRegistry,
    ) -> TypeId {
        let dropped = self
            .find_class(ident)
            .filter(|class| self.node(*class).package() == Some(packages.default_id()))
            .and_then(|class| self.detach_class(class, packages));

        let interface = self.build(TypeKind::Interface, ident, line, packages);
        if let Some(class) = dropped {
            self.hand_over(class, interface);
        }
        interface
    }

    /// Resolve a type whose kind is unknown.
    ///
    /// Tries the exact pair (class first), then, for unqualified names, any
    /// class or interface with that name; otherwise assumes a new class.
    pub fn build_proxy_subject(
        &mut self,
        ident: &TypeIdentifier,
        packages: &mut PackageRegistry,
    ) -> TypeId {
        if let Some(id) = self.find_class(ident).or_else(|| self.find_interface(ident)) {
            trace!("[TYPES] proxy subject '{}' exact -> {:?}", ident, id);
            return id;
        }
        if ident.is_default() {
            let best = first_registered(&self.classes, &ident.normalized_name)
                .or_else(|| first_registered(&self.interfaces, &ident.normalized_name));
            if let Some(id) = best {
                trace!("[TYPES] proxy subject '{}' best match -> {:?}", ident, id);
                return id;
            }
        }
        self.build_class(ident, 0, packages)
    }

    /// Exact class lookup at (normalized name, package)
    pub fn find_class(&self, ident: &TypeIdentifier) -> Option<TypeId> {
        exact(&self.classes, ident)
    }

    /// Exact interface lookup at (normalized name, package)
    pub fn find_interface(&self, ident: &TypeIdentifier) -> Option<TypeId> {
        exact(&self.interfaces, ident)
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeNode> {
        self.nodes.get_mut(id.index())
    }

    /// All nodes, detached ones included
    pub fn iter(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }

    /// Number of classes currently registered
    pub fn class_count(&self) -> usize {
        self.classes.values().map(IndexMap::len).sum()
    }

    /// Number of interfaces currently registered
    pub fn interface_count(&self) -> usize {
        self.interfaces.values().map(IndexMap::len).sum()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn build(
        &mut self,
        kind: TypeKind,
        ident: &TypeIdentifier,
        line: u32,
        packages: &mut PackageRegistry,
    ) -> TypeId {
        // 1) exact match
        if let Some(id) = exact(self.slots(kind), ident) {
            return id;
        }

        // 2) promote a default-package node into the requested package
        if !ident.is_default() {
            let promoted = self
                .slots_mut(kind)
                .get_mut(&ident.normalized_name)
                .and_then(|by_package| by_package.shift_remove(DEFAULT_PACKAGE));
            if let Some(id) = promoted {
                self.register(kind, ident, id);
                packages.remove_type(packages.default_id(), id);
                self.attach(id, &ident.package_name, packages);
                debug!(
                    "[TYPES] promoted {} '{}' from {} to '{}'",
                    kind, ident.local_name, DEFAULT_PACKAGE, ident.package_name
                );
                return id;
            }
        }

        // 3) reuse any existing node instead of guessing another default one
        if ident.is_default() {
            if let Some(id) = first_registered(self.slots(kind), &ident.normalized_name) {
                trace!(
                    "[TYPES] reusing {} {:?} for unqualified '{}'",
                    kind, id, ident.local_name
                );
                return id;
            }
        }

        // 4) create
        let id = TypeId::from_index(self.nodes.len());
        let mut node = TypeNode::new(id, kind, ident.local_name.clone(), line);
        node.set_source_file(SourceFileId::unknown());
        self.nodes.push(node);
        self.register(kind, ident, id);
        self.attach(id, &ident.package_name, packages);
        trace!("[TYPES] new {} '{}' -> {:?}", kind, ident, id);
        id
    }

    /// Remove a class from its package and from the class map.
    fn detach_class(&mut self, id: TypeId, packages: &mut PackageRegistry) -> Option<TypeId> {
        let package = self.node(id).package()?;
        packages.remove_type(package, id);

        let normalized = self.node(id).normalized_name().to_string();
        if let Some(package_name) = packages.get(package).map(|p| p.name().to_string()) {
            if let Some(by_package) = self.classes.get_mut(&normalized) {
                by_package.shift_remove(&package_name);
            }
        }
        self.classes.retain(|_, by_package| !by_package.is_empty());

        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.set_package(None);
        }
        debug!("[TYPES] dropped class '{}' {:?} in favour of an interface", normalized, id);
        Some(id)
    }

    /// Move everything recorded on a dropped class onto its replacement
    fn hand_over(&mut self, from: TypeId, to: TypeId) {
        if from == to {
            return;
        }
        let split = from.index().max(to.index());
        if split >= self.nodes.len() {
            return;
        }
        let (low, high) = self.nodes.split_at_mut(split);
        let (source, target) = if from < to {
            (&mut low[from.index()], &mut high[0])
        } else {
            (&mut high[0], &mut low[to.index()])
        };
        source.move_members_into(target);

        for node in &mut self.nodes {
            node.replace_child_type(from, to);
        }
        debug!("[TYPES] moved members and links of {:?} to {:?}", from, to);
    }

    fn register(&mut self, kind: TypeKind, ident: &TypeIdentifier, id: TypeId) {
        self.slots_mut(kind)
            .entry(ident.normalized_name.clone())
            .or_default()
            .insert(ident.package_name.clone(), id);
    }

    fn attach(&mut self, id: TypeId, package_name: &str, packages: &mut PackageRegistry) {
        let package = packages.get_or_create(package_name);
        packages.add_type(package, id);
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.set_package(Some(package));
        }
    }

    fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    fn slots(&self, kind: TypeKind) -> &Slots {
        match kind {
            TypeKind::Class => &self.classes,
            TypeKind::Interface => &self.interfaces,
        }
    }

    fn slots_mut(&mut self, kind: TypeKind) -> &mut Slots {
        match kind {
            TypeKind::Class => &mut self.classes,
            TypeKind::Interface => &mut self.interfaces,
        }
    }
}

fn exact(slots: &Slots, ident: &TypeIdentifier) -> Option<TypeId> {
    slots
        .get(&ident.normalized_name)
        .and_then(|by_package| by_package.get(&ident.package_name))
        .copied()
}

fn first_registered(slots: &Slots, normalized_name: &str) -> Option<TypeId> {
    slots
        .get(normalized_name)
        .and_then(|by_package| by_package.values().next())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::IdentifierAnalyzer;
    use crate::internal_types::BuiltinTypes;

    struct Fixture {
        analyzer: IdentifierAnalyzer,
        packages: PackageRegistry,
        types: TypeRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                analyzer: IdentifierAnalyzer::new(BuiltinTypes::new()),
                packages: PackageRegistry::new(),
                types: TypeRegistry::new(),
            }
        }

        fn class(&mut self, name: &str) -> TypeId {
            let ident = self.analyzer.analyze(name);
            self.types.build_class(&ident, 1, &mut self.packages)
        }

        fn interface(&mut self, name: &str) -> TypeId {
            let ident = self.analyzer.analyze(name);
            self.types.build_interface(&ident, 1, &mut self.packages)
        }

        fn subject(&mut self, name: &str) -> TypeId {
            let ident = self.analyzer.analyze(name);
            self.types.build_proxy_subject(&ident, &mut self.packages)
        }

        fn package_name(&self, id: TypeId) -> Option<&str> {
            let package = self.types.get(id)?.package()?;
            self.packages.get(package).map(|p| p.name())
        }

        fn members(&self, package: &str) -> Vec<TypeId> {
            self.packages
                .by_name(package)
                .map(|p| p.types().collect())
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_build_class_is_idempotent() {
        let mut f = Fixture::new();
        let first = f.class("Foo");
        for _ in 0..3 {
            assert_eq!(f.class("Foo"), first);
        }
        assert_eq!(f.types.len(), 1);
        assert_eq!(f.members(DEFAULT_PACKAGE), vec![first]);
    }

    #[test]
    fn test_case_insensitive_keys_keep_first_spelling() {
        let mut f = Fixture::new();
        let a = f.class("Foo");
        let b = f.class("FOO");
        assert_eq!(a, b);
        assert_eq!(f.types.get(a).unwrap().name(), "Foo");
    }

    #[test]
    fn test_default_class_is_promoted() {
        let mut f = Fixture::new();
        let guess = f.class("Foo");
        let declared = f.class("pkg::Foo");

        assert_eq!(guess, declared);
        assert_eq!(f.package_name(declared), Some("pkg"));
        assert!(f.members(DEFAULT_PACKAGE).is_empty());
        assert_eq!(f.members("pkg"), vec![declared]);
    }

    #[test]
    fn test_unqualified_reuses_any_package() {
        let mut f = Fixture::new();
        let declared = f.class("pkg::Foo");
        let reference = f.class("Foo");

        assert_eq!(declared, reference);
        assert_eq!(f.package_name(reference), Some("pkg"));
        assert!(f.members(DEFAULT_PACKAGE).is_empty());
        assert_eq!(f.types.class_count(), 1);
    }

    #[test]
    fn test_reuse_picks_first_registered() {
        let mut f = Fixture::new();
        let a = f.class("a::Foo");
        let b = f.class("b::Foo");
        assert_ne!(a, b);
        assert_eq!(f.class("Foo"), a);
        assert_eq!(f.subject("Foo"), a);
    }

    #[test]
    fn test_distinct_packages_get_distinct_nodes() {
        let mut f = Fixture::new();
        let a = f.class("a::Foo");
        let b = f.class("b::Foo");
        assert_ne!(a, b);
        assert_eq!(f.members("a"), vec![a]);
        assert_eq!(f.members("b"), vec![b]);
    }

    #[test]
    fn test_interface_replaces_default_class() {
        let mut f = Fixture::new();
        let class = f.class("Foo");
        let interface = f.interface("Foo");

        assert_ne!(class, interface);
        assert!(f.types.get(class).unwrap().is_detached());
        assert!(f.types.get(interface).unwrap().is_interface());
        assert_eq!(f.members(DEFAULT_PACKAGE), vec![interface]);
        assert_eq!(f.types.class_count(), 0);
        assert!(f.types.classes.is_empty(), "empty slot maps are compacted");
    }

    #[test]
    fn test_interface_takes_over_dropped_class() {
        let mut f = Fixture::new();
        let child = f.class("Circle");
        let guess = f.class("Shape");
        {
            let node = f.types.get_mut(guess).unwrap();
            node.add_child_type(child);
            node.add_method(crate::node::Method::new("area", 4));
        }
        let base = f.class("Base");
        f.types.get_mut(base).unwrap().add_child_type(guess);

        let interface = f.interface("Shape");
        let node = f.types.get(interface).unwrap();
        assert_eq!(node.child_types(), &[child]);
        assert_eq!(node.methods()[0].name, "area");

        let dropped = f.types.get(guess).unwrap();
        assert!(dropped.child_types().is_empty());
        assert!(dropped.methods().is_empty());
        assert_eq!(f.types.get(base).unwrap().child_types(), &[interface]);
    }

    #[test]
    fn test_class_after_interface_shares_the_pair() {
        let mut f = Fixture::new();
        let interface = f.interface("Foo");
        let class = f.class("Foo");

        assert_ne!(interface, class);
        assert_eq!(f.members(DEFAULT_PACKAGE), vec![interface, class]);
        assert_eq!(f.subject("Foo"), class);

        // a later interface declaration drops the class again
        assert_eq!(f.interface("Foo"), interface);
        assert!(f.types.get(class).unwrap().is_detached());
        assert_eq!(f.members(DEFAULT_PACKAGE), vec![interface]);
    }

    #[test]
    fn test_interface_keeps_class_in_explicit_package() {
        let mut f = Fixture::new();
        let class = f.class("pkg::Foo");
        let interface = f.interface("pkg::Foo");

        assert_ne!(class, interface);
        assert!(!f.types.get(class).unwrap().is_detached());
        assert_eq!(f.members("pkg"), vec![class, interface]);
    }

    #[test]
    fn test_interface_promotion_and_reuse() {
        let mut f = Fixture::new();
        let guess = f.interface("Foo");
        let declared = f.interface("pkg::Foo");
        assert_eq!(guess, declared);
        assert_eq!(f.package_name(declared), Some("pkg"));
        assert_eq!(f.interface("foo"), declared);
        assert_eq!(f.types.interface_count(), 1);
    }

    #[test]
    fn test_promoted_node_is_not_promoted_twice() {
        let mut f = Fixture::new();
        let guess = f.class("Foo");
        let promoted = f.class("a::Foo");
        let other = f.class("b::Foo");

        assert_eq!(guess, promoted);
        assert_ne!(promoted, other);
        assert_eq!(f.package_name(promoted), Some("a"));
        assert_eq!(f.package_name(other), Some("b"));
        assert_eq!(f.class("Foo"), promoted);
    }

    #[test]
    fn test_proxy_subject_prefers_existing_nodes() {
        let mut f = Fixture::new();
        let interface = f.interface("pkg::Reader");
        assert_eq!(f.subject("pkg::Reader"), interface);
        assert_eq!(f.subject("Reader"), interface);
        assert_eq!(f.types.len(), 1);
    }

    #[test]
    fn test_proxy_subject_defaults_to_class() {
        let mut f = Fixture::new();
        let id = f.subject("pkg::Writer");
        let node = f.types.get(id).unwrap();
        assert!(node.is_class());
        assert_eq!(node.line(), 0);
        assert_eq!(f.package_name(id), Some("pkg"));
    }

    #[test]
    fn test_qualified_subject_does_not_borrow_other_packages() {
        let mut f = Fixture::new();
        let other = f.class("a::Foo");
        let subject = f.subject("b::Foo");
        assert_ne!(other, subject);
        assert_eq!(f.package_name(subject), Some("b"));
    }

    #[test]
    fn test_builtin_names_land_in_pseudo_package() {
        let mut f = Fixture::new();
        let iterator = f.interface("Iterator");
        assert_eq!(f.package_name(iterator), Some("+spl"));
        assert_eq!(f.interface("::Iterator"), iterator);
    }
}
