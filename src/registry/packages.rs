//! Package registry
//!
//! Packages are created lazily, one per name, and never removed. The default
//! package is created up front and always has id 0.

use crate::identifier::DEFAULT_PACKAGE;
use crate::node::{FunctionId, Package, PackageId, TypeId};
use indexmap::IndexMap;

#[derive(Debug)]
pub struct PackageRegistry {
    /// Packages keyed by name; the map index is the [`PackageId`]
    packages: IndexMap<String, Package>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        let mut packages = IndexMap::new();
        let default_id = PackageId::default_package();
        packages.insert(
            DEFAULT_PACKAGE.to_string(),
            Package::new(default_id, DEFAULT_PACKAGE),
        );
        Self { packages }
    }

    /// Get the package with this name, creating it on first request
    pub fn get_or_create(&mut self, name: &str) -> PackageId {
        if let Some(index) = self.packages.get_index_of(name) {
            return PackageId::from_index(index);
        }
        let id = PackageId::from_index(self.packages.len());
        tracing::trace!("[PACKAGES] new package '{}' -> {:?}", name, id);
        self.packages.insert(name.to_string(), Package::new(id, name));
        id
    }

    pub fn default_id(&self) -> PackageId {
        PackageId::default_package()
    }

    pub fn default_package(&self) -> &Package {
        &self.packages[PackageId::default_package().index()]
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.packages.get_index(id.index()).map(|(_, package)| package)
    }

    pub fn by_name(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn id_of(&self, name: &str) -> Option<PackageId> {
        self.packages.get_index_of(name).map(PackageId::from_index)
    }

    /// Add a type to a package's set; returns false if it was already a member
    pub fn add_type(&mut self, package: PackageId, ty: TypeId) -> bool {
        self.get_mut(package).is_some_and(|p| p.insert_type(ty))
    }

    /// Remove a type from a package's set; returns false if it was not a member
    pub fn remove_type(&mut self, package: PackageId, ty: TypeId) -> bool {
        self.get_mut(package).is_some_and(|p| p.remove_type(ty))
    }

    pub fn add_function(&mut self, package: PackageId, function: FunctionId) -> bool {
        self.get_mut(package).is_some_and(|p| p.insert_function(function))
    }

    /// All packages in creation order, the default package first
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn get_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        self.packages
            .get_index_mut(id.index())
            .map(|(_, package)| package)
    }
}

impl Default for PackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_package_exists() {
        let registry = PackageRegistry::new();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_package().name(), DEFAULT_PACKAGE);
        assert_eq!(registry.id_of(DEFAULT_PACKAGE), Some(PackageId::default_package()));
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut registry = PackageRegistry::new();
        let a = registry.get_or_create("php::depend");
        let b = registry.get_or_create("php::depend");
        assert_eq!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).unwrap().name(), "php::depend");
        assert_eq!(registry.get_or_create(DEFAULT_PACKAGE), registry.default_id());
    }

    #[test]
    fn test_package_names_are_case_sensitive() {
        let mut registry = PackageRegistry::new();
        let lower = registry.get_or_create("pkg");
        let upper = registry.get_or_create("PKG");
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_type_membership() {
        let mut registry = PackageRegistry::new();
        let pkg = registry.get_or_create("pkg");
        assert!(registry.add_type(pkg, TypeId(0)));
        assert!(!registry.add_type(pkg, TypeId(0)));
        assert!(registry.remove_type(pkg, TypeId(0)));
        assert!(!registry.remove_type(pkg, TypeId(0)));
        assert!(!registry.add_type(PackageId(99), TypeId(0)));
    }

    #[test]
    fn test_iteration_order() {
        let mut registry = PackageRegistry::new();
        registry.get_or_create("b");
        registry.get_or_create("a");
        let names: Vec<_> = registry.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec![DEFAULT_PACKAGE, "b", "a"]);
    }
}
