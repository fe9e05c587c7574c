//! Proxy registry
//!
//! One proxy per case-insensitive identifier. Proxies hold no resolution
//! state; see [`ModelBuilder::resolve_proxy`](crate::ModelBuilder::resolve_proxy).

use crate::node::{ClassOrInterfaceProxy, ProxyId};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct ProxyRegistry {
    /// Proxies keyed by lowercased identifier
    proxies: IndexMap<String, ClassOrInterfaceProxy>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, identifier: &str) -> ProxyId {
        let key = identifier.to_lowercase();
        if let Some(index) = self.proxies.get_index_of(&key) {
            return ProxyId::from_index(index);
        }
        let id = ProxyId::from_index(self.proxies.len());
        self.proxies
            .insert(key, ClassOrInterfaceProxy::new(id, identifier));
        id
    }

    pub fn get(&self, id: ProxyId) -> Option<&ClassOrInterfaceProxy> {
        self.proxies.get_index(id.index()).map(|(_, proxy)| proxy)
    }

    /// All proxy ids in creation order
    pub fn ids(&self) -> Vec<ProxyId> {
        (0..self.proxies.len()).map(ProxyId::from_index).collect()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_proxy_per_identifier() {
        let mut registry = ProxyRegistry::new();
        let a = registry.get_or_create("pkg::Foo");
        let b = registry.get_or_create("PKG::foo");
        let c = registry.get_or_create("pkg::Bar");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(a).unwrap().identifier(), "pkg::Foo");
        assert_eq!(registry.ids(), vec![a, c]);
    }
}
