//! Function registry
//!
//! First registration wins: a later call with the same name returns the
//! existing function untouched, including its line.

use super::packages::PackageRegistry;
use crate::node::{Function, FunctionId};
use indexmap::IndexMap;

#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Function>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a function and attach new ones to the default package
    pub fn build(&mut self, name: &str, line: u32, packages: &mut PackageRegistry) -> FunctionId {
        if let Some(index) = self.functions.get_index_of(name) {
            return FunctionId::from_index(index);
        }

        let id = FunctionId::from_index(self.functions.len());
        let function = Function::new(id, name, line);
        packages.add_function(function.package(), id);
        self.functions.insert(name.to_string(), function);
        tracing::trace!("[FUNCTIONS] new function '{}' @{} -> {:?}", name, line, id);
        id
    }

    pub fn get(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get_index(id.index()).map(|(_, f)| f)
    }

    pub fn get_mut(&mut self, id: FunctionId) -> Option<&mut Function> {
        self.functions.get_index_mut(id.index()).map(|(_, f)| f)
    }

    pub fn by_name(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
