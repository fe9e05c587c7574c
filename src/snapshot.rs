//! Model snapshot - Serializable view of the enumerated packages
//!
//! Built from [`ModelBuilder::packages`] so it sees exactly what a downstream
//! consumer would: forward references materialized, empty default package
//! left out.

use crate::builder::{ModelBuilder, ModelStats};
use crate::identifier::SEPARATOR;
use crate::node::{Function, PackageId, TypeKind, TypeNode};
use crate::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModelSnapshot {
    pub stats: ModelStats,
    pub packages: Vec<PackageSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageSnapshot {
    pub name: String,
    pub types: Vec<TypeSnapshot>,
    pub functions: Vec<FunctionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSnapshot {
    pub name: String,
    pub kind: TypeKind,
    pub line: u32,
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
    pub constants: Vec<String>,
    /// Identifiers this type refers to, as first spelled
    pub dependencies: Vec<String>,
    /// Qualified names of types extending or implementing this one
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSnapshot {
    pub name: String,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub parameters: Vec<String>,
}

impl ModelSnapshot {
    /// Enumerate the model; resolves outstanding proxies first
    pub fn collect(builder: &mut ModelBuilder) -> Self {
        let ids: Vec<PackageId> = builder.packages().iter().map(|p| p.id()).collect();
        let builder: &ModelBuilder = builder;

        let packages = ids
            .into_iter()
            .filter_map(|id| builder.package(id))
            .map(|package| PackageSnapshot {
                name: package.name().to_string(),
                types: package
                    .types()
                    .filter_map(|id| builder.type_node(id))
                    .map(|node| type_snapshot(builder, node))
                    .collect(),
                functions: package
                    .functions()
                    .filter_map(|id| builder.function(id))
                    .map(|function| function_snapshot(builder, function))
                    .collect(),
            })
            .collect();

        Self {
            stats: builder.stats(),
            packages,
        }
    }

    pub fn type_count(&self) -> usize {
        self.packages.iter().map(|p| p.types.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `package::Name` of a registered node, the bare name for a detached one
pub fn qualified_name(builder: &ModelBuilder, node: &TypeNode) -> String {
    match node.package().and_then(|id| builder.package(id)) {
        Some(package) => format!("{}{}{}", package.name(), SEPARATOR, node.name()),
        None => node.name().to_string(),
    }
}

fn file_name(builder: &ModelBuilder, id: crate::SourceFileId) -> Option<String> {
    builder
        .source_file(id)
        .and_then(|file| file.path())
        .map(|path| path.display().to_string())
}

fn type_snapshot(builder: &ModelBuilder, node: &TypeNode) -> TypeSnapshot {
    TypeSnapshot {
        name: node.name().to_string(),
        kind: node.kind(),
        line: node.line(),
        is_abstract: node.is_abstract(),
        file: file_name(builder, node.source_file()),
        methods: node.methods().iter().map(|m| m.name.clone()).collect(),
        properties: node.properties().iter().map(|p| p.name.clone()).collect(),
        constants: node.constants().iter().map(|c| c.name.clone()).collect(),
        dependencies: node
            .dependencies()
            .iter()
            .filter_map(|id| builder.proxy(*id))
            .map(|proxy| proxy.identifier().to_string())
            .collect(),
        children: node
            .child_types()
            .iter()
            .filter_map(|id| builder.type_node(*id))
            .map(|child| qualified_name(builder, child))
            .collect(),
    }
}

fn function_snapshot(builder: &ModelBuilder, function: &Function) -> FunctionSnapshot {
    FunctionSnapshot {
        name: function.name().to_string(),
        line: function.line(),
        file: file_name(builder, function.source_file()),
        parameters: function.parameters().iter().map(|p| p.name.clone()).collect(),
    }
}
