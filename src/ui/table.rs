use crate::snapshot::PackageSnapshot;
use crate::TypeKind;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct PackageRow {
    #[tabled(rename = "Package")]
    pub name: String,
    #[tabled(rename = "Classes")]
    pub classes: usize,
    #[tabled(rename = "Interfaces")]
    pub interfaces: usize,
    #[tabled(rename = "Functions")]
    pub functions: usize,
}

impl From<&PackageSnapshot> for PackageRow {
    fn from(package: &PackageSnapshot) -> Self {
        let interfaces = package
            .types
            .iter()
            .filter(|t| t.kind == TypeKind::Interface)
            .count();
        Self {
            name: package.name.clone(),
            classes: package.types.len() - interfaces,
            interfaces,
            functions: package.functions.len(),
        }
    }
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One row per package with its type and function counts
pub fn packages_table(packages: &[PackageSnapshot]) -> String {
    if packages.is_empty() {
        return String::new();
    }
    let rows: Vec<PackageRow> = packages.iter().map(PackageRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelBuilder, ModelSnapshot};

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(packages_table(&[]).is_empty());
    }

    #[test]
    fn test_stats_table() {
        let table = stats_table(&[("Packages", "2".to_string())]);
        assert!(table.contains("Metric"));
        assert!(table.contains("Packages"));
    }

    #[test]
    fn test_package_row_counts() {
        let mut builder = ModelBuilder::new();
        builder.build_class("app::A", 1);
        builder.build_interface("app::I", 2);
        let snapshot = ModelSnapshot::collect(&mut builder);

        let row = PackageRow::from(&snapshot.packages[0]);
        assert_eq!((row.classes, row.interfaces, row.functions), (1, 1, 0));
        assert!(packages_table(&snapshot.packages).contains("app"));
    }
}
