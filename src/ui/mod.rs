pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, header, muted, package_tree, section, status, success, timing, type_line, warn,
};
pub use table::{packages_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
