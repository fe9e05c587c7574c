use crate::output::is_quiet;
use crate::snapshot::{PackageSnapshot, TypeSnapshot};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn timing(elapsed: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

/// `  🔷 Parser  (line 12, src/Parser.php)`
pub fn type_line(ty: &TypeSnapshot) -> String {
    let icon = match ty.kind {
        crate::TypeKind::Class => Icons::CLASS,
        crate::TypeKind::Interface => Icons::INTERFACE,
    };
    let mut location = format!("line {}", ty.line);
    if let Some(file) = &ty.file {
        location.push_str(", ");
        location.push_str(file);
    }
    format!(
        "  {} {}  {}",
        icon,
        ty.name.style(theme().kind(ty.kind).clone()),
        muted(&format!("({location})"))
    )
}

/// Print a package with its types and functions
pub fn package_tree(package: &PackageSnapshot) {
    println!(
        "{} {}",
        Icons::PACKAGE,
        package.name.style(theme().header.clone())
    );
    for ty in &package.types {
        println!("{}", type_line(ty));
        if !ty.children.is_empty() {
            println!("      {} {}", Icons::LINK, dim(&ty.children.join(", ")));
        }
    }
    for function in &package.functions {
        println!(
            "  {} {}()  {}",
            Icons::FUNCTION,
            function.name,
            muted(&format!("(line {})", function.line))
        );
    }
}
