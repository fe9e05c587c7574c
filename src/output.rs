use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// Check if decorative output is suppressed (`CODEMODEL_QUIET=1`)
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("CODEMODEL_QUIET")
            .map(|v| quiet_value(&v))
            .unwrap_or(false)
    })
}

fn quiet_value(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
