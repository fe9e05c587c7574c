use crate::internal_types::BuiltinTypes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Rendering of the `build` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CodemodelConfig {
    /// Default discovery-event file
    pub events: Option<String>,
    pub format: Option<OutputFormat>,
    /// Extra built-in type name → pseudo-package entries
    #[serde(default)]
    pub internal_types: BTreeMap<String, String>,
}

impl CodemodelConfig {
    /// Built-in type table extended with the configured entries
    pub fn builtin_types(&self) -> BuiltinTypes {
        self.internal_types
            .iter()
            .fold(BuiltinTypes::new(), |types, (name, package)| {
                types.with_extra(name, package.as_str())
            })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("codemodel.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CodemodelConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CodemodelConfig = toml::from_str(&contents)?;
    tracing::debug!(
        "Loaded config from {} ({} extra internal types)",
        path.display(),
        config.internal_types.len()
    );
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CodemodelConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal_types::InternalTypes;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("codemodel.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codemodel.toml");
        let mut config = CodemodelConfig {
            events: Some("events.jsonl".to_string()),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        config
            .internal_types
            .insert("Redis".to_string(), "+redis".to_string());

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.events.as_deref(), Some("events.jsonl"));
        assert_eq!(loaded.format, Some(OutputFormat::Json));
        assert_eq!(loaded.internal_types.get("Redis").map(String::as_str), Some("+redis"));
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codemodel.toml");
        let config = CodemodelConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &config, true).is_ok());
    }

    #[test]
    fn test_parse_internal_types_table() {
        let config: CodemodelConfig = toml::from_str(
            r#"
events = "build/events.jsonl"
format = "text"

[internal_types]
Memcached = "+memcached"
"#,
        )
        .unwrap();

        let types = config.builtin_types();
        assert_eq!(types.package_for("memcached"), Some("+memcached"));
        assert_eq!(types.package_for("Iterator"), Some("+spl"));
    }

    #[test]
    fn test_bad_format_is_rejected() {
        let parsed: Result<CodemodelConfig, _> = toml::from_str("format = \"xml\"");
        assert!(parsed.is_err());
    }
}
