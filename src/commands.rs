use codemodel::config::{self, CodemodelConfig, OutputFormat};
use codemodel::event::{read_events, EventReplayer};
use codemodel::ui::{self, Icons};
use codemodel::{ModelBuilder, ModelSnapshot};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub fn run_version(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} {}",
                "Codemodel".bold().style(ui::theme().info.clone()),
                env!("CARGO_PKG_VERSION").bold()
            );
        }
        OutputFormat::Json => {
            let data = serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
            });
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }
    Ok(())
}

pub fn run_init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config::default_config_path);
    let config = CodemodelConfig {
        events: Some("events.jsonl".to_string()),
        format: Some(OutputFormat::Text),
        ..Default::default()
    };
    config::write_config(&path, &config, force)?;
    ui::success(&format!("Wrote {}", path.display()));
    Ok(())
}

pub fn run_build(
    events: Option<PathBuf>,
    format: Option<OutputFormat>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = config::load_config(config_path)?.unwrap_or_default();
    let events = match events.or_else(|| config.events.as_ref().map(PathBuf::from)) {
        Some(path) => path,
        None => anyhow::bail!(
            "no event file given (use --events or set `events` in {})",
            config::default_config_path().display()
        ),
    };
    let format = format.or(config.format).unwrap_or_default();
    let human = format == OutputFormat::Text;

    let started = Instant::now();
    if human {
        ui::header("Building code model");
        ui::status(Icons::FILE, "Events", &events.display().to_string());
    }

    let mut builder = ModelBuilder::with_internal_types(config.builtin_types());
    let discovered = read_events(&events)?;
    let replayed = EventReplayer::new(&mut builder).replay_all(discovered)?;
    tracing::info!("Replayed {} events from {}", replayed, events.display());

    let snapshot = ModelSnapshot::collect(&mut builder);

    match format {
        OutputFormat::Json => println!("{}", snapshot.to_json()?),
        OutputFormat::Text => {
            ui::section("Packages");
            for package in &snapshot.packages {
                ui::package_tree(package);
            }
            println!("{}", ui::packages_table(&snapshot.packages));

            let stats = &snapshot.stats;
            ui::section("Statistics");
            println!(
                "{}",
                ui::stats_table(&[
                    ("Events", replayed.to_string()),
                    ("Files", stats.files.to_string()),
                    ("Packages", stats.packages.to_string()),
                    ("Classes", stats.classes.to_string()),
                    ("Interfaces", stats.interfaces.to_string()),
                    ("Functions", stats.functions.to_string()),
                    ("Proxies", stats.proxies.to_string()),
                ])
            );
            if stats.detached > 0 {
                ui::warn(&format!(
                    "{} class guess(es) replaced by interfaces",
                    stats.detached
                ));
            }
            ui::timing(&format!("{:.2?}", started.elapsed()));
            ui::success("Model complete");
        }
    }
    Ok(())
}
