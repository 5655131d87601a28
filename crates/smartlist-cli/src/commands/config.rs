use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use smartlist_config::{Config, PathManager};

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output),
        crate::ConfigCommands::Init { force } => init_config(force, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'smartlist config init' to create one.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;
    let secret = |value: &str| {
        if full {
            value.to_string()
        } else {
            mask_string(value)
        }
    };
    let scheduler = config.scheduler_or_default();

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "lists_file": path_manager.lists_file().display().to_string(),
            "trakt": {
                "client_id": secret(&config.trakt.client_id),
                "access_token": secret(&config.trakt.access_token),
                "username": config.trakt.username,
                "api_url": config.trakt.api_url,
            },
            "engine": {
                "chunk_size": config.engine.chunk_size,
                "lookup_delay_ms": config.engine.lookup_delay_ms,
                "requeue_delay_secs": config.engine.requeue_delay_secs,
                "workers": config.engine.workers,
            },
            "scheduler": {
                "schedule": scheduler.schedule,
                "run_on_startup": scheduler.run_on_startup,
            },
            "logging": {
                "level": config.logging.level,
                "file": config.logging.file.as_ref().map(|p| p.display().to_string()),
            },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    let rows = vec![
        ("Config file", config_file.display().to_string()),
        ("Lists file", path_manager.lists_file().display().to_string()),
        ("trakt.client_id", secret(&config.trakt.client_id)),
        ("trakt.access_token", secret(&config.trakt.access_token)),
        ("trakt.username", config.trakt.username.clone()),
        ("trakt.api_url", config.trakt.api_url.clone()),
        ("engine.chunk_size", config.engine.chunk_size.to_string()),
        ("engine.lookup_delay_ms", config.engine.lookup_delay_ms.to_string()),
        ("engine.requeue_delay_secs", config.engine.requeue_delay_secs.to_string()),
        ("engine.workers", config.engine.workers.to_string()),
        ("scheduler.schedule", scheduler.schedule.clone()),
        ("scheduler.run_on_startup", scheduler.run_on_startup.to_string()),
        ("logging.level", config.logging.level.clone()),
        (
            "logging.file",
            config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<stderr>".to_string()),
        ),
    ];

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).fg(comfy_table::Color::Cyan), Cell::new(value)]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is incomplete: {}", e));
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;
    Config::template()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote configuration template to {}", config_file.display()));
    output.info("Fill in [trakt] client_id, username and access_token before running 'smartlist daemon'.");
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("YOUR_CLIENT_ID"), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("abcdef123"), "ab***23");
    }
}
