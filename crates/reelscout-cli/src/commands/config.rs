use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use reelscout_config::{Config, PathManager, API_KEY_ENV, PLACEHOLDER_API_KEY};
use serde_json::json;

/// Load the config file, or defaults when there is none yet.
pub fn load_config() -> Result<Config> {
    let config_file = PathManager::default().config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn run_config(cmd: ConfigCommands, config: Config, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(&config, full, output),
        ConfigCommands::SetKey { key } => set_api_key(config, key, output),
        ConfigCommands::Init => init_config(output),
    }
}

pub fn mask_string(s: &str) -> String {
    if s.is_empty() || s == PLACEHOLDER_API_KEY {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    match (s.get(..2), s.get(s.len() - 2..)) {
        (Some(head), Some(tail)) => format!("{}***{}", head, tail),
        _ => "*".repeat(s.chars().count()),
    }
}

/// Where the effective API key comes from.
fn api_key_origin(config: &Config) -> &'static str {
    let from_env = std::env::var(API_KEY_ENV)
        .map(|v| !v.trim().is_empty() && v.trim() != PLACEHOLDER_API_KEY)
        .unwrap_or(false);
    if from_env {
        "environment"
    } else if config.is_api_key_configured() {
        "config file"
    } else {
        "not set"
    }
}

fn show_config(config: &Config, full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let api_key = config.resolved_api_key().unwrap_or_default();
    let api_key_display = if full { api_key.clone() } else { mask_string(&api_key) };
    let log_file = config
        .logging
        .file
        .as_ref()
        .map(|p| p.display().to_string());

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "exists": config_file.exists(),
            "tmdb": {
                "api_key": api_key_display,
                "api_key_source": api_key_origin(config),
                "base_url": config.tmdb.base_url,
                "image_base_url": config.tmdb.image_base_url,
                "language": config.tmdb.language,
            },
            "feed": {
                "debounce_ms": config.feed.debounce_ms,
                "suggestion_limit": config.feed.suggestion_limit,
                "scroll_threshold_px": config.feed.scroll_threshold_px,
            },
            "logging": {
                "level": config.logging.level,
                "json": config.logging.json,
                "file": log_file,
            },
        }));
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Showing defaults. Run 'reelscout config init' to create one.");
    }

    let section = |title: &str| {
        let mut table = Table::new();
        table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
        table
    };

    let mut info_table = section("Config File");
    info_table.add_row(vec![Cell::new(config_file.display().to_string())]);
    output.println(info_table.to_string());

    let mut tmdb_table = section("TMDB");
    tmdb_table.add_row(vec![
        Cell::new("API Key"),
        Cell::new(format!("{} ({})", api_key_display, api_key_origin(config))),
    ]);
    tmdb_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.tmdb.base_url)]);
    tmdb_table.add_row(vec![Cell::new("Image Base URL"), Cell::new(&config.tmdb.image_base_url)]);
    tmdb_table.add_row(vec![Cell::new("Language"), Cell::new(&config.tmdb.language)]);
    output.println(tmdb_table.to_string());

    let mut feed_table = section("Feed");
    feed_table.add_row(vec![Cell::new("Debounce"), Cell::new(format!("{} ms", config.feed.debounce_ms))]);
    feed_table.add_row(vec![Cell::new("Suggestion Limit"), Cell::new(config.feed.suggestion_limit)]);
    feed_table.add_row(vec![
        Cell::new("Scroll Threshold"),
        Cell::new(config.feed.scroll_threshold_px),
    ]);
    output.println(feed_table.to_string());

    let mut logging_table = section("Logging");
    logging_table.add_row(vec![Cell::new("Level"), Cell::new(&config.logging.level)]);
    logging_table.add_row(vec![
        Cell::new("JSON"),
        Cell::new(match config.logging.json {
            Some(true) => "✓".green().to_string(),
            Some(false) => "✗".red().to_string(),
            None => "auto".to_string(),
        }),
    ]);
    logging_table.add_row(vec![
        Cell::new("File"),
        Cell::new(log_file.unwrap_or_else(|| "stderr".to_string())),
    ]);
    output.println(logging_table.to_string());

    if let Err(e) = config.validate() {
        output.warn(e.to_string());
    }
    Ok(())
}

fn set_api_key(mut config: Config, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(k) => k.trim().to_string(),
        None => prompts::prompt_secret("TMDB API key")?,
    };
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        return Err(color_eyre::eyre::eyre!("API key must not be empty"));
    }

    config.tmdb.api_key = key;
    let config_file = PathManager::default().config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("API key saved to {}", config_file.display()));
    if api_key_origin(&config) == "environment" {
        output.warn(format!("{} is set and takes precedence over the saved key", API_KEY_ENV));
    }
    Ok(())
}

fn init_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists()
        && !prompts::prompt_yes_no(
            &format!("{} already exists. Overwrite it?", config_file.display()),
            Some(false),
        )?
    {
        output.info("Keeping the existing configuration");
        return Ok(());
    }

    let mut config = Config::default();
    config.tmdb.api_key = prompts::prompt_string("TMDB API key (leave empty to use TMDB_API_KEY)", None)?
        .trim()
        .to_string();
    config.tmdb.language = prompts::prompt_string("Language", Some(&config.tmdb.language))?;
    config.feed.debounce_ms = prompts::prompt_number("Search debounce (ms)", config.feed.debounce_ms)?;
    if prompts::prompt_yes_no("Write logs to a file?", Some(false))? {
        config.logging.file = Some(path_manager.log_file());
    }

    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration is invalid: {}", e))?;
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create config directories: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    Ok(())
}
