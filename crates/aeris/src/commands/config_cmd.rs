//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::Input;

use aeris_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", aeris_config::config_path().display());
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init => init(global),
    }
}

// ── show ────────────────────────────────────────────────────────────

/// Format config for display, masking the API key.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();
    if cfg.api_key.is_some() {
        let _ = writeln!(out, "api_key = \"****\"");
    }
    if let Some(ref env) = cfg.api_key_env {
        let _ = writeln!(out, "api_key_env = \"{env}\"");
    }
    if let Some(lat) = cfg.latitude {
        let _ = writeln!(out, "latitude = {lat}");
    }
    if let Some(lon) = cfg.longitude {
        let _ = writeln!(out, "longitude = {lon}");
    }
    let _ = writeln!(out, "language = \"{}\"", cfg.language);
    let _ = writeln!(out, "scan_interval_minutes = {}", cfg.scan_interval_minutes);
    let _ = write!(out, "timeout_secs = {}", cfg.timeout_secs);
    out
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = aeris_config::load()?;
    output::print_output(&format_config_redacted(&cfg), global.quiet);
    Ok(())
}

// ── init ────────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Prompt {
        message: e.to_string(),
    }
}

/// Interactive setup wizard. Collects credential, coordinates, language,
/// and interval with the same bounds the coordinator enforces, then
/// writes the config file.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let existing = aeris_config::load().unwrap_or_default();

    let api_key: String = Input::new()
        .with_prompt("Google Air Quality API key")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("API key must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let latitude: f64 = Input::new()
        .with_prompt("Latitude")
        .validate_with(|input: &f64| -> Result<(), &str> {
            if input.is_finite() && (-90.0..=90.0).contains(input) {
                Ok(())
            } else {
                Err("latitude must be between -90 and 90")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let longitude: f64 = Input::new()
        .with_prompt("Longitude")
        .validate_with(|input: &f64| -> Result<(), &str> {
            if input.is_finite() && (-180.0..=180.0).contains(input) {
                Ok(())
            } else {
                Err("longitude must be between -180 and 180")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let language: String = Input::new()
        .with_prompt("Language code")
        .default(existing.language.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let scan_interval_minutes: u64 = Input::new()
        .with_prompt("Polling interval (minutes)")
        .default(existing.scan_interval_minutes)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input >= 1 {
                Ok(())
            } else {
                Err("interval must be at least 1 minute")
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    let config = Config {
        api_key: Some(api_key),
        api_key_env: existing.api_key_env,
        latitude: Some(latitude),
        longitude: Some(longitude),
        language,
        scan_interval_minutes,
        timeout_secs: existing.timeout_secs,
    };

    // Catch anything the prompts let through before touching disk.
    aeris_config::resolve(&config)?;
    aeris_config::save(&config)?;

    if !global.quiet {
        println!("Wrote {}", aeris_config::config_path().display());
    }
    Ok(())
}
