use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{PageSelectors, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring prlens.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Secrets are stored in the local config file; protect your filesystem accordingly.");
    println!();

    apply_prompt(
        "Explanation provider (gemini/endpoint)",
        &mut cfg.provider,
        false,
    )?;
    apply_prompt("Gemini API key", &mut cfg.gemini_api_key, true)?;
    apply_prompt("Gemini model", &mut cfg.gemini_model, false)?;
    apply_prompt(
        "Explanation endpoint URL (endpoint provider)",
        &mut cfg.endpoint_url,
        false,
    )?;
    apply_number_prompt(
        "Explanation timeout in seconds (empty waits indefinitely)",
        &mut cfg.explain_timeout_secs,
    )?;

    apply_prompt("Settle mode (fixed/poll)", &mut cfg.settle_mode, false)?;
    apply_number_prompt("Delay after reload (ms)", &mut cfg.reload_delay_ms)?;
    apply_number_prompt("Delay after opening the files tab (ms)", &mut cfg.tab_delay_ms)?;
    apply_number_prompt("Delay after scrolling the diff (ms)", &mut cfg.scroll_delay_ms)?;
    apply_number_prompt("Poll interval (ms)", &mut cfg.poll_interval_ms)?;
    apply_number_prompt("Poll max attempts", &mut cfg.poll_max_attempts)?;

    apply_prompt(
        "Clipboard command (e.g., wl-copy, pbcopy)",
        &mut cfg.clipboard_command,
        false,
    )?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Explanation provider: {}", display_value(&cfg.provider));
    println!("Gemini API key: {}", mask_secret(&cfg.gemini_api_key));
    println!("Gemini model: {}", display_value(&cfg.gemini_model));
    println!("Explanation endpoint: {}", display_value(&cfg.endpoint_url));
    println!(
        "Explanation timeout (s): {}",
        display_number(cfg.explain_timeout_secs)
    );
    println!("Settle mode: {}", display_value(&cfg.settle_mode));
    println!("Reload delay (ms): {}", display_number(cfg.reload_delay_ms));
    println!("Files tab delay (ms): {}", display_number(cfg.tab_delay_ms));
    println!("Scroll delay (ms): {}", display_number(cfg.scroll_delay_ms));
    println!("Poll interval (ms): {}", display_number(cfg.poll_interval_ms));
    println!("Poll max attempts: {}", display_number(cfg.poll_max_attempts));
    println!("Clipboard command: {}", display_value(&cfg.clipboard_command));

    let selectors = cfg.selectors.unwrap_or_default();
    let marker = if selectors == PageSelectors::default() {
        " (default)"
    } else {
        ""
    };
    println!("Page selectors{marker}:");
    println!("  summary header: {}", selectors.summary_header);
    println!("  file name: {}", selectors.file_name);
    println!("  line content: {}", selectors.line_content);
    println!("  files tab: {}", selectors.files_tab);
    println!("  changes viewer: {}", selectors.changes_viewer);

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    match prompt(field, target.as_deref(), secret)? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn apply_number_prompt<T>(field: &str, target: &mut Option<T>) -> AppResult<()>
where
    T: std::str::FromStr + ToString,
{
    let current = target.as_ref().map(ToString::to_string);
    loop {
        match prompt(field, current.as_deref(), false)? {
            PromptAction::Keep => return Ok(()),
            PromptAction::Clear => {
                *target = None;
                return Ok(());
            }
            PromptAction::Set(value) => match parse_number::<T>(&value) {
                Some(number) => {
                    *target = Some(number);
                    return Ok(());
                }
                None => println!("'{value}' is not a whole number, try again."),
            },
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().replace('_', "").parse::<T>().ok()
}

fn prompt(field: &str, current: Option<&str>, secret: bool) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();

    if trimmed.is_empty() {
        Ok(PromptAction::Keep)
    } else if trimmed == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(trimmed.to_string()))
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_number<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<default>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.len() > 6 => {
            let prefix = &token[..3];
            let suffix = &token[token.len() - 3..];
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
