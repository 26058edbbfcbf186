//! User interaction utilities for the CLI.
//!
//! Responsibilities:
//! - Provide shared helpers for interactive prompts.
//! - Refuse to prompt when stdin is not a terminal.

use std::io::IsTerminal;

use anyhow::{Context, Result, bail};
use secrecy::SecretString;

/// True when prompts can be answered.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Asks for confirmation before deleting `item_name`.
pub fn confirm_delete(item_name: &str, item_type: &str) -> Result<bool> {
    if !is_interactive() {
        bail!("Refusing to delete {item_type} '{item_name}' without a terminal; pass --yes");
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("Delete {item_type} '{item_name}'?"))
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;
    if !confirmed {
        eprintln!("Delete cancelled.");
    }
    Ok(confirmed)
}

/// Prompts for a non-empty line of text, offering `default` when given.
pub fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = dialoguer::Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let value = input
        .interact_text()
        .with_context(|| format!("Failed to read {prompt}"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("{prompt} must not be empty");
    }
    Ok(value)
}

/// Prompts for a secret without echoing it; `confirm` asks for it twice.
pub fn prompt_secret(prompt: &str, confirm: bool) -> Result<SecretString> {
    let mut password = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(false);
    if confirm {
        password = password.with_confirmation("Repeat to confirm", "Values do not match");
    }
    let value = password
        .interact()
        .with_context(|| format!("Failed to read {prompt}"))?;
    Ok(SecretString::new(value.into()))
}
