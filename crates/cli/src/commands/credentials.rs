//! Stored LOGIN credential commands and the prompt-with-retry flow.
//!
//! Responsibilities:
//! - Save, check, and clear the encrypted credential file.
//! - Obtain a master password from the environment or a prompt when enabled.
//! - Re-prompt a bounded number of times when the master password is wrong.
//!
//! Does NOT handle:
//! - Encryption and key derivation (see `olap_config::credentials`).
//!
//! Invariants:
//! - Without a terminal nothing is prompted; failures are returned as errors.
//! - Passwords are never printed.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use olap_config::constants::MAX_PASSWORD_ATTEMPTS;
use olap_config::{AppConfig, CredentialError, CredentialRecord, CredentialVault, DecryptFailure};
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

use crate::args::OutputFormat;
use crate::interactive;

#[derive(Subcommand, Debug, Clone)]
pub enum CredentialsCommand {
    /// Encrypt and store domain, username, and password for LOGIN auth
    Save {
        /// Windows domain (defaults to OLAP_DOMAIN)
        #[arg(long)]
        domain: Option<String>,

        /// Account name
        #[arg(long)]
        username: Option<String>,
    },

    /// Verify that stored credentials decrypt on this machine
    Check,

    /// Delete stored credentials
    Clear,
}

/// Credentials were needed but could not be asked for.
#[derive(Debug, Error)]
pub enum CredentialPromptError {
    #[error("{what} is required but no terminal is available to prompt for it")]
    NoTerminal { what: &'static str },

    #[error("Master password rejected after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

#[derive(Serialize)]
struct CheckReport<'a> {
    auth_method: String,
    credentials_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    master_password: bool,
}

/// Next step after the credential file failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Ask for domain, username, and password again and overwrite the file.
    Reenter,
    /// Ask for the master password again.
    RetryPassphrase,
    /// The master password was rejected `MAX_PASSWORD_ATTEMPTS` times.
    Exhausted,
    /// Return the load error as is.
    Fail,
}

/// Decides how to recover from a failed load on attempt number `attempt`.
///
/// Nothing is recoverable without a terminal. A key mismatch is blamed on the
/// master password only when the user typed it; otherwise the file is stale
/// (other machine or account) and its contents are entered again.
fn recovery_for(
    err: &CredentialError,
    can_prompt: bool,
    asks_passphrase: bool,
    attempt: u32,
) -> Recovery {
    let CredentialError::Decrypt { reason, .. } = err else {
        return Recovery::Fail;
    };
    if !can_prompt {
        return Recovery::Fail;
    }
    match reason {
        DecryptFailure::KeyMismatch if asks_passphrase => {
            if attempt >= MAX_PASSWORD_ATTEMPTS {
                Recovery::Exhausted
            } else {
                Recovery::RetryPassphrase
            }
        }
        DecryptFailure::Missing | DecryptFailure::Malformed(_) | DecryptFailure::KeyMismatch => {
            Recovery::Reenter
        }
    }
}

pub fn run(command: CredentialsCommand, config: &AppConfig, output: OutputFormat) -> Result<()> {
    match command {
        CredentialsCommand::Save { domain, username } => run_save(config, domain, username),
        CredentialsCommand::Check => run_check(config, output),
        CredentialsCommand::Clear => run_clear(config),
    }
}

fn run_save(config: &AppConfig, domain: Option<String>, username: Option<String>) -> Result<()> {
    if !interactive::is_interactive() {
        return Err(CredentialPromptError::NoTerminal { what: "Password" }.into());
    }
    if !config.secrets().auth_method.requires_password() {
        eprintln!(
            "Note: auth method is {}; saved credentials are used only with LOGIN",
            config.secrets().auth_method
        );
    }
    let passphrase = master_password(config, true)?;
    let mut vault = CredentialVault::for_this_machine()?;
    if let Some(passphrase) = passphrase {
        vault = vault.with_passphrase(passphrase);
    }
    prompt_and_save(config, &vault, domain, username)?;
    Ok(())
}

fn run_check(config: &AppConfig, output: OutputFormat) -> Result<()> {
    let secrets = config.secrets();
    let path = &secrets.credentials_file;
    let record = obtain(config)?;

    match output {
        OutputFormat::Json => {
            let report = CheckReport {
                auth_method: secrets.auth_method.to_string(),
                credentials_required: record.is_some(),
                path: record.as_ref().map(|_| path.as_path()),
                domain: record.as_ref().map(|r| r.domain.as_str()),
                username: record.as_ref().map(|r| r.username.as_str()),
                master_password: secrets.use_master_password,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => match &record {
            Some(record) => println!(
                "Credentials OK for {}\\{} ({})",
                record.domain,
                record.username,
                path.display()
            ),
            None => println!(
                "Auth method {} uses no stored credentials",
                secrets.auth_method
            ),
        },
    }
    Ok(())
}

fn run_clear(config: &AppConfig) -> Result<()> {
    let path = &config.secrets().credentials_file;
    if CredentialVault::delete(path)? {
        println!("Deleted credentials at {}", path.display());
    } else {
        println!("No credentials stored at {}", path.display());
    }
    Ok(())
}

/// Loads the stored credentials when the auth method needs them.
///
/// Returns `None` for auth methods without a password; the file is not read.
/// With a terminal, a missing or unreadable file leads to new credentials being
/// asked for and saved, and a master password typed at the prompt is asked for
/// again up to `MAX_PASSWORD_ATTEMPTS` times in total.
pub fn obtain(config: &AppConfig) -> Result<Option<CredentialRecord>> {
    let secrets = config.secrets();
    if !secrets.auth_method.requires_password() {
        tracing::debug!(auth_method = %secrets.auth_method, "Stored credentials not needed");
        return Ok(None);
    }

    let path = &secrets.credentials_file;
    let can_prompt = interactive::is_interactive();
    let asks_passphrase = secrets.use_master_password && secrets.master_password.is_none();
    if asks_passphrase && !can_prompt {
        return Err(CredentialPromptError::NoTerminal {
            what: "Master password",
        }
        .into());
    }
    let machine = CredentialVault::for_this_machine()?;

    let mut attempt = 1;
    loop {
        let vault = if !secrets.use_master_password {
            machine.clone()
        } else if let Some(pw) = &secrets.master_password {
            machine.clone().with_passphrase(pw.clone())
        } else if CredentialVault::exists(path) {
            let pw = interactive::prompt_secret("Master password", false)?;
            machine.clone().with_passphrase(pw)
        } else {
            let pw = interactive::prompt_secret("New master password", true)?;
            machine.clone().with_passphrase(pw)
        };

        let err = match vault.load(path) {
            Ok(record) => return Ok(Some(record)),
            Err(err) => err,
        };
        match recovery_for(&err, can_prompt, asks_passphrase, attempt) {
            Recovery::Fail => return Err(err.into()),
            Recovery::Exhausted => {
                return Err(CredentialPromptError::AttemptsExhausted { attempts: attempt }.into());
            }
            Recovery::RetryPassphrase => {
                tracing::warn!(attempt, "Master password rejected");
                eprintln!("Wrong master password ({attempt}/{MAX_PASSWORD_ATTEMPTS}), try again.");
                attempt += 1;
            }
            Recovery::Reenter => {
                if !err.is_missing() {
                    tracing::warn!(error = %err, "Stored credentials unusable; asking again");
                    eprintln!("{err}. Enter the credentials again to replace the file.");
                }
                return prompt_and_save(config, &vault, None, None).map(Some);
            }
        }
    }
}

fn master_password(config: &AppConfig, confirm: bool) -> Result<Option<SecretString>> {
    let secrets = config.secrets();
    if !secrets.use_master_password {
        return Ok(None);
    }
    if let Some(pw) = &secrets.master_password {
        return Ok(Some(pw.clone()));
    }
    if !interactive::is_interactive() {
        return Err(CredentialPromptError::NoTerminal {
            what: "Master password",
        }
        .into());
    }
    interactive::prompt_secret("Master password", confirm).map(Some)
}

fn prompt_and_save(
    config: &AppConfig,
    vault: &CredentialVault,
    domain: Option<String>,
    username: Option<String>,
) -> Result<CredentialRecord> {
    if !interactive::is_interactive() {
        return Err(CredentialPromptError::NoTerminal { what: "Password" }.into());
    }

    let domain = match domain {
        Some(domain) => domain,
        None => interactive::prompt_text("Domain", config.secrets().domain.as_deref())?,
    };
    let username = match username {
        Some(username) => username,
        None => interactive::prompt_text("Username", None)?,
    };
    let password = interactive::prompt_secret("Password", true)?;

    let record = CredentialRecord::new(domain, username, password);
    let path = &config.secrets().credentials_file;
    vault.save(path, &record)?;
    eprintln!("Credentials saved to {}", path.display());
    Ok(record)
}
