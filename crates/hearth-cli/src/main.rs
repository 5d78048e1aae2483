//! Hearth CLI - administer device tokens, the recovery phrase and new-device
//! pairing on a Hearth server.
//!
//! Every command opens the token document named by the resolved
//! configuration, so it can run next to the server process: both sides
//! serialize on the same lock file.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use hearth_config::Config;

mod commands;
mod config_bridge;
mod theme;

use commands::{config, devices, pairing, recovery};

/// Hearth - device credential administration
#[derive(Parser)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Additional configuration file (highest precedence)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage device tokens
    Devices {
        /// Token of the device issuing the command
        #[arg(long, env = "HEARTH_TOKEN", hide_env_values = true, global = true)]
        token: Option<String>,

        #[command(subcommand)]
        command: DeviceCommands,
    },

    /// Manage the recovery phrase
    Recovery {
        #[command(subcommand)]
        command: RecoveryCommands,
    },

    /// Manage new-device pairing
    Pairing {
        #[command(subcommand)]
        command: PairingCommands,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DeviceCommands {
    /// List devices
    List,
    /// Issue a token for a new device
    Create {
        /// Display name (non-alphanumerics become '_')
        name: String,
    },
    /// Delete a device
    Delete {
        /// Display name of the device to delete
        name: String,
    },
    /// Replace the token given with --token
    Rotate,
}

#[derive(Subcommand)]
enum RecoveryCommands {
    /// Generate a new recovery phrase, replacing any existing one
    Generate {
        /// Expiry as RFC 3339, e.g. 2030-01-01T00:00:00Z
        #[arg(long, value_name = "TIME")]
        expires_at: Option<DateTime<Utc>>,

        /// Number of times the phrase may be used
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        uses: Option<i64>,
    },
    /// Show recovery phrase status
    Status,
    /// Use the recovery phrase to create a device token
    Redeem {
        /// The phrase, quoted as one argument
        phrase: String,
        /// Display name for the new device
        device_name: String,
    },
}

#[derive(Subcommand)]
enum PairingCommands {
    /// Create a pairing secret, replacing any pending one
    Create,
    /// Show whether a pairing secret is pending
    Status,
    /// Drop the pending pairing secret
    Invalidate,
    /// Use a pairing secret to create a device token
    Redeem {
        /// The pairing secret
        secret: String,
        /// Display name for the new device
        device_name: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration with value sources
    Show {
        /// Print JSON instead of annotated TOML
        #[arg(long)]
        json: bool,
    },
    /// Show which files and variables are consulted
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = if let Ok(r) = &resolved {
        let mut lc = config_bridge::to_log_config(&r.config);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        let level = if cli.verbose { "debug" } else { "warn" };
        hearth_telemetry::LogConfig::new(level)
    };
    if let Err(e) = hearth_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Commands::Config {
        command: ConfigCommands::Paths,
    } = &cli.command
    {
        return config::paths(cli.config.as_deref());
    }

    let resolved = resolved.context("failed to load configuration")?;
    tracing::debug!(files = ?resolved.loaded_files, "configuration loaded");

    match cli.command {
        Commands::Devices { token, command } => {
            handle_devices(&resolved.config, token.as_deref(), command)
        },
        Commands::Recovery { command } => handle_recovery(&resolved.config, command),
        Commands::Pairing { command } => handle_pairing(&resolved.config, command),
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => config::show(&resolved, json),
            ConfigCommands::Paths => config::paths(cli.config.as_deref()),
        },
    }
}

fn handle_devices(config: &Config, token: Option<&str>, command: DeviceCommands) -> Result<()> {
    let creds = config_bridge::open_credentials(config)?;
    match command {
        DeviceCommands::List => devices::list(&creds, token),
        DeviceCommands::Create { name } => devices::create(&creds, &name),
        DeviceCommands::Delete { name } => devices::delete(&creds, &name, token),
        DeviceCommands::Rotate => devices::rotate(&creds, token),
    }
}

fn handle_recovery(config: &Config, command: RecoveryCommands) -> Result<()> {
    let creds = config_bridge::open_credentials(config)?;
    match command {
        RecoveryCommands::Generate { expires_at, uses } => {
            recovery::generate(&creds, expires_at, uses)
        },
        RecoveryCommands::Status => recovery::status(&creds),
        RecoveryCommands::Redeem {
            phrase,
            device_name,
        } => recovery::redeem(&creds, &phrase, &device_name),
    }
}

fn handle_pairing(config: &Config, command: PairingCommands) -> Result<()> {
    let creds = config_bridge::open_credentials(config)?;
    match command {
        PairingCommands::Create => pairing::create(&creds),
        PairingCommands::Status => pairing::status(&creds),
        PairingCommands::Invalidate => pairing::invalidate(&creds),
        PairingCommands::Redeem {
            secret,
            device_name,
        } => pairing::redeem(&creds, &secret, &device_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recovery_generate_flags() {
        let cli = Cli::try_parse_from([
            "hearth",
            "recovery",
            "generate",
            "--expires-at",
            "2030-01-01T00:00:00Z",
            "--uses",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Recovery {
                command: RecoveryCommands::Generate { expires_at, uses },
            } => {
                assert_eq!(expires_at.unwrap().to_rfc3339(), "2030-01-01T00:00:00+00:00");
                assert_eq!(uses, Some(3));
            },
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn negative_uses_reach_validation() {
        let cli =
            Cli::try_parse_from(["hearth", "recovery", "generate", "--uses", "-2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Recovery {
                command: RecoveryCommands::Generate { uses: Some(-2), .. }
            }
        ));
    }

    #[test]
    fn token_flag_applies_to_device_subcommands() {
        let cli = Cli::try_parse_from([
            "hearth", "--config", "/tmp/h.toml", "devices", "delete", "phone", "--token", "abc",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/h.toml")));
        match cli.command {
            Commands::Devices {
                token,
                command: DeviceCommands::Delete { name },
            } => {
                assert_eq!(token.as_deref(), Some("abc"));
                assert_eq!(name, "phone");
            },
            _ => panic!("wrong command"),
        }
    }
}
