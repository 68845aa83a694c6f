// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the lockbox access service

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{debug, info, warn, LevelFilter};

use lockbox::{api::Endpoint, AccessClient, CardIdentity, Config};

mod helpers;
use helpers::*;

/// Lockbox command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Configuration file
    #[clap(long, default_value = "lockbox.toml", env = "LOCKBOX_CONFIG")]
    config: PathBuf,

    /// Override the configured service base URL
    #[clap(long, env = "LOCKBOX_BASE_URL")]
    base_url: Option<String>,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Subcommand)]
#[non_exhaustive]
enum Actions {
    /// Register a card identity with the service
    Enroll {
        /// Card identity (32 hex characters)
        #[clap(long)]
        uuid: CardIdentity,
    },

    /// Check whether a card identity is granted access
    Check {
        /// Card identity (32 hex characters)
        #[clap(long)]
        uuid: CardIdentity,
    },

    /// Generate a random card identity
    NewIdentity,

    /// Display the loaded configuration (secrets masked)
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("reqwest");
    c.add_filter_ignore_str("rustls");

    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    // Load configuration, falling back to defaults where not present
    let mut cfg = match args.config.is_file() {
        true => Config::load(&args.config)?,
        false => {
            warn!(
                "No configuration at '{}', using defaults",
                args.config.display()
            );
            Config::default()
        }
    };

    if let Some(u) = &args.base_url {
        cfg.service.base_url = u.clone();
    }

    debug!("Executing command: {:?}", args.cmd);

    match args.cmd {
        Actions::Enroll { uuid } => {
            let c = AccessClient::new(&cfg.service)?;

            info!("enrolling card: {}", uuid);

            let status = c.request(Endpoint::Enroll, &uuid)?;

            info!("response: {} ({})", status, describe_status(status));
        }
        Actions::Check { uuid } => {
            let c = AccessClient::new(&cfg.service)?;

            info!("checking access for card: {}", uuid);

            let status = c.request(Endpoint::CheckAccess, &uuid)?;

            info!("response: {} ({})", status, describe_status(status));
            info!("access granted: {}", lockbox::api::is_granted(status));
        }
        Actions::NewIdentity => {
            let id = CardIdentity::random(&mut rand_core::OsRng);

            println!("{id}");
        }
        Actions::ShowConfig => {
            let s = toml::to_string_pretty(&cfg.redacted())?;

            println!("{s}");
        }
    }

    Ok(())
}
