// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};
use strum::Display;

use lockbox::{AccessClient, ServiceConfig};
use lockbox_core::CardIdentity;
use lockbox_tests::scenarios;

/// Run lockbox scenarios on simulated hardware against a live access service
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Access service base URL
    #[clap(long, env = "LOCKBOX_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Access service username
    #[clap(long, env = "LOCKBOX_USERNAME")]
    pub username: String,

    /// Access service password
    #[clap(long, env = "LOCKBOX_PASSWORD")]
    pub password: String,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Subcommand, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Tests {
    /// Enroll a virgin card then re-present it
    ///
    /// New cards have no opens so re-presentation is denied
    Enroll {
        /// Number of times to re-present the card
        #[clap(long, default_value = "2")]
        cycles: usize,
    },
    /// Present a card the service already grants access to
    Granted {
        /// Card identity (must have remaining opens on the service)
        #[clap(long)]
        uuid: CardIdentity,
    },
    /// Present a card the service denies
    Denied {
        /// Card identity (unknown or exhausted on the service)
        #[clap(long)]
        uuid: CardIdentity,
    },
}

fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("reqwest");

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via {}", opts.test, opts.base_url);

    let svc = AccessClient::new(&ServiceConfig {
        base_url: opts.base_url.clone(),
        username: opts.username.clone(),
        password: opts.password.clone(),
        ..Default::default()
    })?;

    match opts.test {
        Tests::Enroll { cycles } => {
            let (_r, id) = scenarios::stable_identity(svc, cycles)?;
            info!("enrolled card: {}", id);
        }
        Tests::Granted { uuid } => {
            scenarios::enrolled_card(svc, uuid, true)?;
        }
        Tests::Denied { uuid } => {
            scenarios::enrolled_card(svc, uuid, false)?;
        }
    }

    info!("Test '{}' passed", opts.test);

    Ok(())
}
