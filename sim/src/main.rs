// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    net::{Ipv4Addr, TcpListener},
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};

use lockbox::{AccessClient, Config, ServiceConfig};
use lockbox_core::{
    api::AccessService,
    card::{Key, Reader},
    engine::{self, Engine, Report, WakeCause},
    CardIdentity,
};
use lockbox_sim::*;

/// Lockbox simulator
///
/// Runs the access backend over HTTP, or a single device wake cycle
/// against simulated hardware.
#[derive(Clone, Debug, Parser)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Log level
    #[clap(long, default_value = "info", env)]
    log_level: LevelFilter,
}

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Run the HTTP access backend
    Serve {
        #[clap(flatten)]
        opts: ServerOptions,

        /// Preload a card with remaining opens (`<hex>=<opens>`, -1 for unlimited)
        #[clap(long = "card", value_parser = card_opens_from_str)]
        cards: Vec<(CardIdentity, i64)>,
    },
    /// Run a single wake cycle on simulated hardware
    Cycle(CycleOpts),
}

#[derive(Clone, Debug, PartialEq, Parser)]
pub struct CycleOpts {
    /// Lock engaged at wake
    #[clap(long)]
    engaged: bool,

    /// Wake cause
    #[clap(long, default_value = "trigger")]
    wake: WakeCause,

    /// Card in the field (`none`, `virgin`, `enrolled:<hex>`, `foreign`)
    #[clap(long, default_value = "virgin")]
    card: CardKind,

    /// Remaining opens for an enrolled card (in-memory backend only)
    #[clap(long)]
    opens: Option<i64>,

    /// Device key (hex), overridden by `[card]` in the configuration file
    #[clap(long, env = "LOCKBOX_DEVICE_KEY", default_value = "a0a1a2a3a4a5")]
    device_key: Key,

    /// Host configuration file, supplying `[card]`, `[timing]` and `[service]`
    #[clap(long, env = "LOCKBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Link behaviour (`up`, `down`, or polls before connecting)
    #[clap(long, default_value = "up")]
    link: Link,

    /// Access service base URL, uses an in-memory backend if unset
    /// and no configuration file is provided
    #[clap(long, env = "LOCKBOX_BASE_URL")]
    service: Option<String>,

    /// Access service username
    #[clap(long, env = "LOCKBOX_USERNAME", default_value = "lockbox")]
    username: String,

    /// Access service password
    #[clap(long, env = "LOCKBOX_PASSWORD", default_value = "lockbox")]
    password: String,
}

/// Resolved cycle settings
#[derive(Clone, PartialEq, Debug)]
pub struct CycleSetup {
    timing: engine::Config,
    device_key: Key,
    service: Option<ServiceConfig>,
}

impl CycleOpts {
    /// Merge command line options with an optional host configuration
    fn setup(&self, cfg: Option<Config>) -> anyhow::Result<CycleSetup> {
        let loaded = cfg.is_some();
        let cfg = cfg.unwrap_or_default();

        let device_key = match cfg.card.device_key.is_some() {
            true => cfg.card.device_key()?,
            false => self.device_key.clone(),
        };

        let service = match &self.service {
            Some(url) => Some(ServiceConfig {
                base_url: url.clone(),
                username: self.username.clone(),
                password: self.password.clone(),
                timeout_s: cfg.service.timeout_s,
            }),
            None if loaded => Some(cfg.service),
            None => None,
        };

        Ok(CycleSetup {
            timing: cfg.timing,
            device_key,
            service,
        })
    }
}

/// Card placed in the field for a cycle
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum CardKind {
    None,
    Virgin,
    Enrolled(CardIdentity),
    Foreign,
}

impl FromStr for CardKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("enrolled", id)) => Ok(CardKind::Enrolled(id.parse()?)),
            None if s == "none" => Ok(CardKind::None),
            None if s == "virgin" => Ok(CardKind::Virgin),
            None if s == "foreign" => Ok(CardKind::Foreign),
            _ => Err(anyhow!("unrecognised card '{}'", s)),
        }
    }
}

pub fn card_opens_from_str(s: &str) -> anyhow::Result<(CardIdentity, i64)> {
    let (id, opens) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <hex>=<opens>"))?;

    Ok((id.parse()?, opens.parse()?))
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("hyper");
    c.add_filter_ignore_str("reqwest");

    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    debug!("args: {:?}", args);

    match args.command {
        Command::Serve { opts, cards } => {
            let backend = SharedBackend::new(Backend::with_cards(cards));
            let state = Arc::new(ServerState::new(&opts, backend));

            let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, opts.port))?;
            listener.set_nonblocking(true)?;

            info!("access backend listening on {}", listener.local_addr()?);

            // Run until ctrl + c
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(listener, state, async {
                let _ = tokio::signal::ctrl_c().await;
                debug!("Exit!");
            }))?;
        }
        Command::Cycle(opts) => {
            let cfg = match &opts.config {
                Some(p) => Some(Config::load(p)?),
                None => None,
            };
            let setup = opts.setup(cfg)?;

            debug!(
                "cycle timing: {:?}, service: {:?}",
                setup.timing,
                setup.service.as_ref().map(|s| &s.base_url)
            );

            let report = match &setup.service {
                Some(s) => {
                    let c = AccessClient::new(s)?;

                    run_cycle(&opts, &setup, c)?
                }
                None => {
                    let mut backend = Backend::default();
                    if let (CardKind::Enrolled(id), Some(n)) = (opts.card, opts.opens) {
                        backend.set_opens(&id, n);
                    }

                    let mut s = SimService::new(SharedBackend::new(backend));
                    let r = run_cycle(&opts, &setup, &mut s)?;

                    info!("service calls: {:?}", s.calls());
                    r
                }
            };

            println!("{report:#?}");

            if let Some(e) = report.error() {
                println!("access not granted: {e}");
            }
        }
    }

    Ok(())
}

fn run_cycle<SVC: AccessService>(
    opts: &CycleOpts,
    setup: &CycleSetup,
    svc: SVC,
) -> anyhow::Result<Report> {
    let mut reader = match opts.card {
        CardKind::None => SimReader::empty(),
        CardKind::Virgin => SimReader::new(SimCard::random()),
        CardKind::Enrolled(id) => SimReader::new(SimCard::enrolled(&setup.device_key, &id)),
        CardKind::Foreign => SimReader::new(SimCard::foreign()),
    };

    let drv = SimDriver::new(opts.wake).with_link(opts.link);

    let mut e = Engine::new(
        setup.timing,
        drv,
        Reader::new(&mut reader, setup.device_key.clone()),
        svc,
        MemStore::new(opts.engaged),
    );

    let report = e.run();

    info!("actuations: {:?}", e.driver().actuations());
    info!("indications: {:?}", e.driver().indications());

    drop(e);

    if let Some(c) = reader.card() {
        info!(
            "card {:02x?} identity: {} (virgin: {})",
            c.uid().as_slice(),
            c.identity(),
            c.is_virgin()
        );
    }

    Ok(report)
}
