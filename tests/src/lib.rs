// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Common scenarios for lockbox engines and access services.
//!
//! Generic over [AccessService][lockbox_core::api::AccessService] for reuse
//! against in-memory and HTTP services.
//!

use std::str::FromStr;

use log::LevelFilter;
use simplelog::SimpleLogger;

pub mod vectors;

mod rig;
pub use rig::Rig;

pub mod scenarios;

/// Setup logging for tests, level from the `LOG_LEVEL` environment variable
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    let _ = SimpleLogger::init(log_level, log_cfg);
}
