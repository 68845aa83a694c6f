// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Lockbox host library (and CLI)
//!
//! Provides [AccessClient], a blocking HTTP implementation of
//! [AccessService][lockbox_core::api::AccessService], along with
//! TOML [Config] loading for host tools.

/// Re-export `lockbox-core` modules for consumers
pub use lockbox_core::{api, card, engine, CardIdentity};

mod client;
pub use client::AccessClient;

mod config;
pub use config::{CardConfig, Config, ServiceConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_S};

mod error;
pub use error::Error;
