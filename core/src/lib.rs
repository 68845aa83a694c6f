// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Lockbox core
//!
//! This provides the hardware-independent [Engine][engine::Engine] executed once per
//! wake cycle by the lockbox firmware, along with the [card protocol][card] used
//! to adopt and identify contactless cards.
//!
//! Hardware is abstracted behind a small set of traits so the same engine runs on
//! the device, in the simulator, and in tests:
//!
//! - [`Driver`][engine::Driver] for wake cause, actuator, peripheral rail, wireless link and sleep
//! - [`Transport`][card::Transport] for sector-level card access
//! - [`AccessService`][api::AccessService] for the remote enroll / check-access calls
//! - [`LockStore`][engine::LockStore] for the lock flag retained across deep sleep
//!
//! ## Cycle
//!
//! 1. Wake cause is inspected, anything other than the wake trigger returns straight to sleep
//! 2. If the box is open (`engaged == false`) the lock is closed and the device sleeps
//! 3. Otherwise the latch is moved to unlock-ready, the link is started and a card is read
//!     1. A virgin card (factory key) is issued a random [`CardIdentity`] and re-keyed
//!     2. An enrolled card (device key) has its identity read back
//! 4. Once the link is up, new identities are enrolled and known identities checked
//! 5. The lock is opened only when the service grants access, then the device sleeps
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub mod api;

pub mod card;

pub mod engine;

mod identity;
pub use identity::{CardIdentity, IDENTITY_LEN};

mod error;
pub use error::Error;
