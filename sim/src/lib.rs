// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated lockbox hardware and access backend
//!
//! Provides [SimReader] (a MIFARE Classic card model behind the
//! [Transport][lockbox_core::card::Transport] trait), [SimDriver]
//! (a recording platform driver), [MemStore] (retained lock state),
//! [SimService] (an in-memory access backend) and [SimServer], which
//! exposes the same backend over HTTP for exercising real clients.

mod card;
pub use card::{SimCard, BLOCK_COUNT, CRC_A, SECTOR_BLOCKS};

mod reader;
pub use reader::{Faults, ReaderOp, SimReader};

mod driver;
pub use driver::{DriverEvent, Link, SimDriver};

mod store;
pub use store::MemStore;

mod backend;
pub use backend::{Backend, Call, SharedBackend, SimService, UNLIMITED_OPENS};

mod server;
pub use server::{serve, Hit, ServerOptions, ServerState, SimServer};

/// Simulator errors
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum SimError {
    #[error("no card in field")]
    NoCard,
    #[error("card halted")]
    Halted,
    #[error("authentication failed")]
    AuthFailed,
    #[error("sector not authenticated")]
    NotAuthenticated,
    #[error("invalid block {0}")]
    InvalidBlock(u8),
    #[error("block {0} is read only")]
    ReadOnly(u8),
    #[error("CRC mismatch")]
    Crc,
    #[error("injected fault")]
    Injected,
    #[error("service unavailable")]
    Unavailable,
}
