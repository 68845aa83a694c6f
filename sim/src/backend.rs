// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-memory access backend
//!
//! Cards are created with no remaining opens, so a newly enrolled card is
//! denied until an operator grants it opens (or unlimited access with
//! [UNLIMITED_OPENS]). Each granted check consumes one open.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use log::{debug, warn};

use lockbox_core::{
    api::{is_granted, AccessService, STATUS_NO_CONTENT},
    CardIdentity,
};

use crate::SimError;

/// Remaining opens value granting unlimited access
pub const UNLIMITED_OPENS: i64 = -1;

/// Status for rejected requests
const STATUS_BAD_REQUEST: u16 = 400;

/// Card records keyed by identity
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Backend {
    cards: HashMap<CardIdentity, i64>,
}

impl Backend {
    /// Create a backend with the provided cards and remaining opens
    pub fn with_cards(cards: impl IntoIterator<Item = (CardIdentity, i64)>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    /// Enroll a new card, returning the response status
    pub fn create(&mut self, identity: &CardIdentity) -> u16 {
        if self.cards.contains_key(identity) {
            debug!("card {} already exists", identity);
            return STATUS_BAD_REQUEST;
        }

        debug!("created card {}", identity);
        self.cards.insert(*identity, 0);

        STATUS_NO_CONTENT
    }

    /// Use a card, returning the response status
    pub fn use_card(&mut self, identity: &CardIdentity) -> u16 {
        let opens = match self.cards.get_mut(identity) {
            Some(v) => v,
            None => {
                debug!("unknown card {}", identity);
                return STATUS_BAD_REQUEST;
            }
        };

        match *opens {
            UNLIMITED_OPENS => STATUS_NO_CONTENT,
            n if n > 0 => {
                *opens = n - 1;
                STATUS_NO_CONTENT
            }
            _ => {
                debug!("card {} has no opens remaining", identity);
                STATUS_BAD_REQUEST
            }
        }
    }

    /// Set remaining opens for a card, creating it if required
    pub fn set_opens(&mut self, identity: &CardIdentity, opens: i64) {
        self.cards.insert(*identity, opens);
    }

    /// Fetch remaining opens for a card
    pub fn remaining_opens(&self, identity: &CardIdentity) -> Option<i64> {
        self.cards.get(identity).copied()
    }

    /// Number of known cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// [Backend] shared between services and servers
#[derive(Clone, Debug, Default)]
pub struct SharedBackend(Arc<Mutex<Backend>>);

impl SharedBackend {
    pub fn new(backend: Backend) -> Self {
        Self(Arc::new(Mutex::new(backend)))
    }

    /// Lock the backend for access
    pub fn lock(&self) -> MutexGuard<'_, Backend> {
        // Backend state is always consistent so poisoning is ignored
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Service calls recorded by [SimService]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Call {
    Enroll(CardIdentity),
    CheckAccess(CardIdentity),
}

/// In-process [AccessService] backed by a [SharedBackend]
#[derive(Clone, Debug, Default)]
pub struct SimService {
    backend: SharedBackend,
    calls: Vec<Call>,
    offline: bool,
}

impl SimService {
    /// Create a service over the provided backend
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            calls: vec![],
            offline: false,
        }
    }

    /// Create a service where every request fails in transport
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    /// Underlying backend
    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Calls received since creation
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }
}

impl AccessService for SimService {
    type Error = SimError;

    fn enroll(&mut self, identity: &CardIdentity) -> Result<(), Self::Error> {
        self.calls.push(Call::Enroll(*identity));

        if self.offline {
            return Err(SimError::Unavailable);
        }

        let _ = self.backend.lock().create(identity);

        Ok(())
    }

    fn check_access(&mut self, identity: &CardIdentity) -> bool {
        self.calls.push(Call::CheckAccess(*identity));

        if self.offline {
            warn!("check access failed: {}", SimError::Unavailable);
            return false;
        }

        is_granted(self.backend.lock().use_card(identity))
    }
}
