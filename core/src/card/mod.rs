// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Card protocol engine
//!
//! Cards are adopted with a two-tier key scheme. Virgin cards still accept the
//! vendor [FACTORY_KEY], these are issued a random [CardIdentity] and re-keyed with
//! the device key. Cards that reject the factory key are re-selected and tried
//! with the device key, on success the stored identity is read back.
//!
//! Each call to [Reader::identify_or_enroll] performs at most one detection and
//! one re-selection, absence and failure are reported immediately.

use core::fmt::Debug;

use heapless::Vec;
use rand_core::{CryptoRngCore, OsRng};
use zeroize::Zeroize;

use crate::{CardIdentity, Error, IDENTITY_LEN};

mod keys;
pub use keys::{Key, ACCESS_BITS, FACTORY_KEY, KEY_LEN, USER_BYTE};

/// Block carrying the card identity
pub const DATA_BLOCK: u8 = 0x02;

/// Trailer (keys and access bits) for the sector containing [DATA_BLOCK]
pub const TRAILER_BLOCK: u8 = DATA_BLOCK + 1;

/// Block payload length
pub const BLOCK_LEN: usize = 16;

/// Raw read length (payload plus CRC_A)
pub const RAW_BLOCK_LEN: usize = BLOCK_LEN + 2;

/// Maximum UID length (triple size UID)
pub const UID_MAX_LEN: usize = 10;

/// Card UID as returned on selection
pub type Uid = Vec<u8, UID_MAX_LEN>;

static_assertions::const_assert_eq!(IDENTITY_LEN, BLOCK_LEN);

/// [Transport] provides sector-level access to cards in the field
pub trait Transport {
    type Error: Debug;

    /// Detect and select a card, returning `Ok(None)` if no card is present
    fn select(&mut self) -> Result<Option<Uid>, Self::Error>;

    /// Authenticate with key A against the provided block
    fn authenticate(&mut self, uid: &Uid, block: u8, key: &Key) -> Result<(), Self::Error>;

    /// Read a block (payload followed by CRC_A)
    fn read(&mut self, block: u8) -> Result<[u8; RAW_BLOCK_LEN], Self::Error>;

    /// Write a block
    fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<(), Self::Error>;

    /// Halt the card and end any authenticated session
    fn release(&mut self) {}
}

impl<T: Transport> Transport for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> Result<Option<Uid>, Self::Error> {
        T::select(self)
    }

    fn authenticate(&mut self, uid: &Uid, block: u8, key: &Key) -> Result<(), Self::Error> {
        T::authenticate(self, uid, block, key)
    }

    fn read(&mut self, block: u8) -> Result<[u8; RAW_BLOCK_LEN], Self::Error> {
        T::read(self, block)
    }

    fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<(), Self::Error> {
        T::write(self, block, data)
    }

    fn release(&mut self) {
        T::release(self)
    }
}

/// Result of a single card read
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Outcome {
    /// No card detected in the read window
    NoCard,

    /// Card detected but communication failed
    ReadFailure { cause: Error },

    /// Virgin card, a new identity was generated and committed
    NewCard { identity: CardIdentity },

    /// Previously enrolled card, identity retrieved
    EnrolledCard { identity: CardIdentity },
}

impl Outcome {
    /// Fetch the card identity where available
    pub fn identity(&self) -> Option<&CardIdentity> {
        match self {
            Outcome::NewCard { identity } | Outcome::EnrolledCard { identity } => Some(identity),
            _ => None,
        }
    }
}

/// Card key tier, determined by which key the trailer accepts
#[derive(Copy, Clone, PartialEq, Debug)]
enum Probe {
    /// Factory key accepted
    Virgin,
    /// Device key accepted
    Enrolled,
}

/// [Reader] executes the card protocol against a [Transport]
pub struct Reader<T: Transport, RNG: CryptoRngCore = OsRng> {
    transport: T,
    device_key: Key,
    rng: RNG,
}

impl<T: Transport> Reader<T> {
    /// Create a new reader with the provided transport and device key,
    /// using the default [OsRng]
    pub fn new(transport: T, device_key: Key) -> Self {
        Self::new_with_rng(transport, device_key, OsRng)
    }
}

impl<T: Transport, RNG: CryptoRngCore> Reader<T, RNG> {
    /// Create a new reader with the provided transport, device key and rng
    pub fn new_with_rng(transport: T, device_key: Key, rng: RNG) -> Self {
        Self {
            transport,
            device_key,
            rng,
        }
    }

    /// Access the underlying transport
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Identify the card in the field, adopting it if it is virgin
    pub fn identify_or_enroll(&mut self) -> Outcome {
        let r = match self.probe() {
            Ok(Probe::Virgin) => self.enroll(),
            Ok(Probe::Enrolled) => self.read_identity(),
            Err(e) => Err(e),
        };

        self.transport.release();

        match r {
            Ok(o) => o,
            Err(Error::NoCardPresent) => Outcome::NoCard,
            Err(cause) => {
                #[cfg(feature = "log")]
                log::warn!("card read failed: {:?}", cause);

                Outcome::ReadFailure { cause }
            }
        }
    }

    /// Select the card and determine which key tier it accepts
    fn probe(&mut self) -> Result<Probe, Error> {
        let uid = match self.transport.select() {
            Ok(Some(uid)) => uid,
            Ok(None) => return Err(Error::NoCardPresent),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("card detected, uid read failed: {:?}", _e);

                return Err(Error::CardCommunication);
            }
        };

        #[cfg(feature = "log")]
        log::debug!("selected card: {:02x?}", uid.as_slice());

        if self
            .transport
            .authenticate(&uid, TRAILER_BLOCK, &FACTORY_KEY)
            .is_ok()
        {
            return Ok(Probe::Virgin);
        }

        #[cfg(feature = "log")]
        log::debug!("factory key rejected, trying device key");

        // Failed authentication halts the card, re-select before retrying
        let uid = match self.transport.select() {
            Ok(Some(uid)) => uid,
            _ => return Err(Error::CardCommunication),
        };

        match self
            .transport
            .authenticate(&uid, TRAILER_BLOCK, &self.device_key)
        {
            Ok(_) => Ok(Probe::Enrolled),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("device key rejected: {:?}", _e);

                Err(Error::UnknownCard)
            }
        }
    }

    /// Issue and commit a new identity to a virgin card
    fn enroll(&mut self) -> Result<Outcome, Error> {
        let identity = CardIdentity::random(&mut self.rng);

        if let Err(_e) = self.transport.write(DATA_BLOCK, identity.as_bytes()) {
            #[cfg(feature = "log")]
            log::warn!("identity write failed: {:?}", _e);

            return Err(Error::CardCommunication);
        }

        // Verify the identity landed before the trailer locks the sector,
        // a card failing here still carries the factory key
        let raw = self
            .transport
            .read(DATA_BLOCK)
            .map_err(|_| Error::CardCommunication)?;
        if raw[..BLOCK_LEN] != identity.as_bytes()[..] {
            #[cfg(feature = "log")]
            log::warn!("identity read-back mismatch");

            return Err(Error::CardCommunication);
        }

        #[cfg(feature = "log")]
        log::debug!("wrote identity: {}", identity);

        let mut trailer = self.device_key.trailer();
        let r = self.transport.write(TRAILER_BLOCK, &trailer);
        trailer.zeroize();

        if let Err(_e) = r {
            #[cfg(feature = "log")]
            log::error!("trailer write failed, card left partially enrolled: {:?}", _e);

            return Err(Error::PartialEnrollment);
        }

        Ok(Outcome::NewCard { identity })
    }

    /// Read the identity from an enrolled card
    fn read_identity(&mut self) -> Result<Outcome, Error> {
        let raw = match self.transport.read(DATA_BLOCK) {
            Ok(v) => v,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("identity read failed: {:?}", _e);

                return Err(Error::CardCommunication);
            }
        };

        // Drop the CRC trailer, already checked by the transport
        let mut b = [0u8; IDENTITY_LEN];
        b.copy_from_slice(&raw[..IDENTITY_LEN]);
        let identity = CardIdentity::from_bytes(b);

        #[cfg(feature = "log")]
        log::debug!("read identity: {}", identity);

        Ok(Outcome::EnrolledCard { identity })
    }
}
