// Copyright (c) 2022-2023 The MobileCoin Foundation

//! MIFARE Classic 1K card model
//!
//! Each sector holds four blocks, the last of which is the sector trailer.
//! Access to any block requires key A authentication against its sector,
//! a failed authentication halts the card until it is selected again.

use crc::{Crc, CRC_16_ISO_IEC_14443_3_A};
use rand::RngCore;

use lockbox_core::{
    card::{Key, Uid, BLOCK_LEN, DATA_BLOCK, FACTORY_KEY, KEY_LEN, RAW_BLOCK_LEN},
    CardIdentity,
};

use crate::SimError;

/// Number of blocks on a 1K card
pub const BLOCK_COUNT: usize = 64;

/// Blocks per sector
pub const SECTOR_BLOCKS: usize = 4;

/// ISO/IEC 14443-3 type A CRC, as appended to block reads
pub const CRC_A: Crc<u16> = Crc::<u16>::new(&CRC_16_ISO_IEC_14443_3_A);

/// Transport configuration trailer as shipped by the vendor
const TRANSPORT_TRAILER: [u8; BLOCK_LEN] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x07, 0x80, 0x69, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Simulated card state
#[derive(Clone, PartialEq, Debug)]
pub struct SimCard {
    uid: Uid,
    blocks: [[u8; BLOCK_LEN]; BLOCK_COUNT],
    auth: Option<usize>,
    halted: bool,
}

impl SimCard {
    /// Create a factory fresh card with the provided UID
    pub fn virgin(uid: &[u8]) -> Self {
        let mut blocks = [[0u8; BLOCK_LEN]; BLOCK_COUNT];

        // Manufacturer block, UID followed by the check byte
        let n = uid.len().min(BLOCK_LEN - 1);
        blocks[0][..n].copy_from_slice(&uid[..n]);
        blocks[0][n] = uid.iter().fold(0, |a, b| a ^ b);

        for b in blocks.iter_mut().skip(SECTOR_BLOCKS - 1).step_by(SECTOR_BLOCKS) {
            *b = TRANSPORT_TRAILER;
        }

        Self {
            uid: Uid::from_slice(&uid[..uid.len().min(lockbox_core::card::UID_MAX_LEN)])
                .unwrap_or_default(),
            blocks,
            auth: None,
            halted: false,
        }
    }

    /// Create a factory fresh card with a random 4-byte UID
    pub fn random() -> Self {
        let mut uid = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut uid);
        Self::virgin(&uid)
    }

    /// Create a card previously enrolled with the provided key and identity
    pub fn enrolled(key: &Key, identity: &CardIdentity) -> Self {
        let mut c = Self::random();
        c.blocks[DATA_BLOCK as usize] = *identity.as_bytes();
        c.blocks[trailer_of(DATA_BLOCK as usize)] = key.trailer();
        c
    }

    /// Create a card keyed by some other system, accepting neither the
    /// factory key nor any key the caller is likely to hold
    pub fn foreign() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        key[0] &= 0x7f;

        let mut c = Self::random();
        c.blocks[trailer_of(DATA_BLOCK as usize)] = Key::new(key).trailer();
        c
    }

    /// Card UID
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Raw block contents, bypassing authentication
    pub fn block(&self, block: u8) -> Option<&[u8; BLOCK_LEN]> {
        self.blocks.get(block as usize)
    }

    /// Identity stored in the data block
    pub fn identity(&self) -> CardIdentity {
        CardIdentity::from_bytes(self.blocks[DATA_BLOCK as usize])
    }

    /// Key A for the sector containing the provided block
    pub fn key_a(&self, block: u8) -> Option<Key> {
        let b = self.blocks.get(trailer_of(block as usize))?;

        let mut k = [0u8; KEY_LEN];
        k.copy_from_slice(&b[..KEY_LEN]);
        Some(Key::new(k))
    }

    /// Whether the card still accepts the factory key for the data sector
    pub fn is_virgin(&self) -> bool {
        self.key_a(DATA_BLOCK) == Some(FACTORY_KEY)
    }

    /// Whether the card is halted (failed authentication or released)
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Select the card, clearing any halt and authentication state
    pub fn select(&mut self) -> Uid {
        self.halted = false;
        self.auth = None;
        self.uid.clone()
    }

    /// Halt the card
    pub fn halt(&mut self) {
        self.halted = true;
        self.auth = None;
    }

    /// Authenticate with key A against the sector containing `block`
    pub fn authenticate(&mut self, block: u8, key: &Key) -> Result<(), SimError> {
        if self.halted {
            return Err(SimError::Halted);
        }

        match self.key_a(block) {
            Some(k) if &k == key => {
                self.auth = Some(sector_of(block as usize));
                Ok(())
            }
            Some(_) => {
                self.halt();
                Err(SimError::AuthFailed)
            }
            None => Err(SimError::InvalidBlock(block)),
        }
    }

    /// Read a block, returning the payload with CRC_A appended
    pub fn read(&self, block: u8) -> Result<[u8; RAW_BLOCK_LEN], SimError> {
        let i = self.check_access(block)?;

        let mut data = self.blocks[i];

        // Key A is never readable
        if i == trailer_of(i) {
            data[..KEY_LEN].fill(0);
        }

        let mut buff = [0u8; RAW_BLOCK_LEN];
        buff[..BLOCK_LEN].copy_from_slice(&data);
        buff[BLOCK_LEN..].copy_from_slice(&CRC_A.checksum(&data).to_le_bytes());

        Ok(buff)
    }

    /// Write a block
    pub fn write(&mut self, block: u8, data: &[u8; BLOCK_LEN]) -> Result<(), SimError> {
        let i = self.check_access(block)?;

        if i == 0 {
            return Err(SimError::ReadOnly(block));
        }

        self.blocks[i] = *data;

        Ok(())
    }

    fn check_access(&self, block: u8) -> Result<usize, SimError> {
        let i = block as usize;
        if i >= BLOCK_COUNT {
            return Err(SimError::InvalidBlock(block));
        }

        if self.halted {
            return Err(SimError::Halted);
        }

        match self.auth {
            Some(s) if s == sector_of(i) => Ok(i),
            _ => Err(SimError::NotAuthenticated),
        }
    }
}

fn sector_of(block: usize) -> usize {
    block / SECTOR_BLOCKS
}

fn trailer_of(block: usize) -> usize {
    sector_of(block) * SECTOR_BLOCKS + SECTOR_BLOCKS - 1
}

#[cfg(test)]
mod test {
    use lockbox_core::card::TRAILER_BLOCK;

    use super::*;

    const KEY: Key = Key::new([0x10, 0x20, 0x30, 0x40, 0x50, 0x60]);

    #[test]
    fn virgin_layout() {
        let c = SimCard::virgin(&[0xde, 0xad, 0xbe, 0xef]);

        assert_eq!(c.uid().as_slice(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(c.block(0).unwrap()[4], 0xde ^ 0xad ^ 0xbe ^ 0xef);
        assert_eq!(c.block(TRAILER_BLOCK), Some(&TRANSPORT_TRAILER));
        assert!(c.is_virgin());
    }

    #[test]
    fn auth_required() {
        let mut c = SimCard::random();
        c.select();

        assert_eq!(c.read(DATA_BLOCK), Err(SimError::NotAuthenticated));

        c.authenticate(TRAILER_BLOCK, &FACTORY_KEY).unwrap();
        let r = c.read(DATA_BLOCK).unwrap();
        assert_eq!(&r[..BLOCK_LEN], &[0u8; BLOCK_LEN]);

        // Other sectors remain locked
        assert_eq!(c.read(4), Err(SimError::NotAuthenticated));
    }

    #[test]
    fn failed_auth_halts() {
        let id = CardIdentity::from_bytes([0xab; 16]);
        let mut c = SimCard::enrolled(&KEY, &id);
        c.select();

        assert_eq!(
            c.authenticate(TRAILER_BLOCK, &FACTORY_KEY),
            Err(SimError::AuthFailed)
        );
        assert_eq!(c.authenticate(TRAILER_BLOCK, &KEY), Err(SimError::Halted));

        c.select();
        c.authenticate(TRAILER_BLOCK, &KEY).unwrap();

        let r = c.read(DATA_BLOCK).unwrap();
        assert_eq!(&r[..BLOCK_LEN], id.as_bytes());
    }

    #[test]
    fn read_crc() {
        let mut c = SimCard::random();
        c.select();
        c.authenticate(DATA_BLOCK, &FACTORY_KEY).unwrap();
        c.write(DATA_BLOCK, &[0x5a; BLOCK_LEN]).unwrap();

        let r = c.read(DATA_BLOCK).unwrap();
        let crc = u16::from_le_bytes([r[BLOCK_LEN], r[BLOCK_LEN + 1]]);
        assert_eq!(crc, CRC_A.checksum(&r[..BLOCK_LEN]));
    }

    #[test]
    fn trailer_hides_key_a() {
        let mut c = SimCard::random();
        c.select();
        c.authenticate(TRAILER_BLOCK, &FACTORY_KEY).unwrap();

        let r = c.read(TRAILER_BLOCK).unwrap();
        assert_eq!(&r[..KEY_LEN], &[0u8; KEY_LEN]);
        assert_eq!(&r[KEY_LEN..KEY_LEN + 3], &[0xff, 0x07, 0x80]);
    }
}
