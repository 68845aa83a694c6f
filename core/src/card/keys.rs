// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::{fmt, str::FromStr};

use zeroize::Zeroize;

use super::BLOCK_LEN;

/// Sector key length in bytes
pub const KEY_LEN: usize = 6;

/// Access bits written to adopted cards (key holders only)
pub const ACCESS_BITS: [u8; 3] = [0xff, 0x07, 0x80];

/// General purpose trailer byte written to adopted cards
pub const USER_BYTE: u8 = 0xff;

/// Vendor default key carried by virgin cards
pub const FACTORY_KEY: Key = Key([0xff; KEY_LEN]);

/// Sector authentication key
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Create a key from raw bytes
    pub const fn new(b: [u8; KEY_LEN]) -> Self {
        Self(b)
    }

    /// Fetch raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Build the trailer block committing this key as both key A and key B
    ///
    /// Callers should zeroize the returned block once written.
    pub fn trailer(&self) -> [u8; BLOCK_LEN] {
        let mut b = [0u8; BLOCK_LEN];

        b[..KEY_LEN].copy_from_slice(&self.0);
        b[KEY_LEN..][..ACCESS_BITS.len()].copy_from_slice(&ACCESS_BITS);
        b[KEY_LEN + ACCESS_BITS.len()] = USER_BYTE;
        b[BLOCK_LEN - KEY_LEN..].copy_from_slice(&self.0);

        b
    }
}

impl From<[u8; KEY_LEN]> for Key {
    fn from(b: [u8; KEY_LEN]) -> Self {
        Self(b)
    }
}

impl FromStr for Key {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; KEY_LEN];
        hex::decode_to_slice(s, &mut b)?;
        Ok(Self(b))
    }
}

/// Keys are never printed
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self == &FACTORY_KEY {
            true => write!(f, "Key(factory)"),
            false => write!(f, "Key(..)"),
        }
    }
}
