// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::{fmt, str::FromStr};

use heapless::String;
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

/// Card identity length in bytes
pub const IDENTITY_LEN: usize = 16;

/// Hex-encoded identity length
pub const IDENTITY_HEX_LEN: usize = IDENTITY_LEN * 2;

/// Opaque per-card secret written to enrolled cards.
///
/// Never interpreted numerically, the only external representation is
/// lowercase hex (two digits per byte, in storage order).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Zeroize)]
pub struct CardIdentity([u8; IDENTITY_LEN]);

impl CardIdentity {
    /// Create an identity from raw bytes
    pub const fn from_bytes(b: [u8; IDENTITY_LEN]) -> Self {
        Self(b)
    }

    /// Generate a fresh identity from a cryptographically secure RNG
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        let mut b = [0u8; IDENTITY_LEN];
        rng.fill_bytes(&mut b);
        Self(b)
    }

    /// Fetch raw identity bytes
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Encode identity as lowercase hex
    pub fn to_hex(&self) -> String<IDENTITY_HEX_LEN> {
        let mut b = [0u8; IDENTITY_HEX_LEN];
        // Output buffer is always exactly 2x input
        let _ = hex::encode_to_slice(self.0, &mut b);

        let mut s = String::new();
        for c in b {
            let _ = s.push(c as char);
        }
        s
    }
}

impl From<[u8; IDENTITY_LEN]> for CardIdentity {
    fn from(b: [u8; IDENTITY_LEN]) -> Self {
        Self(b)
    }
}

impl AsRef<[u8]> for CardIdentity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for CardIdentity {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; IDENTITY_LEN];
        hex::decode_to_slice(s, &mut b)?;
        Ok(Self(b))
    }
}

impl fmt::Display for CardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CardIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardIdentity({})", self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CardIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CardIdentity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String<IDENTITY_HEX_LEN> as serde::Deserialize>::deserialize(deserializer)?;
        CardIdentity::from_str(&s).map_err(serde::de::Error::custom)
    }
}
