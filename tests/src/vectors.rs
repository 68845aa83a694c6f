// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Shared test vectors

use lockbox_core::{card::Key, CardIdentity};

/// Device key used by simulated lockboxes
pub const DEVICE_KEY: Key = Key::new([0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5]);

/// Identity of the pre-enrolled card in the granted access scenario
pub const ENROLLED_IDENTITY: CardIdentity = CardIdentity::from_bytes([
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
]);

/// Wire encoding of [ENROLLED_IDENTITY]
pub const ENROLLED_IDENTITY_HEX: &str = "00112233445566778899aabbccddeeff";

/// Identity wire encoding vectors
pub struct IdentityVector {
    pub bytes: [u8; 16],
    pub hex: &'static str,
}

pub const IDENTITY_VECTORS: &[IdentityVector] = &[
    IdentityVector {
        bytes: [0u8; 16],
        hex: "00000000000000000000000000000000",
    },
    IdentityVector {
        bytes: [0xff; 16],
        hex: "ffffffffffffffffffffffffffffffff",
    },
    IdentityVector {
        bytes: [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ],
        hex: ENROLLED_IDENTITY_HEX,
    },
    IdentityVector {
        bytes: [
            0x0a, 0x0b, 0x00, 0x01, 0x09, 0xf0, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
        ],
        hex: "0a0b000109f010000000000000000001",
    },
];
