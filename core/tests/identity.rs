// Copyright (c) 2022-2023 The MobileCoin Foundation

use lockbox_core::{api::AccessReq, CardIdentity};
use lockbox_tests::vectors::{ENROLLED_IDENTITY, ENROLLED_IDENTITY_HEX, IDENTITY_VECTORS};

#[test]
fn identity_wire_encoding() {
    for v in IDENTITY_VECTORS {
        let id = CardIdentity::from_bytes(v.bytes);

        assert_eq!(id.to_hex().as_str(), v.hex);
        assert_eq!(v.hex.parse::<CardIdentity>().unwrap(), id);
    }
}

#[test]
fn random_identity_round_trip() {
    let mut rng = rand::thread_rng();

    for _i in 0..32 {
        let id = CardIdentity::random(&mut rng);
        let s = id.to_string();

        assert_eq!(s.len(), 32);
        assert_eq!(s.parse::<CardIdentity>().unwrap(), id);
    }
}

#[test]
fn access_req_json() {
    let r = AccessReq::new(ENROLLED_IDENTITY);

    let s = serde_json::to_string(&r).unwrap();
    assert_eq!(s, format!(r#"{{"uuid":"{ENROLLED_IDENTITY_HEX}"}}"#));

    let d: AccessReq = serde_json::from_str(&s).unwrap();
    assert_eq!(d, r);
}
