// Copyright (c) 2022-2023 The MobileCoin Foundation

use portpicker::pick_unused_port;

use lockbox::{
    api::{AccessService, Endpoint},
    AccessClient, Error, ServiceConfig,
};
use lockbox_sim::{Hit, UNLIMITED_OPENS};
use lockbox_tests::vectors::{ENROLLED_IDENTITY, ENROLLED_IDENTITY_HEX};

mod helpers;
use helpers::*;

#[test]
fn check_access_status_mapping() {
    let tests = &[
        (204, true),
        (200, false),
        (201, false),
        (400, false),
        (401, false),
        (404, false),
        (500, false),
        (503, false),
    ];

    for (status, granted) in tests {
        let (_s, mut c) = setup([], Some(*status));

        assert_eq!(
            c.check_access(&ENROLLED_IDENTITY),
            *granted,
            "status: {status}"
        );
    }
}

#[test]
fn check_access_connection_failure() {
    let port = pick_unused_port().unwrap();

    let mut c = AccessClient::new(&ServiceConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        timeout_s: 1,
    })
    .unwrap();

    assert!(!c.check_access(&ENROLLED_IDENTITY));
    assert!(matches!(c.enroll(&ENROLLED_IDENTITY), Err(Error::Http(_))));
}

#[test]
fn check_access_backend() {
    let (s, mut c) = setup([(ENROLLED_IDENTITY, 2)], None);

    assert!(c.check_access(&ENROLLED_IDENTITY));
    assert!(c.check_access(&ENROLLED_IDENTITY));
    assert!(!c.check_access(&ENROLLED_IDENTITY));

    assert_eq!(
        s.state().backend().lock().remaining_opens(&ENROLLED_IDENTITY),
        Some(0)
    );
}

#[test]
fn check_access_unlimited() {
    let (_s, mut c) = setup([(ENROLLED_IDENTITY, UNLIMITED_OPENS)], None);

    for _i in 0..4 {
        assert!(c.check_access(&ENROLLED_IDENTITY));
    }
}

#[test]
fn enroll_ignores_status() {
    let (s, mut c) = setup([], None);

    // Created, then rejected as a duplicate
    c.enroll(&ENROLLED_IDENTITY).unwrap();
    c.enroll(&ENROLLED_IDENTITY).unwrap();

    let statuses: Vec<_> = s.state().hits().iter().map(|h| h.status).collect();
    assert_eq!(statuses, vec![204, 400]);
}

#[test]
fn request_format() {
    let (s, c) = setup([], None);

    c.request(Endpoint::Enroll, &ENROLLED_IDENTITY).unwrap();

    assert_eq!(
        s.state().hits(),
        vec![Hit {
            endpoint: Endpoint::Enroll,
            identity: Some(ENROLLED_IDENTITY),
            content_type: Some("application/json".to_string()),
            status: 204,
        }]
    );
    assert_eq!(ENROLLED_IDENTITY.to_string(), ENROLLED_IDENTITY_HEX);
}

#[test]
fn bad_credentials() {
    let (s, _c) = setup([(ENROLLED_IDENTITY, UNLIMITED_OPENS)], None);

    let mut c = AccessClient::new(&ServiceConfig {
        base_url: format!("{}/", s.base_url()),
        username: USERNAME.to_string(),
        password: "wrong".to_string(),
        timeout_s: 2,
    })
    .unwrap();

    assert_eq!(
        c.request(Endpoint::CheckAccess, &ENROLLED_IDENTITY).unwrap(),
        401
    );
    assert!(!c.check_access(&ENROLLED_IDENTITY));
}
