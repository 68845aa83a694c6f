// Copyright (c) 2022-2023 The MobileCoin Foundation

use lockbox::api::Endpoint;
use lockbox_sim::UNLIMITED_OPENS;
use lockbox_tests::{scenarios, vectors::ENROLLED_IDENTITY};

mod helpers;
use helpers::*;

#[test]
fn virgin_card_over_http() -> anyhow::Result<()> {
    let (s, c) = setup([], None);

    let (_r, identity) = scenarios::virgin_card(c)?;

    let hits = s.state().hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].endpoint, Endpoint::Enroll);
    assert_eq!(hits[0].identity, Some(identity));

    Ok(())
}

#[test]
fn enrolled_card_over_http() -> anyhow::Result<()> {
    let (s, c) = setup([(ENROLLED_IDENTITY, 1)], None);

    scenarios::enrolled_card(c, ENROLLED_IDENTITY, true)?;

    let hits: Vec<_> = s
        .state()
        .hits()
        .iter()
        .map(|h| (h.endpoint, h.identity, h.status))
        .collect();
    assert_eq!(
        hits,
        vec![
            (Endpoint::CheckAccess, Some(ENROLLED_IDENTITY), 204),
            (Endpoint::Enroll, Some(ENROLLED_IDENTITY), 400),
        ]
    );

    Ok(())
}

#[test]
fn re_presented_card_denied_over_http() -> anyhow::Result<()> {
    let (s, c) = setup([], None);

    let (_r, identity) = scenarios::stable_identity(c, 2)?;

    // New cards have no opens until granted by an operator
    let checks = s
        .state()
        .hits()
        .iter()
        .filter(|h| h.endpoint == Endpoint::CheckAccess)
        .inspect(|h| assert_eq!(h.identity, Some(identity)))
        .count();
    assert_eq!(checks, 2);

    Ok(())
}

#[test]
fn spurious_wake_over_http() -> anyhow::Result<()> {
    let (s, c) = setup([(ENROLLED_IDENTITY, UNLIMITED_OPENS)], None);

    scenarios::spurious_wake(c)?;
    scenarios::no_card(client(&s))?;

    assert!(s.state().hits().is_empty());

    Ok(())
}
