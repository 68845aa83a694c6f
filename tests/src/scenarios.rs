// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Wake cycle scenarios
//!
//! Each scenario runs one or more cycles on a [Rig] and checks device-side
//! effects (actuation, lock state, card contents), returning the rig so
//! callers can check service-side effects for their [AccessService].

use log::info;
use strum::IntoEnumIterator;

use lockbox_core::{
    api::AccessService,
    card::{Outcome, DATA_BLOCK},
    engine::{Indication, Position, WakeCause},
    CardIdentity, Error,
};
use lockbox_sim::{Link, SimCard};

use crate::{vectors::DEVICE_KEY, Rig};

/// Any wake other than the trigger returns to sleep with no side effects
pub fn spurious_wake<SVC: AccessService>(svc: SVC) -> anyhow::Result<Rig<SVC>> {
    let mut r = Rig::new(svc).engaged(true).card(SimCard::random());

    for wake in WakeCause::iter().filter(|w| *w != WakeCause::Trigger) {
        info!("wake: {}", wake);

        let report = r.cycle(wake);

        assert_eq!(report.outcome, None);
        assert!(r.driver.actuations().is_empty());
        assert!(!r.driver.peripherals());
        assert!(r.driver.slept());
        assert!(r.store.engaged());
    }

    assert!(r.reader.ops().is_empty());

    Ok(r)
}

/// Triggering an open box closes it, without touching any card in the field
pub fn close_lock<SVC: AccessService>(svc: SVC, card: Option<SimCard>) -> anyhow::Result<Rig<SVC>> {
    let mut r = Rig::new(svc).engaged(false);
    if let Some(c) = card {
        r.reader.insert(c);
    }

    let report = r.cycle(WakeCause::Trigger);

    assert!(report.engaged);
    assert_eq!(report.outcome, None);
    assert_eq!(r.driver.actuations(), vec![Position::Closed]);
    assert_eq!(r.driver.indications(), vec![Indication::Closed]);
    assert!(!r.driver.peripherals());

    assert!(r.store.engaged());
    assert_eq!(r.store.writes(), 1);

    assert!(r.reader.ops().is_empty());

    Ok(r)
}

/// Triggering an engaged lock with no card leaves it engaged at unlock-ready
pub fn no_card<SVC: AccessService>(svc: SVC) -> anyhow::Result<Rig<SVC>> {
    let mut r = Rig::new(svc).engaged(true);

    let report = r.cycle(WakeCause::Trigger);

    assert_eq!(report.outcome, Some(Outcome::NoCard));
    assert_eq!(report.error(), Some(Error::NoCardPresent));
    assert!(report.engaged);
    assert!(!report.granted);

    assert_eq!(r.driver.actuations(), vec![Position::UnlockReady]);
    assert_eq!(r.driver.indications(), vec![Indication::Denied]);
    assert!(r.store.engaged());

    Ok(r)
}

/// Presenting a virgin card enrolls it, the lock remains engaged
pub fn virgin_card<SVC: AccessService>(svc: SVC) -> anyhow::Result<(Rig<SVC>, CardIdentity)> {
    let mut r = Rig::new(svc).engaged(true).card(SimCard::random());

    let report = r.cycle(WakeCause::Trigger);

    let identity = match report.outcome {
        Some(Outcome::NewCard { identity }) => identity,
        o => return Err(anyhow::anyhow!("unexpected outcome: {:?}", o)),
    };

    info!("enrolled identity: {}", identity);

    // Card carries the new identity and device key
    let card = r
        .reader
        .card()
        .ok_or_else(|| anyhow::anyhow!("card missing"))?;
    assert_eq!(card.identity(), identity);
    assert_eq!(card.key_a(DATA_BLOCK), Some(DEVICE_KEY));
    assert!(!card.is_virgin());

    // New cards never open the lock
    assert!(!report.granted);
    assert!(report.engaged);
    assert!(r.store.engaged());
    assert_eq!(r.driver.position(), Some(Position::UnlockReady));
    assert_eq!(r.driver.indications(), vec![Indication::Enrolled]);

    Ok((r, identity))
}

/// Presenting an enrolled card opens the lock where the service grants access
pub fn enrolled_card<SVC: AccessService>(
    svc: SVC,
    identity: CardIdentity,
    granted: bool,
) -> anyhow::Result<Rig<SVC>> {
    let mut r = Rig::new(svc)
        .engaged(true)
        .card(SimCard::enrolled(&DEVICE_KEY, &identity));

    let report = r.cycle(WakeCause::Trigger);

    assert_eq!(report.outcome, Some(Outcome::EnrolledCard { identity }));
    assert_eq!(report.granted, granted);
    assert_eq!(report.engaged, !granted);
    assert_eq!(r.store.engaged(), !granted);

    // Enrolled cards are read, never rewritten
    assert_eq!(r.reader.writes(), 0);

    match granted {
        true => {
            assert_eq!(
                r.driver.actuations(),
                vec![Position::UnlockReady, Position::Open]
            );
            assert_eq!(r.driver.indications(), vec![Indication::Granted]);
            assert_eq!(report.error(), None);
        }
        false => {
            assert_eq!(r.driver.actuations(), vec![Position::UnlockReady]);
            assert_eq!(r.driver.indications(), vec![Indication::Denied]);
            assert_eq!(report.error(), Some(Error::AccessDenied));
        }
    }

    Ok(r)
}

/// Re-presenting an enrolled card never changes its identity
pub fn stable_identity<SVC: AccessService>(
    svc: SVC,
    cycles: usize,
) -> anyhow::Result<(Rig<SVC>, CardIdentity)> {
    let (mut r, identity) = virgin_card(svc)?;
    let writes = r.reader.writes();

    for i in 0..cycles {
        info!("cycle {}", i);

        let report = r.cycle(WakeCause::Trigger);

        assert_eq!(report.outcome, Some(Outcome::EnrolledCard { identity }));
        assert_eq!(r.reader.card().map(|c| c.identity()), Some(identity));
        assert_eq!(r.reader.writes(), writes);
    }

    Ok((r, identity))
}

/// A link that never connects skips the service and leaves the lock engaged
pub fn link_down<SVC: AccessService>(
    svc: SVC,
    identity: CardIdentity,
) -> anyhow::Result<Rig<SVC>> {
    let mut r = Rig::new(svc)
        .engaged(true)
        .link(Link::Down)
        .card(SimCard::enrolled(&DEVICE_KEY, &identity));

    let report = r.cycle(WakeCause::Trigger);

    assert_eq!(report.outcome, Some(Outcome::EnrolledCard { identity }));
    assert_eq!(report.network, Some(Error::NetworkUnavailable));
    assert_eq!(report.error(), Some(Error::NetworkUnavailable));
    assert!(report.engaged);

    // Wait is bounded by the configured timeout
    let timeout = r.config.network_timeout_ms as u64;
    assert!(r.driver.elapsed_ms() >= timeout);
    assert!(r.driver.elapsed_ms() <= timeout + (r.config.network_poll_ms as u64) * 2 + 1_000);

    assert_eq!(r.driver.position(), Some(Position::UnlockReady));
    assert!(!r.driver.peripherals());

    Ok(r)
}
