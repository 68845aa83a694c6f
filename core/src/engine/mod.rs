// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] runs a single lockbox wake cycle.
//!
//! Each boot starts in [State::WakeDeciding] and always terminates in
//! [State::Sleeping], failures at any stage degrade to "access not granted".
//! The engine may be advanced one transition at a time via [Engine::step]
//! or to completion via [Engine::run].

use rand_core::{CryptoRngCore, OsRng};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::{
    api::AccessService,
    card::{Outcome, Reader, Transport},
    CardIdentity, Error,
};

mod config;
pub use config::*;

mod report;
pub use report::Report;

/// Engine state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Cycle complete, device in deep sleep
    Sleeping,
    /// Inspecting the wake cause and lock state
    WakeDeciding,
    /// Box open, closing the lock
    UnlockingFromOpen,
    /// Latch at unlock-ready, reading card
    AwaitingCard,
    /// Waiting on the wireless link, calling the access service
    AwaitingNetwork,
    /// Applying the access decision and powering down
    Finalizing,
}

/// Cause of the most recent wake from deep sleep
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum WakeCause {
    /// Designated wake trigger (button)
    Trigger,
    /// Sleep timer
    Timer,
    /// Power on / reset
    PowerOn,
    /// Any other wake source
    Other,
}

/// Logical lock actuator positions
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    /// Latch engaged
    Closed,
    /// Latch retracted but not fully open
    UnlockReady,
    /// Fully open
    Open,
}

/// User feedback events (buzzer / LED hook)
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum Indication {
    /// Lock closed
    Closed,
    /// New card enrolled
    Enrolled,
    /// Access granted
    Granted,
    /// Access denied or card unreadable
    Denied,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// Fetch the cause of the current wake
    fn wake_cause(&self) -> WakeCause;

    /// Switch the auxiliary peripheral rail
    fn set_peripherals(&mut self, on: bool);

    /// Move the lock actuator
    fn actuate(&mut self, position: Position);

    /// Block for the provided duration
    fn delay_ms(&mut self, ms: u32);

    /// Start establishing the wireless link (non-blocking)
    fn link_begin(&mut self);

    /// Poll wireless link state
    fn link_connected(&mut self) -> bool;

    /// Tear down the wireless link
    fn link_end(&mut self);

    /// Enter deep sleep, on hardware this does not return
    fn deep_sleep(&mut self);

    /// Signal user feedback
    fn indicate(&mut self, _indication: Indication) {}
}

impl<T: Driver> Driver for &mut T {
    fn wake_cause(&self) -> WakeCause {
        T::wake_cause(self)
    }

    fn set_peripherals(&mut self, on: bool) {
        T::set_peripherals(self, on)
    }

    fn actuate(&mut self, position: Position) {
        T::actuate(self, position)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }

    fn link_begin(&mut self) {
        T::link_begin(self)
    }

    fn link_connected(&mut self) -> bool {
        T::link_connected(self)
    }

    fn link_end(&mut self) {
        T::link_end(self)
    }

    fn deep_sleep(&mut self) {
        T::deep_sleep(self)
    }

    fn indicate(&mut self, indication: Indication) {
        T::indicate(self, indication)
    }
}

/// [`LockStore`] persists the lock flag across deep sleep
/// (need not survive power loss, defaults to unlocked)
pub trait LockStore {
    /// Load the persisted `engaged` flag
    fn load(&self) -> bool;

    /// Persist the `engaged` flag
    fn store(&mut self, engaged: bool);
}

impl<T: LockStore> LockStore for &mut T {
    fn load(&self) -> bool {
        T::load(self)
    }

    fn store(&mut self, engaged: bool) {
        T::store(self, engaged)
    }
}

/// [Engine] provides hardware-independent lockbox cycle execution
pub struct Engine<DRV, T, SVC, S, RNG = OsRng>
where
    DRV: Driver,
    T: Transport,
    SVC: AccessService,
    S: LockStore,
    RNG: CryptoRngCore,
{
    state: State,
    config: Config,

    engaged: bool,
    wake: WakeCause,
    outcome: Option<Outcome>,
    granted: bool,
    network: Option<Error>,
    service: Option<Error>,
    persisted: bool,

    drv: DRV,
    reader: Reader<T, RNG>,
    svc: SVC,
    store: S,
}

impl<DRV, T, SVC, S, RNG> Engine<DRV, T, SVC, S, RNG>
where
    DRV: Driver,
    T: Transport,
    SVC: AccessService,
    S: LockStore,
    RNG: CryptoRngCore,
{
    /// Create a new engine for a wake cycle, loading the lock state from the provided store
    pub fn new(config: Config, drv: DRV, reader: Reader<T, RNG>, svc: SVC, store: S) -> Self {
        let engaged = store.load();

        Self {
            state: State::WakeDeciding,
            config,
            engaged,
            wake: WakeCause::Other,
            outcome: None,
            granted: false,
            network: None,
            service: None,
            persisted: false,
            drv,
            reader,
            svc,
            store,
        }
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch current lock flag (persisted on sleep)
    pub fn engaged(&self) -> bool {
        self.engaged
    }

    /// Fetch card read outcome for this cycle
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn driver(&mut self) -> &mut DRV {
        &mut self.drv
    }

    pub fn service(&mut self) -> &mut SVC {
        &mut self.svc
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    /// Advance the engine by a single state transition, returning the new state
    pub fn step(&mut self) -> State {
        let next = match self.state {
            State::WakeDeciding => self.wake_deciding(),
            State::UnlockingFromOpen => self.close(),
            State::AwaitingCard => self.await_card(),
            State::AwaitingNetwork => self.await_network(),
            State::Finalizing => self.finalize(),
            State::Sleeping => State::Sleeping,
        };

        #[cfg(feature = "log")]
        {
            if next != self.state {
                log::debug!("state: {} -> {}", self.state, next);
            }
        }

        self.state = next;
        next
    }

    /// Run the cycle to completion, persist the lock state and enter deep sleep
    pub fn run(&mut self) -> Report {
        while self.state != State::Sleeping {
            self.step();
        }

        // Report is built first as deep sleep does not return on hardware
        let report = self.report();

        #[cfg(feature = "log")]
        log::info!("cycle complete: {:?}", report);

        self.sleep();

        report
    }

    /// Build a report for the current cycle
    pub fn report(&self) -> Report {
        Report {
            wake: self.wake,
            outcome: self.outcome,
            granted: self.granted,
            engaged: self.engaged,
            network: self.network,
            service: self.service,
        }
    }

    fn wake_deciding(&mut self) -> State {
        self.wake = self.drv.wake_cause();

        // Spurious wakes return to sleep with no side effects
        if self.wake != WakeCause::Trigger {
            #[cfg(feature = "log")]
            log::info!("ignoring wake: {}", self.wake);

            return State::Sleeping;
        }

        self.drv.set_peripherals(true);
        self.drv.delay_ms(self.config.power_up_ms);

        match self.engaged {
            false => State::UnlockingFromOpen,
            true => State::AwaitingCard,
        }
    }

    fn close(&mut self) -> State {
        #[cfg(feature = "log")]
        log::info!("closing lock");

        self.engaged = true;
        self.drv.actuate(Position::Closed);
        self.drv.delay_ms(self.config.close_settle_ms);

        self.drv.indicate(Indication::Closed);
        self.drv.set_peripherals(false);

        State::Sleeping
    }

    fn await_card(&mut self) -> State {
        self.drv.actuate(Position::UnlockReady);

        // Link comes up while the card exchange runs
        self.drv.link_begin();

        let outcome = self.reader.identify_or_enroll();

        #[cfg(feature = "log")]
        log::info!("card outcome: {:?}", outcome);

        self.outcome = Some(outcome);

        State::AwaitingNetwork
    }

    fn await_network(&mut self) -> State {
        if !self.wait_for_link() {
            #[cfg(feature = "log")]
            log::warn!(
                "link not connected after {} ms",
                self.config.network_timeout_ms
            );

            self.network = Some(Error::NetworkUnavailable);
            return State::Finalizing;
        }

        match self.outcome {
            Some(Outcome::NewCard { identity }) => {
                // New cards must be re-presented to gain entry
                self.enroll(&identity);
                self.drv.indicate(Indication::Enrolled);
            }
            Some(Outcome::EnrolledCard { identity }) => {
                self.granted = self.svc.check_access(&identity);

                #[cfg(feature = "log")]
                log::info!("access granted: {}", self.granted);

                // Re-register known cards on every presentation
                self.enroll(&identity);
            }
            _ => (),
        }

        State::Finalizing
    }

    fn finalize(&mut self) -> State {
        if self.granted {
            self.drv.actuate(Position::Open);
            self.drv.delay_ms(self.config.open_dwell_ms);
            self.engaged = false;

            self.drv.indicate(Indication::Granted);
        } else if !matches!(self.outcome, Some(Outcome::NewCard { .. })) {
            self.drv.indicate(Indication::Denied);
        }

        self.drv.link_end();
        self.drv.set_peripherals(false);

        State::Sleeping
    }

    /// Poll the link until connected or the timeout elapses
    fn wait_for_link(&mut self) -> bool {
        let poll_ms = self.config.network_poll_ms.max(1);
        let mut waited_ms = 0;

        loop {
            if self.drv.link_connected() {
                return true;
            }
            if waited_ms >= self.config.network_timeout_ms {
                return false;
            }

            self.drv.delay_ms(poll_ms);
            waited_ms = waited_ms.saturating_add(poll_ms);
        }
    }

    fn enroll(&mut self, identity: &CardIdentity) {
        if let Err(_e) = self.svc.enroll(identity) {
            #[cfg(feature = "log")]
            log::warn!("enroll request failed: {:?}", _e);

            self.service = Some(Error::Service);
        }
    }

    /// Persist lock state (once per cycle) and enter deep sleep
    fn sleep(&mut self) {
        if !self.persisted {
            self.store.store(self.engaged);
            self.persisted = true;
        }

        #[cfg(feature = "log")]
        log::debug!("entering deep sleep (engaged: {})", self.engaged);

        self.drv.deep_sleep();
    }
}
