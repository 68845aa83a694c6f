// Copyright (c) 2022-2023 The MobileCoin Foundation

use lockbox_core::{
    api::AccessService,
    card::Reader,
    engine::{Config, Engine, Report, WakeCause},
};
use lockbox_sim::{Faults, Link, MemStore, SimCard, SimDriver, SimReader};

use crate::vectors::DEVICE_KEY;

/// Simulated lockbox hardware, persisting across wake cycles
pub struct Rig<SVC> {
    pub config: Config,
    pub driver: SimDriver,
    pub reader: SimReader,
    pub store: MemStore,
    pub svc: SVC,
    link: Link,
}

impl<SVC: AccessService> Rig<SVC> {
    /// Create a rig with an empty field and a disengaged lock
    pub fn new(svc: SVC) -> Self {
        Self {
            config: Config::default(),
            driver: SimDriver::new(WakeCause::Trigger),
            reader: SimReader::empty(),
            store: MemStore::new(false),
            svc,
            link: Link::Up,
        }
    }

    /// Set stored lock state
    pub fn engaged(mut self, engaged: bool) -> Self {
        self.store = MemStore::new(engaged);
        self
    }

    /// Place a card in the field
    pub fn card(mut self, card: SimCard) -> Self {
        self.reader.insert(card);
        self
    }

    /// Set reader faults
    pub fn faults(mut self, faults: Faults) -> Self {
        self.reader = self.reader.with_faults(faults);
        self
    }

    /// Set link behaviour for subsequent cycles
    pub fn link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }

    /// Execute a wake cycle, replacing the driver so events reflect only this cycle
    pub fn cycle(&mut self, wake: WakeCause) -> Report {
        self.driver = SimDriver::new(wake).with_link(self.link);

        let mut e = Engine::new(
            self.config,
            &mut self.driver,
            Reader::new(&mut self.reader, DEVICE_KEY),
            &mut self.svc,
            &mut self.store,
        );

        e.run()
    }
}
