// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::str::FromStr;

use log::debug;

use lockbox_core::engine::{Driver, Indication, Position, WakeCause};

/// Wireless link behaviour for [SimDriver]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Link {
    /// Connects on first poll
    Up,
    /// Connects after the provided number of polls
    After(u32),
    /// Never connects
    Down,
}

/// Parse `up`, `down`, or a poll count
impl FromStr for Link {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Link::Up),
            "down" => Ok(Link::Down),
            _ => s.parse().map(Link::After),
        }
    }
}

/// Events recorded by [SimDriver]
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum DriverEvent {
    Peripherals(bool),
    Actuate(Position),
    Delay(u32),
    LinkBegin,
    LinkEnd,
    Indicate(Indication),
    DeepSleep,
}

/// Recording platform driver
#[derive(Clone, Debug)]
pub struct SimDriver {
    wake: WakeCause,
    link: Link,
    link_active: bool,
    polls: u32,
    events: Vec<DriverEvent>,
}

impl SimDriver {
    /// Create a new driver reporting the provided wake cause,
    /// with a link that connects immediately
    pub fn new(wake: WakeCause) -> Self {
        Self {
            wake,
            link: Link::Up,
            link_active: false,
            polls: 0,
            events: vec![],
        }
    }

    /// Set link behaviour
    pub fn with_link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }

    /// Events recorded since creation
    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    /// Actuations in the order they were requested
    pub fn actuations(&self) -> Vec<Position> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Actuate(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Last commanded actuator position
    pub fn position(&self) -> Option<Position> {
        self.actuations().last().copied()
    }

    /// Indications in the order they were raised
    pub fn indications(&self) -> Vec<Indication> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DriverEvent::Indicate(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    /// Whether peripherals are currently powered
    pub fn peripherals(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|e| match e {
                DriverEvent::Peripherals(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Total simulated time spent in delays
    pub fn elapsed_ms(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                DriverEvent::Delay(ms) => *ms as u64,
                _ => 0,
            })
            .sum()
    }

    /// Link polls since the link was started
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Whether deep sleep was entered
    pub fn slept(&self) -> bool {
        self.events.contains(&DriverEvent::DeepSleep)
    }
}

impl Driver for SimDriver {
    fn wake_cause(&self) -> WakeCause {
        self.wake
    }

    fn set_peripherals(&mut self, on: bool) {
        self.events.push(DriverEvent::Peripherals(on));
    }

    fn actuate(&mut self, position: Position) {
        debug!("actuate: {}", position);
        self.events.push(DriverEvent::Actuate(position));
    }

    fn delay_ms(&mut self, ms: u32) {
        // Polling delays are folded into a single event
        if let Some(DriverEvent::Delay(d)) = self.events.last_mut() {
            *d = d.saturating_add(ms);
            return;
        }

        self.events.push(DriverEvent::Delay(ms));
    }

    fn link_begin(&mut self) {
        self.link_active = true;
        self.polls = 0;
        self.events.push(DriverEvent::LinkBegin);
    }

    fn link_connected(&mut self) -> bool {
        if !self.link_active {
            return false;
        }

        self.polls += 1;

        match self.link {
            Link::Up => true,
            Link::After(n) => self.polls > n,
            Link::Down => false,
        }
    }

    fn link_end(&mut self) {
        self.link_active = false;
        self.events.push(DriverEvent::LinkEnd);
    }

    fn deep_sleep(&mut self) {
        debug!("deep sleep");
        self.events.push(DriverEvent::DeepSleep);
    }

    fn indicate(&mut self, indication: Indication) {
        self.events.push(DriverEvent::Indicate(indication));
    }
}
