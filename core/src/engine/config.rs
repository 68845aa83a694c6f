// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Power-up settle time before actuation
pub const POWER_UP_MS: u32 = 100;

/// Mechanical settle time after closing the lock
pub const CLOSE_SETTLE_MS: u32 = 1_000;

/// Time the lock is held open once access is granted
pub const OPEN_DWELL_MS: u32 = 1_000;

/// Interval between wireless link polls
pub const NETWORK_POLL_MS: u32 = 50;

/// Maximum wait for the wireless link to connect
pub const NETWORK_TIMEOUT_MS: u32 = 15_000;

/// [Engine][super::Engine] timing configuration
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Delay after powering peripherals, before first actuation
    pub power_up_ms: u32,
    /// Delay after closing before powering down
    pub close_settle_ms: u32,
    /// Delay holding the lock open
    pub open_dwell_ms: u32,
    /// Wireless link poll interval
    pub network_poll_ms: u32,
    /// Wireless link timeout, exceeding this is treated as a network failure
    pub network_timeout_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            power_up_ms: POWER_UP_MS,
            close_settle_ms: CLOSE_SETTLE_MS,
            open_dwell_ms: OPEN_DWELL_MS,
            network_poll_ms: NETWORK_POLL_MS,
            network_timeout_ms: NETWORK_TIMEOUT_MS,
        }
    }
}
