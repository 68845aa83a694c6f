// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Lockbox cycle errors
///
/// None of these are fatal to the device, each collapses to "do not unlock"
/// for the current cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// No card in range during the detection window
    #[cfg_attr(feature = "thiserror", error("no card present"))]
    NoCardPresent = 0x00,

    /// Card authenticate / read / write failed
    #[cfg_attr(feature = "thiserror", error("card communication failed"))]
    CardCommunication = 0x01,

    /// Identity committed but trailer rewrite failed
    #[cfg_attr(feature = "thiserror", error("partial enrollment, trailer not rewritten"))]
    PartialEnrollment = 0x02,

    /// Card accepts neither the factory nor the device key
    #[cfg_attr(feature = "thiserror", error("unknown card"))]
    UnknownCard = 0x03,

    /// Wireless link did not connect within the timeout
    #[cfg_attr(feature = "thiserror", error("network unavailable"))]
    NetworkUnavailable = 0x04,

    /// Access service denied the card
    #[cfg_attr(feature = "thiserror", error("access denied"))]
    AccessDenied = 0x05,

    /// Access service request failed
    #[cfg_attr(feature = "thiserror", error("access service request failed"))]
    Service = 0x06,
}
