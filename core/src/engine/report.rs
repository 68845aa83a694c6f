// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::{card::Outcome, Error};

use super::WakeCause;

/// Summary of a completed wake cycle, returned by [Engine::run][super::Engine::run]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Report {
    /// Cause of the wake that started this cycle
    pub wake: WakeCause,

    /// Card read result, `None` where no read was attempted
    pub outcome: Option<Outcome>,

    /// Whether the service granted access
    pub granted: bool,

    /// Lock state persisted for the next cycle
    pub engaged: bool,

    /// Network failure, where the link did not come up
    pub network: Option<Error>,

    /// Enroll request failure, the cycle outcome is unaffected
    pub service: Option<Error>,
}

impl Report {
    /// Fetch the reason access was not granted, if any
    pub fn error(&self) -> Option<Error> {
        if let Some(e) = self.network {
            return Some(e);
        }

        match self.outcome {
            Some(Outcome::NoCard) => Some(Error::NoCardPresent),
            Some(Outcome::ReadFailure { cause }) => Some(cause),
            Some(Outcome::EnrolledCard { .. }) if !self.granted => Some(Error::AccessDenied),
            _ => self.service,
        }
    }
}
