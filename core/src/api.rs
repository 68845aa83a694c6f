// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Access service contract
//!
//! Both operations `POST` an [AccessReq] (`{"uuid":"<32 lowercase hex>"}`) with
//! HTTP Basic credentials and `Content-Type: application/json`.
//!
//! - [Endpoint::Enroll] registers an identity, the response is not interpreted
//! - [Endpoint::CheckAccess] grants access if and only if the service responds
//!   `204 No Content`

use core::fmt::Debug;

use strum::{Display, EnumIter, EnumString};

use crate::CardIdentity;

/// Status returned by the service when access is granted
pub const STATUS_NO_CONTENT: u16 = 204;

/// JSON content type for request bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Access service endpoints
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Endpoint {
    /// Register a card identity
    Enroll,
    /// Check whether a card identity may open the box
    CheckAccess,
}

impl Endpoint {
    /// Path relative to the service base URL
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::Enroll => "/api/cards/new",
            Endpoint::CheckAccess => "/api/cards/use",
        }
    }
}

/// Request body shared by both endpoints
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessReq {
    pub uuid: CardIdentity,
}

impl AccessReq {
    pub fn new(uuid: CardIdentity) -> Self {
        Self { uuid }
    }
}

/// Map a check-access response status to an access decision
pub fn is_granted(status: u16) -> bool {
    status == STATUS_NO_CONTENT
}

/// [`AccessService`] provides the remote enroll and check-access operations
pub trait AccessService {
    type Error: Debug;

    /// Register an identity with the service.
    ///
    /// Any HTTP response is success, errors only report transport failures.
    fn enroll(&mut self, identity: &CardIdentity) -> Result<(), Self::Error>;

    /// Check whether an identity is granted access.
    ///
    /// Returns `false` for any failure, this never raises.
    fn check_access(&mut self, identity: &CardIdentity) -> bool;
}

impl<T: AccessService> AccessService for &mut T {
    type Error = T::Error;

    fn enroll(&mut self, identity: &CardIdentity) -> Result<(), Self::Error> {
        T::enroll(self, identity)
    }

    fn check_access(&mut self, identity: &CardIdentity) -> bool {
        T::check_access(self, identity)
    }
}
