// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::time::Duration;

use log::{debug, warn};
use reqwest::{blocking::Client, header::CONTENT_TYPE};

use lockbox_core::{
    api::{is_granted, AccessReq, AccessService, Endpoint, CONTENT_TYPE_JSON},
    CardIdentity,
};

use crate::{Error, ServiceConfig};

/// Blocking HTTP client for the lockbox access service
#[derive(Clone, Debug)]
pub struct AccessClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl AccessClient {
    /// Create a new client with the provided service configuration
    pub fn new(cfg: &ServiceConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_s))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }

    /// Issue a request for the provided identity, returning the response status
    pub fn request(&self, endpoint: Endpoint, identity: &CardIdentity) -> Result<u16, Error> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let body = serde_json::to_vec(&AccessReq::new(*identity))?;

        debug!("POST {} (uuid: {})", url, identity);

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()?;

        let status = resp.status().as_u16();

        debug!("{} response: {}", endpoint, status);

        Ok(status)
    }
}

impl AccessService for AccessClient {
    type Error = Error;

    fn enroll(&mut self, identity: &CardIdentity) -> Result<(), Self::Error> {
        // Response status is not meaningful for enrollment
        let _status = self.request(Endpoint::Enroll, identity)?;

        Ok(())
    }

    fn check_access(&mut self, identity: &CardIdentity) -> bool {
        match self.request(Endpoint::CheckAccess, identity) {
            Ok(status) => is_granted(status),
            Err(e) => {
                warn!("check access failed: {}", e);
                false
            }
        }
    }
}
