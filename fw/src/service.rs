// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Access service over the ESP-IDF HTTP client

use core::time::Duration;

use embedded_svc::{http::client::Client, io::Write};
use esp_idf_svc::{
    http::client::{Configuration, EspHttpConnection},
    sys,
};
use log::{debug, warn};

use lockbox_core::{
    api::{is_granted, AccessReq, AccessService, Endpoint, CONTENT_TYPE_JSON},
    CardIdentity,
};

use crate::consts::{BASE_URL, BASIC_AUTH, HTTP_TIMEOUT_S};

/// Access service client, a connection is opened per request
pub struct EspAccessService;

impl EspAccessService {
    fn post(&self, endpoint: Endpoint, identity: &CardIdentity) -> anyhow::Result<u16> {
        let conn = EspHttpConnection::new(&Configuration {
            timeout: Some(Duration::from_secs(HTTP_TIMEOUT_S)),
            crt_bundle_attach: Some(sys::esp_crt_bundle_attach),
            ..Default::default()
        })?;
        let mut client = Client::wrap(conn);

        let url = format!("{}{}", BASE_URL.trim_end_matches('/'), endpoint.path());
        let body = serde_json::to_vec(&AccessReq::new(*identity))?;
        let len = body.len().to_string();

        let headers = [
            ("authorization", BASIC_AUTH),
            ("content-type", CONTENT_TYPE_JSON),
            ("content-length", len.as_str()),
        ];

        debug!("POST {} (uuid: {})", url, identity);

        let mut req = client.post(&url, &headers)?;
        req.write_all(&body)?;
        req.flush()?;

        let resp = req.submit()?;
        let status = resp.status();

        debug!("{} response: {}", endpoint, status);

        Ok(status)
    }
}

impl AccessService for EspAccessService {
    type Error = anyhow::Error;

    fn enroll(&mut self, identity: &CardIdentity) -> Result<(), Self::Error> {
        let _status = self.post(Endpoint::Enroll, identity)?;
        Ok(())
    }

    fn check_access(&mut self, identity: &CardIdentity) -> bool {
        match self.post(Endpoint::CheckAccess, identity) {
            Ok(status) => is_granted(status),
            Err(e) => {
                warn!("check access failed: {:?}", e);
                false
            }
        }
    }
}
