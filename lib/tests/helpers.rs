// Copyright (c) 2022-2023 The MobileCoin Foundation

use lockbox::{AccessClient, ServiceConfig};
use lockbox_sim::*;

pub const USERNAME: &str = "lockbox";
pub const PASSWORD: &str = "test-password";

/// Start a simulated access backend with the provided cards
#[allow(unused)]
pub fn setup(
    cards: impl IntoIterator<Item = (lockbox::CardIdentity, i64)>,
    force_status: Option<u16>,
) -> (SimServer, AccessClient) {
    lockbox_tests::setup_logging();

    let opts = ServerOptions {
        port: 0,
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        force_status,
    };

    let server = SimServer::spawn(&opts, SharedBackend::new(Backend::with_cards(cards)))
        .expect("Failed to start access backend");

    let client = client(&server);

    (server, client)
}

/// Create a client for the provided backend
#[allow(unused)]
pub fn client(server: &SimServer) -> AccessClient {
    AccessClient::new(&ServiceConfig {
        base_url: server.base_url(),
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
        timeout_s: 2,
    })
    .expect("Failed to create client")
}
