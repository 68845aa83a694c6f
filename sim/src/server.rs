// Copyright (c) 2022-2023 The MobileCoin Foundation

//! HTTP access backend
//!
//! Serves [Endpoint::Enroll] and [Endpoint::CheckAccess] over a [SharedBackend],
//! with HTTP Basic authentication on all API routes.

use std::{
    convert::Infallible,
    future::Future,
    net::{Ipv4Addr, SocketAddr, TcpListener},
    sync::{Arc, Mutex},
    time::Duration,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper::{
    header,
    service::{make_service_fn, service_fn},
    Body, HeaderMap, Method, Request, Response, Server, StatusCode,
};
use log::{debug, error, info};
use tokio::{runtime::Runtime, sync::oneshot};

use lockbox_core::{
    api::{AccessReq, Endpoint},
    CardIdentity,
};

use crate::SharedBackend;

const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_NOT_FOUND: u16 = 404;

/// HTTP server options
#[derive(Clone, PartialEq, Debug, clap::Parser)]
pub struct ServerOptions {
    /// Port to listen on (0 to pick a free port)
    #[clap(long, default_value = "8080", env = "LOCKBOX_SIM_PORT")]
    pub port: u16,

    /// Basic auth username
    #[clap(long, default_value = "lockbox", env = "LOCKBOX_USERNAME")]
    pub username: String,

    /// Basic auth password
    #[clap(long, default_value = "lockbox", env = "LOCKBOX_PASSWORD")]
    pub password: String,

    /// Respond with this status to every authorised API request
    #[clap(long)]
    pub force_status: Option<u16>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: 0,
            username: "lockbox".to_string(),
            password: "lockbox".to_string(),
            force_status: None,
        }
    }
}

/// Request observed by the server
#[derive(Clone, PartialEq, Debug)]
pub struct Hit {
    pub endpoint: Endpoint,
    pub identity: Option<CardIdentity>,
    pub content_type: Option<String>,
    pub status: u16,
}

/// Shared server state
#[derive(Debug)]
pub struct ServerState {
    backend: SharedBackend,
    authorization: String,
    force_status: Option<u16>,
    hits: Mutex<Vec<Hit>>,
}

impl ServerState {
    pub fn new(opts: &ServerOptions, backend: SharedBackend) -> Self {
        let creds = STANDARD.encode(format!("{}:{}", opts.username, opts.password));

        Self {
            backend,
            authorization: format!("Basic {creds}"),
            force_status: opts.force_status,
            hits: Mutex::new(vec![]),
        }
    }

    /// Backend served by this instance
    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Requests to known endpoints since creation
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn authorised(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .map(|v| v.as_bytes() == self.authorization.as_bytes())
            .unwrap_or(false)
    }

    /// Handle a request, returning the response status
    async fn route(&self, req: Request<Body>) -> u16 {
        let endpoint = match (req.method(), req.uri().path()) {
            (&Method::POST, p) if p == Endpoint::Enroll.path() => Endpoint::Enroll,
            (&Method::POST, p) if p == Endpoint::CheckAccess.path() => Endpoint::CheckAccess,
            (m, p) => {
                debug!("no route for {} {}", m, p);
                return STATUS_NOT_FOUND;
            }
        };

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let mut hit = Hit {
            endpoint,
            identity: None,
            content_type,
            status: STATUS_UNAUTHORIZED,
        };

        if self.authorised(req.headers()) {
            hit.status = match hyper::body::to_bytes(req.into_body()).await {
                Ok(b) => match serde_json::from_slice::<AccessReq>(&b) {
                    Ok(r) => {
                        hit.identity = Some(r.uuid);
                        self.apply(endpoint, &r.uuid)
                    }
                    Err(e) => {
                        debug!("invalid request body: {}", e);
                        STATUS_BAD_REQUEST
                    }
                },
                Err(e) => {
                    debug!("failed to read request body: {}", e);
                    STATUS_BAD_REQUEST
                }
            };
        }

        info!("{} {:?}: {}", endpoint, hit.identity, hit.status);

        let status = hit.status;
        self.hits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(hit);

        status
    }

    fn apply(&self, endpoint: Endpoint, identity: &CardIdentity) -> u16 {
        if let Some(s) = self.force_status {
            return s;
        }

        let mut b = self.backend.lock();
        match endpoint {
            Endpoint::Enroll => b.create(identity),
            Endpoint::CheckAccess => b.use_card(identity),
        }
    }
}

async fn handle(state: Arc<ServerState>, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let status = state.route(req).await;

    let mut resp = Response::new(Body::empty());
    *resp.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok(resp)
}

/// Serve the access backend on the provided listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), hyper::Error> {
    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(state.clone(), req))) }
    });

    Server::from_tcp(listener)?
        .serve(make_svc)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Access backend running on a background runtime, stopped on drop
pub struct SimServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    exit_tx: Option<oneshot::Sender<()>>,
    rt: Option<Runtime>,
}

impl SimServer {
    /// Start a server on localhost with the provided options and backend
    pub fn spawn(opts: &ServerOptions, backend: SharedBackend) -> anyhow::Result<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, opts.port))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = Arc::new(ServerState::new(opts, backend));
        let (exit_tx, exit_rx) = oneshot::channel::<()>();

        let s = state.clone();
        rt.spawn(async move {
            let exit = async {
                let _ = exit_rx.await;
            };

            if let Err(e) = serve(listener, s, exit).await {
                error!("server error: {}", e);
            }
        });

        debug!("access backend listening on {}", addr);

        Ok(Self {
            addr,
            state,
            exit_tx: Some(exit_tx),
            rt: Some(rt),
        })
    }

    /// Listening address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Server state (backend and observed requests)
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

impl Drop for SimServer {
    fn drop(&mut self) {
        if let Some(tx) = self.exit_tx.take() {
            let _ = tx.send(());
        }
        if let Some(rt) = self.rt.take() {
            rt.shutdown_timeout(Duration::from_secs(1));
        }
    }
}
