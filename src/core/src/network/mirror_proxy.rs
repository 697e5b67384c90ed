//! Mirror proxy server.
//!
//! A [`MirrorProxy`] listens on an OS-assigned loopback port in front of a
//! local service. Every accepted connection is relayed to
//! `127.0.0.1:<local_port>` while the inbound→local direction is recorded
//! into a bounded [`CaptureRecorder`]. When the connection ends, the capture
//! may be sampled, redacted, forwarded to a mirror target and persisted.
//!
//! Minimal usage
//! ```no_run
//! use kt_mirror::configuration::MirrorConfig;
//! use kt_mirror::network::start_mirror_proxy;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfig {
//!     sample_rate: 100,
//!     log_path: Some("./mirror-logs".into()),
//!     ..Default::default()
//! };
//! // route inbound traffic to `proxy_port` instead of 8080
//! let proxy_port = start_mirror_proxy(8080, config).await?;
//! # let _ = proxy_port;
//! # Ok(())
//! # }
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::configuration::MirrorConfig;
use crate::data_capture::CaptureRecorder;
use crate::error_handling::types::NetworkError;
use crate::redaction::{self, RedactRule};
use crate::sampling::Sampler;
use crate::storage::{FileStorage, MirrorLogEntry, Storage};

use super::best_effort::{BestEffortSink, SideEffect};
use super::payload_sender::send_payload;
use super::relay::{relay, Direction};

/// Relay in front of one local service port.
///
/// Redact rules are compiled and the sampling source is seeded once, when
/// the proxy is built; the configuration is never mutated afterwards.
pub struct MirrorProxy {
    local_port: u16,
    config: MirrorConfig,
    rules: Vec<RedactRule>,
    sampler: Sampler,
    storage: Option<Arc<dyn Storage>>,
    sink: BestEffortSink,
}

impl MirrorProxy {
    pub fn new(local_port: u16, config: MirrorConfig) -> Self {
        let rules = redaction::parse(&config.redact_rules);
        let sampler = Sampler::from_seed(config.seed);
        let storage = config
            .log_path()
            .map(|p| Arc::new(FileStorage::new(p)) as Arc<dyn Storage>);
        Self {
            local_port,
            config,
            rules,
            sampler,
            storage,
            sink: BestEffortSink::new(),
        }
    }

    /// Replaces the sampling source.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Replaces the backend sampled entries are persisted to.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Binds `127.0.0.1:0` and returns the assigned port right away.
    ///
    /// The accept loop keeps running in a background task. An accept error
    /// ends it for good: the listener is dropped and nobody is notified.
    pub async fn start(self) -> Result<u16, NetworkError> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .map_err(NetworkError::BindError)?;
        let proxy_port = listener
            .local_addr()
            .map_err(NetworkError::BindError)?
            .port();
        info!(
            "Mirror proxy listening on 127.0.0.1:{} for local port {}",
            proxy_port, self.local_port
        );
        if !self.config.enabled() {
            debug!(
                "Mirroring disabled for local port {}, relaying only",
                self.local_port
            );
        }

        let this = Arc::new(self);
        tokio::spawn(async move { this.accept_loop(listener).await });
        Ok(proxy_port)
    }

    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move { this.handle_connection(stream, peer).await });
                }
                Err(e) => {
                    warn!("Mirror proxy accept failed: {}", e);
                    return;
                }
            }
        }
    }

    async fn handle_connection(&self, inbound: TcpStream, peer: SocketAddr) {
        let conn_id = Uuid::new_v4();
        debug!("[{}] accepted connection from {}", conn_id, peer);

        let local = match TcpStream::connect((Ipv4Addr::LOCALHOST, self.local_port)).await {
            Ok(stream) => stream,
            Err(source) => {
                let e = NetworkError::LocalConnectFailed {
                    port: self.local_port,
                    source,
                };
                error!("[{}] Mirror proxy failed to connect to local service: {}", conn_id, e);
                return;
            }
        };

        let recorder = Arc::new(CaptureRecorder::default());
        relay_until_first_done(conn_id, inbound, local, Arc::clone(&recorder)).await;
        self.finalize(conn_id, peer, &recorder).await;
    }

    /// Sampling, redaction and the two side effects, run once per connection
    /// after relaying ended.
    async fn finalize(&self, conn_id: Uuid, peer: SocketAddr, recorder: &CaptureRecorder) {
        let payload = recorder.snapshot();
        let truncated = recorder.truncated();

        if !self.sampler.should_sample(self.config.sample_rate) {
            debug!("[{}] connection not sampled", conn_id);
            return;
        }
        if payload.is_empty() {
            debug!("[{}] nothing captured", conn_id);
            return;
        }

        let (payload, redacted) = redaction::apply(&payload, &self.rules);
        debug!(
            "[{}] sampled {} byte(s), truncated={}, redacted={}",
            conn_id,
            payload.len(),
            truncated,
            redacted
        );

        if let Some(target) = self.config.target() {
            let result = send_payload(target, &payload).await;
            self.sink.report(conn_id, SideEffect::MirrorForward, result);
        }
        if let Some(ref storage) = self.storage {
            let entry = MirrorLogEntry::new(
                peer.to_string(),
                self.config.local_address.clone(),
                &payload,
                truncated,
                redacted,
            );
            self.sink
                .report(conn_id, SideEffect::LogPersist, storage.save_entry(&entry));
        }
    }
}

/// Relays both directions and returns as soon as either one finishes.
///
/// The remaining task is cancelled; dropping its socket halves together with
/// the finished task's halves closes both connections.
async fn relay_until_first_done(
    conn_id: Uuid,
    inbound: TcpStream,
    local: TcpStream,
    recorder: Arc<CaptureRecorder>,
) {
    let (inbound_read, inbound_write) = inbound.into_split();
    let (local_read, local_write) = local.into_split();

    let mut set = JoinSet::new();
    set.spawn(async move {
        let direction = Direction::InboundToLocal;
        let result = relay(conn_id, direction, inbound_read, local_write, Some(recorder)).await;
        (direction, result)
    });
    set.spawn(async move {
        let direction = Direction::LocalToInbound;
        let result = relay(conn_id, direction, local_read, inbound_write, None).await;
        (direction, result)
    });

    if let Some(first) = set.join_next().await {
        match first {
            Ok((direction, Ok(n))) => {
                debug!("[{}] {} finished after {} byte(s)", conn_id, direction, n)
            }
            Ok((direction, Err(e))) => {
                debug!("[{}] {} interrupted: {}", conn_id, direction, e)
            }
            Err(e) => debug!("[{}] relay task failed: {}", conn_id, e),
        }
    }

    set.abort_all();
    while let Some(rest) = set.join_next().await {
        match rest {
            Ok((direction, Ok(n))) => {
                debug!("[{}] {} finished after {} byte(s)", conn_id, direction, n)
            }
            Ok((direction, Err(e))) => {
                debug!("[{}] {} interrupted: {}", conn_id, direction, e)
            }
            Err(e) if e.is_cancelled() => debug!("[{}] remaining relay closed", conn_id),
            Err(e) => debug!("[{}] relay task failed: {}", conn_id, e),
        }
    }
}

/// Starts a [`MirrorProxy`] for `local_port` and returns the proxy port the
/// caller must route inbound traffic to.
pub async fn start_mirror_proxy(local_port: u16, config: MirrorConfig) -> Result<u16, NetworkError> {
    MirrorProxy::new(local_port, config).start().await
}
