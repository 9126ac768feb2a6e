//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The server
//! runs on its own tokio runtime; the loop polls commands with
//! [`Adapter::try_recv`] and answers through the outbound channel.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::core::{RoundSnapshot, SubmitOutcome};
use crate::protocol::{build_observation, create_ack, create_error, AckMessage, ErrorCode, ErrorMessage, ObservationMessage};
use crate::server::{run_server, AdapterStatus, ServerConfig, StatusSnapshot};

const BIND_TIMEOUT: Duration = Duration::from_secs(2);

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A streaming client finished its handshake and wants the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Guess(String),
    Restart,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
    local_addr: SocketAddr,
    obs_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `QUIZ_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("adapter disabled via QUIZ_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Bind and start serving. Fails if the listener cannot be bound.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let status = Arc::new(AdapterStatus::default());

        let rt = Runtime::new().context("create tokio runtime")?;
        let server_status = Arc::clone(&status);
        rt.spawn(async move {
            if let Err(e) = run_server(config, server_status, cmd_tx, out_rx, Some(ready_tx)).await {
                error!(error = %e, "adapter server stopped");
            }
        });

        let local_addr = rt
            .block_on(async { tokio::time::timeout(BIND_TIMEOUT, ready_rx).await })
            .context("adapter did not start in time")?
            .map_err(|_| anyhow!("adapter failed to bind"))?;

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status,
            local_addr,
            obs_seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Acknowledge an applied command; guesses carry their outcome.
    pub fn ack(&self, client_id: usize, seq: u64, outcome: Option<SubmitOutcome>) {
        self.send(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(seq, outcome.map(Into::into)),
        });
    }

    pub fn reject(&self, client_id: usize, seq: u64, code: ErrorCode, message: &str) {
        self.send(OutboundMessage::ToClientError {
            client_id,
            err: create_error(seq, code, message),
        });
    }

    /// Send the current state to one client.
    pub fn observe_to(&mut self, client_id: usize, snap: &RoundSnapshot) {
        let obs = build_observation(snap, self.next_obs_seq());
        self.send(OutboundMessage::ToClientObservation { client_id, obs });
    }

    /// Send the current state to every streaming client.
    pub fn broadcast(&mut self, snap: &RoundSnapshot) {
        let obs = build_observation(snap, self.next_obs_seq());
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    fn next_obs_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }
}
