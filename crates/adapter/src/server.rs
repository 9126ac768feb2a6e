//! TCP server for the quiz adapter
//!
//! Handles incoming connections and manages client lifecycle. Uses tokio for
//! async networking; the game loop on the other side of the command channel
//! is the only writer of quiz state.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, trace, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `QUIZ_AI_HOST`, `QUIZ_AI_PORT` and `QUIZ_AI_MAX_PENDING`.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("QUIZ_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("QUIZ_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("QUIZ_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }

    /// `QUIZ_AI_DISABLED` set to "1" or "true".
    pub fn is_disabled() -> bool {
        std::env::var("QUIZ_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Connection counters readable from the game loop without touching tokio.
#[derive(Debug, Default)]
pub struct AdapterStatus {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// 0 means no controller (client ids start at 1).
    controller: AtomicUsize,
}

/// Point-in-time copy of [`AdapterStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub client_count: u16,
    pub streaming_count: u16,
    pub controller_id: Option<usize>,
}

impl AdapterStatus {
    pub fn snapshot(&self) -> StatusSnapshot {
        let controller = self.controller.load(Ordering::Relaxed);
        StatusSnapshot {
            client_count: self.clients.load(Ordering::Relaxed),
            streaming_count: self.streaming.load(Ordering::Relaxed),
            controller_id: (controller != 0).then_some(controller),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status: Arc<AdapterStatus>,
}

impl ServerState {
    pub fn new(status: Arc<AdapterStatus>) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status,
        }
    }

    fn publish_status(&self, clients: &[ClientHandle], controller: Option<usize>) {
        let streaming = clients.iter().filter(|c| c.stream_observations).count();
        self.status
            .clients
            .store(clients.len() as u16, Ordering::Relaxed);
        self.status
            .streaming
            .store(streaming as u16, Ordering::Relaxed);
        self.status
            .controller
            .store(controller.unwrap_or(0), Ordering::Relaxed);
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, obs: ObservationMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
        }
    }
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn is_controller(state: &ServerState, client_id: usize) -> bool {
    *state.controller.read().await == Some(client_id)
}

/// Record `seq` for the client; false when it does not strictly increase.
async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (useful
/// with port 0).
pub async fn run_server(
    config: ServerConfig,
    status: Arc<AdapterStatus>,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(status));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(obs).await;
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

fn encode_line<T: Serialize>(buf: &mut Vec<u8>, value: &T) -> bool {
    buf.clear();
    if serde_json::to_writer(&mut *buf, value).is_err() {
        return false;
    }
    buf.push(b'\n');
    true
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let controller = *state.controller.read().await;
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.publish_status(&clients, controller);
    }

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let ok = match &msg {
                ClientOutbound::Welcome(m) => encode_line(&mut buf, m),
                ClientOutbound::Ack(m) => encode_line(&mut buf, m),
                ClientOutbound::Error(m) => encode_line(&mut buf, m),
                ClientOutbound::Observation(m) => encode_line(&mut buf, m),
            };
            if !ok {
                continue;
            }
            trace!(client_id, line = %String::from_utf8_lossy(&buf).trim_end(), "send");
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        // Read errors end the session like EOF so the cleanup below always runs.
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(client_id, error = %e, "read failed");
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        trace!(client_id, line = trimmed, "recv");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if major_version(&hello.protocol_version) != major_version(PROTOCOL_VERSION) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let mut controller = state.controller.write().await;
                let mut clients = state.clients.write().await;
                if controller.is_none() {
                    *controller = Some(client_id);
                    info!(client_id, "client is now controller");
                }
                let role = if *controller == Some(client_id) {
                    AssignedRole::Controller
                } else {
                    AssignedRole::Observer
                };
                if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                    client.handshaken = true;
                    client.last_seq = Some(hello.seq);
                    client.is_controller = role == AssignedRole::Controller;
                    client.stream_observations = hello.requested.stream_observations;
                }
                state.publish_status(&clients, *controller);

                let welcome = create_welcome(
                    hello.seq,
                    client_id as u64,
                    role,
                    controller.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));
                drop(clients);
                drop(controller);
                debug!(client_id, client = %hello.client.name, ?role, "handshake complete");

                // Waits for queue space instead of dropping the first observation.
                if hello.requested.stream_observations {
                    let request = InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    };
                    if command_tx.send(request).await.is_err() {
                        warn!(client_id, "game loop gone, no initial observation");
                    }
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(&state, client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !is_controller(&state, client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, message);
                        continue;
                    }
                };

                // Acked by the game loop once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, msg.seq).await
                {
                    reply_error(msg.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply_error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
            }
        }
    }

    // Remove the client and promote the lowest remaining id if it was controller.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        clients.retain(|c| c.id != client_id);
        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => {
                    if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                        c.is_controller = true;
                    }
                    info!(client_id = new_id, "controller promoted");
                }
                None => info!(client_id, "controller released"),
            }
        }
        state.publish_status(&clients, *controller);
    }

    drop(reply_error);
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

fn major_version(v: &str) -> &str {
    v.split('.').next().unwrap_or(v)
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match cmd.action {
        CommandAction::Guess => match &cmd.guess {
            Some(guess) => Ok(ClientCommand::Guess(guess.clone())),
            None => Err("guess command needs a \"guess\" field"),
        },
        CommandAction::Restart => Ok(ClientCommand::Restart),
    }
}
