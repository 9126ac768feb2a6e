use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tui_quiz::adapter::protocol::{build_observation, create_ack, create_guess, create_hello};
use tui_quiz::adapter::{
    run_server, AdapterStatus, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
    ServerConfig,
};
use tui_quiz::core::{RoundEngine, SubmitOutcome};
use tui_quiz::types::{Answer, Question};

struct TestServer {
    addr: std::net::SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status: Arc<AdapterStatus>,
    handle: JoinHandle<()>,
}

async fn start_server(max_pending_commands: usize) -> TestServer {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands,
    };
    let status = Arc::new(AdapterStatus::default());

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending_commands);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let handle = {
        let status = Arc::clone(&status);
        tokio::spawn(async move {
            let _ = run_server(config, status, cmd_tx, out_rx, Some(ready_tx)).await;
        })
    };

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    TestServer {
        addr,
        cmd_rx,
        out_tx,
        status,
        handle,
    }
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn send<T: serde::Serialize>(&mut self, msg: &T) {
        let line = serde_json::to_string(msg).unwrap();
        self.send_line(&line).await;
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timeout waiting for line")
            .expect("io error")
            .expect("expected line");
        serde_json::from_str(&line).unwrap()
    }

    async fn hello(&mut self, seq: u64, name: &str, stream: bool) -> serde_json::Value {
        self.send(&create_hello(seq, name, stream)).await;
        let welcome = self.recv().await;
        assert_eq!(welcome["type"], "welcome", "expected welcome, got {welcome}");
        welcome
    }
}

fn sample_engine() -> RoundEngine {
    let mut engine = RoundEngine::new();
    engine
        .start_session(vec![Question::new(
            "وسيلة نقل؟",
            30,
            vec![Answer::new("سيارة", 50), Answer::new("قطار", 20)],
        )])
        .unwrap();
    engine
}

#[tokio::test]
async fn adapter_hello_guess_ack_and_observation() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    let welcome = client.hello(1, "e2e-test", true).await;
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["client_id"], 1);
    assert_eq!(welcome["controller_id"], 1);
    assert_eq!(welcome["game_id"], "tui-quiz");

    // A streaming hello asks the game loop for the current state.
    let inbound = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected snapshot request");
    assert_eq!(inbound.payload, InboundPayload::SnapshotRequest);

    client.send(&create_guess(2, "قطار")).await;
    let inbound = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected inbound command");
    assert_eq!(inbound.seq, 2);
    assert_eq!(
        inbound.payload,
        InboundPayload::Command(ClientCommand::Guess("قطار".to_string()))
    );

    let mut engine = sample_engine();
    let outcome = engine.submit("قطار");
    assert_eq!(outcome, SubmitOutcome::Revealed { slot: 1, points: 20 });
    server
        .out_tx
        .send(OutboundMessage::ToClientAck {
            client_id: inbound.client_id,
            ack: create_ack(2, Some(outcome.into())),
        })
        .unwrap();

    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");
    assert_eq!(ack["outcome"]["result"], "revealed");
    assert_eq!(ack["outcome"]["slot"], 1);
    assert_eq!(ack["outcome"]["points"], 20);

    let obs = build_observation(&engine.snapshot(), 10);
    server
        .out_tx
        .send(OutboundMessage::BroadcastObservation { obs })
        .unwrap();

    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["seq"], 10);
    assert_eq!(obs["phase"], "active");
    assert_eq!(obs["score"], 20);
    assert_eq!(obs["slots"][1]["text"], "قطار");
    assert!(obs["slots"][0].get("text").is_none());

    server.handle.abort();
}

#[tokio::test]
async fn adapter_requires_handshake_before_commands() {
    let server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    client.send(&create_guess(1, "قطار")).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 1);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_second_client_is_observer() {
    let mut server = start_server(8).await;
    let mut first = TestClient::connect(server.addr).await;
    first.hello(1, "first", false).await;

    let mut second = TestClient::connect(server.addr).await;
    let welcome = second.hello(1, "second", false).await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["client_id"], 2);
    assert_eq!(welcome["controller_id"], 1);

    second.send(&create_guess(2, "قطار")).await;
    let err = second.recv().await;
    assert_eq!(err["code"], "not_controller");
    assert!(server.cmd_rx.try_recv().is_err());

    let status = server.status.snapshot();
    assert_eq!(status.client_count, 2);
    assert_eq!(status.controller_id, Some(1));
    assert_eq!(status.streaming_count, 0);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_rejects_non_increasing_seq() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(5, "seq", false).await;

    client.send(&create_guess(5, "قطار")).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    client.send(&create_guess(6, "قطار")).await;
    let inbound = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected inbound command");
    assert_eq!(inbound.seq, 6);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let server = start_server(1).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(1, "flood", false).await;

    // Nobody drains the queue: the first command fills it.
    client.send(&create_guess(2, "a")).await;
    client.send(&create_guess(3, "b")).await;

    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    server.handle.abort();
}

#[tokio::test]
async fn adapter_protocol_mismatch_closes_connection() {
    let server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    let mut hello = create_hello(1, "future", false);
    hello.protocol_version = "2.0.0".to_string();
    client.send(&hello).await;

    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");

    let eof = tokio::time::timeout(Duration::from_secs(2), client.lines.next_line())
        .await
        .unwrap()
        .unwrap();
    assert!(eof.is_none());

    server.handle.abort();
}

#[tokio::test]
async fn adapter_reports_bad_lines_without_dropping_client() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(1, "sloppy", false).await;

    client.send_line(r#"{"type":"dance","seq":2}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    client.send_line(r#"{"seq":3, "type":"command", oops"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 3);

    client
        .send_line(r#"{"type":"command","seq":4,"ts":0,"action":"fly"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");

    client
        .send_line(r#"{"type":"command","seq":5,"ts":0,"action":"RESTART"}"#)
        .await;
    let inbound = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected inbound command");
    assert_eq!(inbound.payload, InboundPayload::Command(ClientCommand::Restart));

    server.handle.abort();
}

#[tokio::test]
async fn adapter_streaming_hello_waits_for_queue_space() {
    let mut server = start_server(1).await;
    let mut controller = TestClient::connect(server.addr).await;
    controller.hello(1, "busy", false).await;

    // Nobody drains yet: this command fills the queue.
    controller.send(&create_guess(2, "a")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut watcher = TestClient::connect(server.addr).await;
    let welcome = watcher.hello(1, "watcher", true).await;
    assert_eq!(welcome["role"], "observer");

    let first = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("expected queued command");
    assert_eq!(first.payload, InboundPayload::Command(ClientCommand::Guess("a".to_string())));

    let second = tokio::time::timeout(Duration::from_secs(2), server.cmd_rx.recv())
        .await
        .unwrap()
        .expect("snapshot request must not be dropped");
    assert_eq!(second.client_id, 2);
    assert_eq!(second.payload, InboundPayload::SnapshotRequest);

    server.handle.abort();
}
