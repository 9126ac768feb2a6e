//! Adapter module - external control via TCP socket with a JSON protocol
//!
//! Lets an external agent play the quiz, and lets observers follow along.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7878)
//! 2. **Handshake**: client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: first client to hello becomes the controller;
//!    when it leaves, the lowest remaining client id takes over
//! 4. **Observation Streaming**: clients that asked for it get an
//!    `observation` after every state change
//! 5. **Commanding**: the controller sends `guess` and `restart` commands;
//!    each is acked after the game loop applied it
//!
//! Sequence numbers must strictly increase per client. Commands pass through
//! a bounded queue; when it is full the client gets a `backpressure` error.
//!
//! # Environment Variables
//!
//! - `QUIZ_AI_HOST`: bind address (default: "127.0.0.1")
//! - `QUIZ_AI_PORT`: port number (default: 7878)
//! - `QUIZ_AI_MAX_PENDING`: command queue size (default: 10)
//! - `QUIZ_AI_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! S: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! S: {"type":"observation","seq":1,"ts":...,"phase":"active","attempts_left":7,...}
//! C: {"type":"command","seq":2,"ts":0,"action":"guess","guess":"قطار"}
//! S: {"type":"ack","seq":2,"ts":...,"status":"ok","outcome":{"result":"revealed","slot":3,"points":20}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_quiz_core as core;
pub use tui_quiz_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, AdapterStatus, ClientOutbound, ServerConfig, StatusSnapshot};
