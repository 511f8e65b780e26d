//! Adapter module - external control via TCP socket with JSON protocol
//!
//! This module lets an external agent (a bot, a test harness, a remote UI)
//! drive a match-3 session over a TCP socket.
//!
//! # Protocol Overview
//!
//! The adapter speaks a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//!    unless it asked to observe
//! 4. **Observations**: Every client receives a snapshot after its welcome,
//!    and streaming clients receive one after each command that touched the board
//! 5. **Commanding**: Controller sends `swap`, `powerup`, `reset` or `hint`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested role
//! - **command**: A game action, or a hint request
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with server capabilities and assigned role
//! - **observation**: Board, score, level, power-ups and the last event
//! - **ack**: Command acknowledgment with the turn result
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `TILE_MATCH_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `TILE_MATCH_AI_PORT`: Port number (default: 7777)
//! - `TILE_MATCH_AI_MAX_PENDING`: Commands queued before `backpressure` (default: 10)
//! - `TILE_MATCH_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"board":{...},"score":0,...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567892,"action":"swap","from":{"col":2,"row":2},"direction":"down"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok","result":{"applied":true,...}}
//! ```
//!
//! # Implementation
//!
//! - [`server`] runs on **tokio** and never touches the session
//! - [`Driver`] owns the session on the game-loop thread
//! - [`Adapter`] bridges the two with bounded and unbounded channels
//! - [`JsonFileStore`] keeps the persisted score on disk

pub mod driver;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod store;

pub use tile_match_core as core;
pub use tile_match_engine as engine;
pub use tile_match_types as types;

// Re-export protocol types for convenience
pub use driver::Driver;
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
pub use store::JsonFileStore;
