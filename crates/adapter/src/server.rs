//! TCP server for the controller adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::collections::BTreeMap;
use std::hash::Hasher;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::Session;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{GameAction, Position};

/// 64-bit FNV-1a hasher for `state_hash`.
///
/// Callers feed it fixed-width little-endian bytes only, so the digest is the
/// same on every target.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }

    fn put_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    fn put_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it
fn salvage_seq(line: &str) -> Option<u64> {
    let (_, tail) = line.split_once("\"seq\"")?;
    let (_, value) = tail.split_once(':')?;
    let value = value.trim_start();
    let digits = value.bytes().take_while(u8::is_ascii_digit).count();
    value[..digits].parse().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Commands queued for the game loop before `backpressure`
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.into(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key lookup. Missing or unparsable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let Self {
            host,
            port,
            protocol_version,
            max_pending_commands,
        } = Self::default();

        Self {
            host: lookup("TILE_MATCH_AI_HOST")
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or(host),
            port: lookup("TILE_MATCH_AI_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(port),
            protocol_version,
            max_pending_commands: lookup("TILE_MATCH_AI_MAX_PENDING")
                .and_then(|n| n.trim().parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(max_pending_commands),
        }
    }

    /// `TILE_MATCH_AI_DISABLED` is `1` or `true`
    pub fn disabled_from_env() -> bool {
        Self::disabled_in(|key| std::env::var(key).ok())
    }

    pub fn disabled_in(lookup: impl Fn(&str) -> Option<String>) -> bool {
        lookup("TILE_MATCH_AI_DISABLED")
            .map(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Shared server state.
///
/// Lock order is `controller` then `clients`.
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<BTreeMap<usize, ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(BTreeMap::new()),
            controller: RwLock::new(None),
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        if let Some(client) = self.clients.read().await.get(&client_id) {
            let _ = client.tx.send(msg);
        }
    }

    async fn broadcast(&self, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        for client in clients.values().filter(|c| c.stream_observations) {
            let _ = client.tx.send(msg.clone());
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        self.clients
            .read()
            .await
            .get(&client_id)
            .is_some_and(|c| c.handshaken)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is past the client's last one
    async fn accept_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        match clients.get_mut(&client_id) {
            Some(c) if c.last_seq.is_some_and(|prev| seq <= prev) => false,
            Some(c) => {
                c.last_seq = Some(seq);
                true
            }
            None => true,
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

/// Queued for one client's writer task
#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    /// Append the message and its newline to `buf`
    fn encode(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Error(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut *buf, m)?,
        }
        buf.push(b'\n');
        Ok(())
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    if ServerConfig::disabled_from_env() {
        info!("controller adapter disabled via TILE_MATCH_AI_DISABLED");
        return Ok(());
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));

    let router = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            router.route(msg).await;
        }
    });

    let mut next_id = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        next_id += 1;
        let client_id = next_id;
        info!(client_id, %addr, "client connected");

        let conn = Connection {
            id: client_id,
            state: Arc::clone(&state),
            command_tx: command_tx.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = conn.serve(socket, addr).await {
                warn!(client_id, error = %e, "client error");
            }
            release_client(&conn.state, client_id).await;
            info!(client_id, "client disconnected");
        });
    }
}

impl ServerState {
    /// Deliver one message from the game loop
    async fn route(&self, msg: OutboundMessage) {
        let (target, out) = match msg {
            OutboundMessage::ToClientAck { client_id, ack } => (Some(client_id), ClientOutbound::Ack(ack)),
            OutboundMessage::ToClientError { client_id, err } => {
                (Some(client_id), ClientOutbound::Error(err))
            }
            OutboundMessage::ToClientObservation { client_id, obs } => {
                (Some(client_id), ClientOutbound::Observation(obs))
            }
            OutboundMessage::BroadcastObservation { obs } => (None, ClientOutbound::Observation(obs)),
        };
        match target {
            Some(client_id) => self.send_to(client_id, out).await,
            None => self.broadcast(out).await,
        }
    }
}

/// Remove a client and promote the next one if it was the controller
async fn release_client(state: &ServerState, client_id: usize) {
    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;

    clients.remove(&client_id);

    if *controller == Some(client_id) {
        // Map order: the first handshaken entry has the lowest id.
        let next_id = clients.values().find(|c| c.handshaken).map(|c| c.id);
        *controller = next_id;
        match next_id {
            Some(new_id) => info!(client_id = new_id, "controller promoted"),
            None => info!(client_id, "controller released"),
        }
    }
}

/// Whether the read loop keeps going after a message
enum Flow {
    Continue,
    Close,
}

/// Server side of one TCP connection
struct Connection {
    id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
}

impl Connection {
    async fn serve(&self, socket: TcpStream, addr: SocketAddr) -> anyhow::Result<()> {
        let (reader, mut writer) = tokio::io::split(socket);
        let mut reader = BufReader::new(reader);
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

        self.state.clients.write().await.insert(
            self.id,
            ClientHandle {
                id: self.id,
                addr,
                stream_observations: false,
                handshaken: false,
                last_seq: None,
                tx: tx.clone(),
            },
        );

        let client_id = self.id;
        let write_task = tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::with_capacity(4096);
            while let Some(msg) = rx.recv().await {
                buf.clear();
                if let Err(e) = msg.encode(&mut buf) {
                    warn!(client_id, error = %e, "dropping unencodable message");
                    continue;
                }
                if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                    break;
                }
            }
        });

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(client_id, line = trimmed, "inbound");

            if let Flow::Close = self.on_line(trimmed, &tx).await {
                break;
            }
        }

        // The writer stops once every queued line is flushed.
        self.state.clients.write().await.remove(&self.id);
        drop(tx);
        let _ = write_task.await;
        Ok(())
    }

    async fn on_line(&self, line: &str, tx: &mpsc::UnboundedSender<ClientOutbound>) -> Flow {
        let reply = |seq: u64, code: ErrorCode, message: &str| {
            let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
        };

        let msg = match parse_message(line) {
            Ok(msg) => msg,
            Err(e) => {
                let seq = salvage_seq(line).unwrap_or(0);
                reply(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
                return Flow::Continue;
            }
        };

        let (seq, needs_handshake) = match &msg {
            ParsedMessage::Hello(m) => (m.seq, false),
            ParsedMessage::Command(m) => (m.seq, true),
            ParsedMessage::Control(m) => (m.seq, true),
            ParsedMessage::Unknown(m) => (m.seq, false),
        };
        let handshaken = self.state.is_handshaken(self.id).await;
        if needs_handshake && !handshaken {
            reply(seq, ErrorCode::HandshakeRequired, "Send hello first");
            return Flow::Continue;
        }
        if handshaken && !self.state.accept_seq(self.id, seq).await {
            reply(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
            return Flow::Continue;
        }

        match msg {
            ParsedMessage::Hello(hello) => return self.on_hello(hello, tx).await,
            ParsedMessage::Command(cmd) => {
                if !self.state.is_controller(self.id).await {
                    reply(seq, ErrorCode::NotController, "Only controller may send commands");
                    return Flow::Continue;
                }
                match map_command(&cmd) {
                    Ok(command) => {
                        // The game loop acks once it has applied the command.
                        let queued = self.command_tx.try_send(InboundCommand {
                            client_id: self.id,
                            seq,
                            payload: InboundPayload::Command(command),
                        });
                        if queued.is_err() {
                            reply(seq, ErrorCode::Backpressure, "Command queue is full");
                        }
                    }
                    Err((code, message)) => reply(seq, code, &message),
                }
            }
            ParsedMessage::Control(ctrl) => {
                let mut controller = self.state.controller.write().await;
                let granted = match ctrl.action {
                    ControlAction::Claim if controller.map_or(true, |id| id == self.id) => {
                        *controller = Some(self.id);
                        info!(client_id = self.id, "controller claimed");
                        true
                    }
                    ControlAction::Claim => {
                        reply(seq, ErrorCode::ControllerActive, "Controller already assigned");
                        false
                    }
                    ControlAction::Release if *controller == Some(self.id) => {
                        *controller = None;
                        info!(client_id = self.id, "controller released");
                        true
                    }
                    ControlAction::Release => {
                        reply(seq, ErrorCode::NotController, "Only controller may release");
                        false
                    }
                };
                if granted {
                    let _ = tx.send(ClientOutbound::Ack(create_ack(seq, None)));
                }
            }
            ParsedMessage::Unknown(_) => {
                reply(seq, ErrorCode::InvalidCommand, "Unknown message type");
            }
        }
        Flow::Continue
    }

    async fn on_hello(&self, hello: HelloMessage, tx: &mpsc::UnboundedSender<ClientOutbound>) -> Flow {
        let protocol = &self.state.config.protocol_version;
        if major_version(&hello.protocol_version) != major_version(protocol) {
            let message = format!("Protocol version {} not supported", hello.protocol_version);
            let _ = tx.send(ClientOutbound::Error(create_error(
                hello.seq,
                ErrorCode::ProtocolMismatch,
                &message,
            )));
            return Flow::Close;
        }

        let wants_control = hello.requested.role != Some(RequestedRole::Observer);
        let (role, controller_id) = {
            let mut controller = self.state.controller.write().await;
            let mut clients = self.state.clients.write().await;
            if let Some(client) = clients.get_mut(&self.id) {
                client.handshaken = true;
                client.last_seq = Some(hello.seq);
                client.stream_observations = hello.requested.stream_observations;
            }
            if controller.is_none() && wants_control {
                *controller = Some(self.id);
                info!(client_id = self.id, "client is now controller");
            }
            let role = if *controller == Some(self.id) {
                AssignedRole::Controller
            } else {
                AssignedRole::Observer
            };
            (role, controller.map(|id| id as u64))
        };

        let welcome = create_welcome(hello.seq, protocol, self.id as u64, role, controller_id);
        let _ = tx.send(ClientOutbound::Welcome(welcome));

        if hello.requested.stream_observations {
            let _ = self.command_tx.try_send(InboundCommand {
                client_id: self.id,
                seq: hello.seq,
                payload: InboundPayload::SnapshotRequest,
            });
        }
        Flow::Continue
    }
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.action {
        ActionName::Swap => {
            let Some(from) = cmd.from.map(Position::from) else {
                return Err((ErrorCode::InvalidCommand, "Missing from".to_string()));
            };
            let to: Position = match (cmd.to, cmd.direction.as_deref()) {
                (Some(to), None) => to.into(),
                (None, Some(dir)) => {
                    let Some(dir) = parse_direction(dir) else {
                        return Err((ErrorCode::InvalidCommand, format!("Unknown direction: {}", dir)));
                    };
                    from.step(dir).ok_or_else(|| {
                        (ErrorCode::InvalidSwap, "swap target is off the grid".to_string())
                    })?
                }
                (Some(_), Some(_)) => {
                    return Err((
                        ErrorCode::InvalidCommand,
                        "Give either to or direction, not both".to_string(),
                    ))
                }
                (None, None) => {
                    return Err((ErrorCode::InvalidCommand, "Missing to or direction".to_string()))
                }
            };
            Ok(ClientCommand::Action(GameAction::Swap { from, to }))
        }
        ActionName::Powerup => Ok(ClientCommand::Action(GameAction::Powerup)),
        ActionName::Reset => Ok(ClientCommand::Action(GameAction::Reset)),
        ActionName::Hint => Ok(ClientCommand::Hint),
    }
}

/// Build observation message from a session
pub fn build_observation(
    session: &Session,
    seq: u64,
    last_event: Option<LastEvent>,
) -> ObservationMessage {
    let grid = session.grid();
    let state = session.state();

    let cells: Vec<Vec<u8>> = (0..grid.height())
        .map(|row| {
            (0..grid.width())
                .map(|col| {
                    grid.kind_at(Position::new(col, row))
                        .map(|k| k.0.saturating_add(1))
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    let active_kinds = session
        .palette()
        .active(state.active_tile_types())
        .iter()
        .map(|k| k.name().to_string())
        .collect();

    let mut hasher = Fnv1aHasher::new();
    hasher.put_u8(grid.width());
    hasher.put_u8(grid.height());
    for row in &cells {
        hasher.write(row);
    }
    let palette = session.palette().as_slice();
    hasher.put_u8(palette.len() as u8);
    for kind in palette {
        hasher.put_u8(kind.0);
    }
    hasher.put_u32(state.score());
    hasher.put_u32(state.level());
    hasher.put_u32(state.powerups());
    hasher.put_u8(state.active_tile_types());
    hasher.put_u8(session.is_game_over() as u8);
    hasher.put_u8(session.is_busy() as u8);
    hasher.put_u32(session.seed());
    // last_event is part of the payload too.
    match last_event {
        None => hasher.put_u8(0),
        Some(e) => {
            hasher.put_u8(1);
            hasher.write(e.action.as_str().as_bytes());
            hasher.put_u8(e.applied as u8);
            hasher.put_u32(e.cleared);
            hasher.put_u32(e.cascades);
            hasher.put_u32(e.points);
            hasher.put_u8(e.level_up as u8);
        }
    }
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: now_ms(),
        playable: !session.is_game_over() && !session.is_busy(),
        busy: session.is_busy(),
        game_over: session.is_game_over(),
        seed: session.seed(),
        board: BoardSnapshot {
            width: grid.width(),
            height: grid.height(),
            cells,
        },
        active_kinds,
        active_tile_types: state.active_tile_types(),
        score: state.score(),
        level: state.level(),
        powerups: state.powerups(),
        last_event,
        state_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionConfig;
    use crate::types::Direction;

    fn command(json: &str) -> CommandMessage {
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => c,
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_salvage_seq() {
        assert_eq!(salvage_seq(r#"{"seq": 42, "x"#), Some(42));
        assert_eq!(salvage_seq(r#"{"type":"command"}"#), None);
    }

    #[test]
    fn test_map_swap_with_direction() {
        let cmd = command(r#"{"type":"command","seq":1,"ts":1,"action":"swap","from":{"col":1,"row":1},"direction":"down"}"#);
        let from = Position::new(1, 1);
        assert_eq!(
            map_command(&cmd),
            Ok(ClientCommand::Action(GameAction::Swap {
                from,
                to: from.step(Direction::Down).unwrap(),
            }))
        );
    }

    #[test]
    fn test_map_swap_off_grid_and_missing_target() {
        let cmd = command(r#"{"type":"command","seq":1,"ts":1,"action":"swap","from":{"col":0,"row":0},"direction":"left"}"#);
        assert_eq!(map_command(&cmd).unwrap_err().0, ErrorCode::InvalidSwap);

        let cmd = command(r#"{"type":"command","seq":1,"ts":1,"action":"swap","from":{"col":0,"row":0}}"#);
        assert_eq!(map_command(&cmd).unwrap_err().0, ErrorCode::InvalidCommand);
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(|key| match key {
            "TILE_MATCH_AI_PORT" => Some("9100".into()),
            "TILE_MATCH_AI_MAX_PENDING" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9100);
        assert_eq!(config.max_pending_commands, 10);
        assert_eq!(config.socket_addr().unwrap().port(), 9100);

        assert!(ServerConfig::disabled_in(|_| Some("TRUE".into())));
        assert!(!ServerConfig::disabled_in(|_| Some("0".into())));
        assert!(!ServerConfig::disabled_in(|_| None));
    }

    #[test]
    fn test_observation_encodes_board() {
        let session = Session::new(SessionConfig::default().with_seed(3));
        let obs = build_observation(&session, 1, None);
        assert_eq!(obs.board.cells.len(), 6);
        assert!(obs.board.cells.iter().flatten().all(|&v| v >= 1));
        assert_eq!(obs.active_kinds.len(), 4);
        assert_eq!(obs.powerups, 3);
    }

    #[test]
    fn test_fnv1a_known_digests() {
        let mut h = Fnv1aHasher::new();
        assert_eq!(h.finish(), 0xcbf29ce484222325);
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);

        let mut le = Fnv1aHasher::new();
        le.put_u32(0x0403_0201);
        let mut bytes = Fnv1aHasher::new();
        bytes.write(&[1, 2, 3, 4]);
        assert_eq!(le.finish(), bytes.finish());
    }

    #[test]
    fn test_state_hash_changes_with_state() {
        let mut session = Session::new(SessionConfig::default().with_seed(3));
        let obs1 = build_observation(&session, 1, None);
        let obs2 = build_observation(&session, 2, None);
        assert_eq!(obs1.state_hash, obs2.state_hash);

        session.activate_powerup();
        let obs3 = build_observation(&session, 3, None);
        assert_ne!(obs1.state_hash, obs3.state_hash);
    }
}
