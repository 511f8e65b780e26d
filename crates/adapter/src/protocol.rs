//! Wire protocol for the controller adapter
//!
//! One JSON object per line. Every message carries `type`, `seq` and `ts`
//! (milliseconds since the Unix epoch).
//!
//! Inbound: `hello`, `command`, `control`.
//! Outbound: `welcome`, `observation`, `ack`, `error`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Position, Rejection};

/// Protocol version spoken by this adapter
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// `game_id` reported in every welcome
pub const GAME_ID: &str = "tile-match";

/// Single-variant enums pinning the `type` field (or another constant
/// string) of a message.
macro_rules! wire_tag {
    ($($name:ident :: $variant:ident = $wire:tt),+ $(,)?) => {$(
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = $wire)]
            $variant,
        }
    )+};
}

wire_tag! {
    HelloType::Hello = "hello",
    CommandType::Command = "command",
    ControlType::Control = "control",
    WelcomeType::Welcome = "welcome",
    ObservationType::Observation = "observation",
    AckType::Ack = "ack",
    ErrorType::Error = "error",
    AckStatus::Ok = "ok",
    CapabilityFormat::Json = "json",
}

/// Enums whose wire names are matched case-insensitively on input and
/// written lowercase on output.
macro_rules! wire_names {
    ($(#[$meta:meta])* $name:ident ($what:literal) { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn from_wire(s: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_wire(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!(concat!("unknown ", $what, " `{}`"), s))
                })
            }
        }
    };
}

wire_names! {
    /// Role asked for in `hello`
    RequestedRole ("role") {
        Auto => "auto",
        Controller => "controller",
        Observer => "observer",
    }
}

wire_names! {
    /// Command verbs, in the order the welcome advertises them
    ActionName ("action") {
        Swap => "swap",
        Powerup => "powerup",
        Reset => "reset",
        Hint => "hint",
    }
}

wire_names! {
    ControlAction ("control action") {
        Claim => "claim",
        Release => "release",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Parse a swap direction name
pub fn parse_direction(s: &str) -> Option<Direction> {
    Direction::from_str(s)
}

/// Grid coordinate on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WirePosition {
    pub col: u8,
    pub row: u8,
}

impl From<WirePosition> for Position {
    fn from(p: WirePosition) -> Self {
        Position::new(p.col, p.row)
    }
}

impl From<Position> for WirePosition {
    fn from(p: Position) -> Self {
        Self {
            col: p.col,
            row: p.row,
        }
    }
}

// ---- inbound ----

/// First message on a connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    pub stream_observations: bool,
    /// Absent means `auto`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

/// Game command, accepted from the controller only.
///
/// A swap names `from` plus either `to` or a `direction`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type", default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub action: ActionName,
    #[serde(default)]
    pub from: Option<WirePosition>,
    #[serde(default)]
    pub to: Option<WirePosition>,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type", default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

// ---- outbound ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
    InvalidSwap,
    NoMatch,
    EngineBusy,
    NoPowerups,
    GameOver,
    StoreUnavailable,
}

impl From<Rejection> for ErrorCode {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::InvalidSwap => Self::InvalidSwap,
            Rejection::NoMatch => Self::NoMatch,
            Rejection::EngineBusy => Self::EngineBusy,
            Rejection::NoPowerupsAvailable => Self::NoPowerups,
            Rejection::GameOver => Self::GameOver,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AssignedRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: Vec<CapabilityFormat>,
    pub actions: Vec<ActionName>,
    pub features: Vec<CapabilityFeature>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            formats: vec![CapabilityFormat::Json],
            actions: ActionName::ALL.to_vec(),
            features: CapabilityFeature::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFeature {
    Score,
    Powerups,
    Hints,
    LastEvent,
    StateHash,
}

impl CapabilityFeature {
    pub const ALL: &'static [CapabilityFeature] = &[
        CapabilityFeature::Score,
        CapabilityFeature::Powerups,
        CapabilityFeature::Hints,
        CapabilityFeature::LastEvent,
        CapabilityFeature::StateHash,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Absent for control acks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AckResult>,
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResult {
    pub applied: bool,
    /// Number of tiles cleared
    pub cleared: u32,
    /// The cleared positions, pass by pass
    #[serde(default)]
    pub cleared_positions: Vec<WirePosition>,
    pub cascades: u32,
    pub score: u32,
    pub level: u32,
    pub powerups: u32,
    pub game_over: bool,
    /// Score written by a reset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<HintPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintPayload {
    pub from: WirePosition,
    pub to: WirePosition,
    pub clears: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Full game state, pushed to streaming clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub busy: bool,
    pub game_over: bool,
    pub seed: u32,
    pub board: BoardSnapshot,
    /// Names of the kinds in play, in draw order
    pub active_kinds: Vec<String>,
    pub active_tile_types: u8,
    pub score: u32,
    pub level: u32,
    pub powerups: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Rows top first. 0 = empty, k+1 = the kind at `TILE_NAMES[k]`
    pub cells: Vec<Vec<u8>>,
}

/// Summary of the most recent board-touching command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastEvent {
    pub action: ActionName,
    pub applied: bool,
    pub cleared: u32,
    pub cascades: u32,
    pub points: u32,
    pub level_up: bool,
}

/// Observation fingerprint, written as 16 lowercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for StateHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(serde::de::Error::custom)
    }
}

// ---- parsing ----

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

/// A well-formed object whose `type` is missing or not one we accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line.
///
/// Invalid JSON, or a known `type` with a bad body, is an error. An
/// unrecognised `type` is not: it comes back as [`ParsedMessage::Unknown`]
/// so the server can answer it with the sender's seq.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(rename = "type", default)]
        msg_type: Option<String>,
        #[serde(default)]
        seq: Option<u64>,
    }

    let envelope: Envelope = serde_json::from_str(json)?;
    let parsed = match envelope.msg_type.as_deref() {
        Some("hello") => ParsedMessage::Hello(serde_json::from_str(json)?),
        Some("command") => ParsedMessage::Command(serde_json::from_str(json)?),
        Some("control") => ParsedMessage::Control(serde_json::from_str(json)?),
        _ => ParsedMessage::Unknown(UnknownMessage {
            seq: envelope.seq.unwrap_or(0),
        }),
    };
    Ok(parsed)
}

// ---- builders ----

/// Milliseconds since the Unix epoch, 0 if the clock is before it
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Hello as a client of this crate would send it: streaming, role `auto`
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: now_ms(),
        client: ClientInfo {
            name: client_name.into(),
            version: env!("CARGO_PKG_VERSION").into(),
        },
        protocol_version: protocol_version.into(),
        requested: RequestedCapabilities {
            stream_observations: true,
            role: Some(RequestedRole::Auto),
        },
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: now_ms(),
        protocol_version: protocol_version.into(),
        client_id: Some(client_id),
        role: Some(role),
        controller_id,
        game_id: GAME_ID.into(),
        capabilities: ServerCapabilities::default(),
    }
}

pub fn create_ack(seq: u64, result: Option<AckResult>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: now_ms(),
        status: AckStatus::Ok,
        result,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: now_ms(),
        code,
        message: message.into(),
    }
}
