//! Wire contract between the authoritative host and its clients.
//!
//! Clients send [`ClientMessage`]s carrying order entries; the host answers
//! with [`ServerMessage`]s carrying full unit snapshots. Field names follow
//! the JSON shape (`unitIds`, `type`, `target.kind`, `metadata`). The same
//! types encode as JSON for debugging and as `bitcode` for transport frames.
//!
//! The physical transport (handshake, framing, keepalive) is out of scope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::HullType;
use crate::fixed::Ticks;
use crate::geometry::Vec2;
use crate::id::UnitId;
use crate::order::Order;
use crate::unit::{Faction, Unit};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One order for a group of units, applied as a single enqueue call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct CommandEntry {
    #[serde(rename = "unitIds")]
    pub unit_ids: Vec<UnitId>,
    pub order: Order,
    #[serde(default)]
    pub append: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Command { payload: Vec<CommandEntry> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct UnitSnapshot {
    pub id: UnitId,
    #[serde(rename = "type")]
    pub hull: HullType,
    pub owner: Faction,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Queued orders with their plans, head first.
    pub orders: Vec<Order>,
}

impl From<&Unit> for UnitSnapshot {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            hull: unit.hull,
            owner: unit.owner,
            position: unit.position,
            velocity: unit.velocity,
            orders: unit.orders.iter().map(|queued| queued.order.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct SnapshotMessage {
    pub tick: Ticks,
    pub units: Vec<UnitSnapshot>,
}

impl SnapshotMessage {
    pub fn capture<'a>(tick: Ticks, units: impl IntoIterator<Item = &'a Unit>) -> Self {
        Self {
            tick,
            units: units.into_iter().map(UnitSnapshot::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome {
        #[serde(rename = "clientId")]
        client_id: u32,
        snapshot: SnapshotMessage,
    },
    Snapshot { snapshot: SnapshotMessage },
}

impl ServerMessage {
    pub fn snapshot(&self) -> &SnapshotMessage {
        match self {
            ServerMessage::Welcome { snapshot, .. } | ServerMessage::Snapshot { snapshot } => {
                snapshot
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode decoding failed: {0}")]
    Binary(String),
}

pub fn encode_json<T: Serialize>(message: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_binary<T: bitcode::Encode + ?Sized>(message: &T) -> Vec<u8> {
    bitcode::encode(message)
}

pub fn decode_binary<T: bitcode::DecodeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bitcode::decode(bytes).map_err(|e| CodecError::Binary(e.to_string()))
}
