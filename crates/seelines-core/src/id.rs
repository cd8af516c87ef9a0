use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a queued production project (structure or hull).
    pub struct ProjectId;
}

/// Identifies a unit. Assigned monotonically by the world and never reused.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

/// Identifies an island. Stable for the lifetime of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IslandId(pub u32);

/// Identifies a convoy route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConvoyId(pub u32);

/// Identifies a storm front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StormId(pub u32);

/// Opaque order identifier chosen by the commanding collaborator.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ids_order_by_value() {
        let mut ids = vec![UnitId(3), UnitId(1), UnitId(2)];
        ids.sort();
        assert_eq!(ids, vec![UnitId(1), UnitId(2), UnitId(3)]);
    }

    #[test]
    fn unit_id_serializes_as_bare_number() {
        let json = serde_json::to_string(&UnitId(7)).unwrap();
        assert_eq!(json, "7");
        let back: UnitId = serde_json::from_str("7").unwrap();
        assert_eq!(back, UnitId(7));
    }

    #[test]
    fn order_id_from_str() {
        let id = OrderId::from("o-1");
        assert_eq!(id.to_string(), "o-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"o-1\"");
    }

    #[test]
    fn project_ids_are_distinct() {
        let mut sm = slotmap::SlotMap::<ProjectId, ()>::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        assert_ne!(a, b);
    }
}
