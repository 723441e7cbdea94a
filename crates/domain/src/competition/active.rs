//! The single competition currently eligible for gameplay.

use serde::{Deserialize, Serialize};

use super::{Competition, CompetitionV2};

/// Payload of the active competition in its original generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompetitionPayload {
    /// Competitions 2.0 payload.
    V2(Box<CompetitionV2>),
    /// Booking competition payload.
    V1(Competition),
}

/// The resolved active competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCompetition {
    /// Competition identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Whether the competition comes from the v2 API.
    pub is_v2: bool,
    /// Full payload.
    pub data: CompetitionPayload,
}

impl ActiveCompetition {
    /// Wraps a v1 competition.
    #[must_use]
    pub fn from_v1(competition: Competition) -> Self {
        Self {
            id: competition.id,
            name: competition.name.clone(),
            is_v2: false,
            data: CompetitionPayload::V1(competition),
        }
    }

    /// Wraps a v2 competition.
    #[must_use]
    pub fn from_v2(competition: CompetitionV2) -> Self {
        Self {
            id: competition.id,
            name: competition.name.clone(),
            is_v2: true,
            data: CompetitionPayload::V2(Box::new(competition)),
        }
    }

    /// Returns the payload in the v1 shape, converting v2 payloads.
    #[must_use]
    pub fn as_v1(&self) -> Competition {
        match &self.data {
            CompetitionPayload::V1(c) => c.clone(),
            CompetitionPayload::V2(c) => Competition::from(c.as_ref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let comp: Competition =
            serde_json::from_value(json!({"id": 3, "name": "Q3", "is_active": true})).unwrap();
        let active = ActiveCompetition::from_v1(comp);
        let value = serde_json::to_value(&active).unwrap();

        assert_eq!(value["isV2"], json!(false));
        assert_eq!(value["data"]["id"], json!(3));
    }

    #[test]
    fn test_as_v1_converts_v2() {
        let comp: CompetitionV2 =
            serde_json::from_value(json!({"id": 9, "name": "Nova", "state": "active"})).unwrap();
        let active = ActiveCompetition::from_v2(comp);
        assert!(active.is_v2);
        assert!(active.as_v1().is_active);
    }
}
