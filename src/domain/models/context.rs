//! Mission context passed to worker capabilities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only context shared with every task execution in a mission.
///
/// Worker capabilities must be stateless with respect to the
/// orchestrator; this is the only mission state they see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionContext {
    /// Mission identity.
    pub mission_id: Uuid,
    /// Summary of what the mission is trying to achieve.
    pub mission_overview: String,
}

impl MissionContext {
    pub fn new(mission_id: Uuid, mission_overview: impl Into<String>) -> Self {
        Self {
            mission_id,
            mission_overview: mission_overview.into(),
        }
    }
}
