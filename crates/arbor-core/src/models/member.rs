//! Member domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A leaf entity (e.g. a supplier record) attached to one node.
///
/// Members are not part of the hierarchy. The directory reads them for
/// statistics and for the delete guard only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub node_id: Uuid,
    pub name: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub tenant_id: Uuid,
    pub node_id: Uuid,
    pub name: String,
    pub disabled: bool,
}

/// Direct member counts for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub total: u64,
    pub disabled: u64,
}

impl MemberCounts {
    pub fn active(&self) -> u64 {
        self.total.saturating_sub(self.disabled)
    }
}
