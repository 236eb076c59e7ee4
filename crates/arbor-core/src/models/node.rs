//! Node domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a tenant's hierarchical directory (e.g. a supplier group).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique within the tenant, case-sensitive.
    pub name: String,
    pub description: String,
    /// `None` for a root node.
    pub parent_id: Option<Uuid>,
    /// Whether the node may have children. Forced to `true` once the
    /// node becomes a parent.
    pub is_group: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
}

/// Where a node should hang in the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Root,
    Node(Uuid),
}

impl ParentRef {
    pub fn node_id(self) -> Option<Uuid> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(id),
        }
    }
}

/// Caller input for creating a node. The tenant and actor come from
/// the [`TenantContext`](crate::models::context::TenantContext), never
/// from here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateNode {
    pub name: String,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    /// Create the node as a group before it has any children.
    #[serde(default)]
    pub is_group: bool,
}

/// Caller patch for an existing node. `None` fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateNode {
    pub name: Option<String>,
    /// `Some(ParentRef::Root)` detaches, `None` keeps the current parent.
    pub parent_id: Option<ParentRef>,
    pub description: Option<String>,
    pub disabled: Option<bool>,
}

/// A fully stamped node ready for insertion.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    pub is_group: bool,
    pub actor_id: Uuid,
}

/// Store-level changes for an existing node.
#[derive(Debug, Clone)]
pub struct NodeChanges {
    pub name: Option<String>,
    /// `Some(Some(id))` = reparent, `Some(None)` = detach, `None` = no change.
    pub parent_id: Option<Option<Uuid>>,
    pub description: Option<String>,
    pub disabled: Option<bool>,
    pub actor_id: Uuid,
}
