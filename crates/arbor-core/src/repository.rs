//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and tenant-scoped: every method
//! takes the owning `tenant_id` first, and implementations must apply it
//! as a predicate on every read and write. A lookup by id alone is a bug.

use uuid::Uuid;

use crate::error::ArborResult;
use crate::models::member::{CreateMember, Member, MemberCounts};
use crate::models::node::{NewNode, Node, NodeChanges};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Nodes (tenant-scoped, hierarchical)
// ---------------------------------------------------------------------------

pub trait NodeRepository: Send + Sync {
    /// Insert a node. When `parent_id` is set, the parent is promoted to
    /// a group in the same transaction.
    fn create(&self, input: NewNode) -> impl Future<Output = ArborResult<Node>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = ArborResult<Node>> + Send;

    /// Like [`get_by_id`](Self::get_by_id) but a missing node is `Ok(None)`.
    fn find_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = ArborResult<Option<Node>>> + Send;

    fn find_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> impl Future<Output = ArborResult<Option<Node>>> + Send;

    /// Apply changes. When `parent_id` moves to `Some(Some(p))`, `p` is
    /// promoted to a group in the same transaction.
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        changes: NodeChanges,
    ) -> impl Future<Output = ArborResult<Node>> + Send;

    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = ArborResult<()>> + Send;

    /// All nodes of the tenant, ordered by name.
    fn list_all(&self, tenant_id: Uuid) -> impl Future<Output = ArborResult<Vec<Node>>> + Send;

    /// One page of the tenant's nodes, ordered by name.
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = ArborResult<PaginatedResult<Node>>> + Send;

    /// Direct children of a node, ordered by name.
    fn get_children(
        &self,
        tenant_id: Uuid,
        parent_id: Uuid,
    ) -> impl Future<Output = ArborResult<Vec<Node>>> + Send;

    fn count_children(
        &self,
        tenant_id: Uuid,
        parent_id: Uuid,
    ) -> impl Future<Output = ArborResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Members (tenant-scoped, attached to one node)
// ---------------------------------------------------------------------------

pub trait MemberRepository: Send + Sync {
    /// Attach a new member. Fails with `NotFound` if the node does not
    /// exist in the member's tenant.
    fn attach(&self, input: CreateMember) -> impl Future<Output = ArborResult<Member>> + Send;

    fn detach(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = ArborResult<()>> + Send;

    fn set_disabled(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        disabled: bool,
    ) -> impl Future<Output = ArborResult<Member>> + Send;

    /// Members attached directly to a node, ordered by name.
    fn list_by_node(
        &self,
        tenant_id: Uuid,
        node_id: Uuid,
    ) -> impl Future<Output = ArborResult<Vec<Member>>> + Send;

    fn count_by_node(
        &self,
        tenant_id: Uuid,
        node_id: Uuid,
    ) -> impl Future<Output = ArborResult<MemberCounts>> + Send;
}
