//! Directory service — tenant-scoped hierarchy operations.

use std::collections::HashSet;

use arbor_core::error::{ArborResult, ConflictReason};
use arbor_core::models::context::TenantContext;
use arbor_core::models::hierarchy::{Hierarchy, NodeStats, NodeTree, NodeWithMembers};
use arbor_core::models::node::{CreateNode, NewNode, Node, NodeChanges, ParentRef, UpdateNode};
use arbor_core::repository::{MemberRepository, NodeRepository, PaginatedResult, Pagination};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::DirectoryConfig;
use crate::locks::TenantLocks;
use crate::tree;

/// Hierarchical directory service.
///
/// Generic over repository implementations so that the directory has no
/// dependency on the database crate. Every call takes the caller's
/// [`TenantContext`] and scopes each store access by its `tenant_id`.
pub struct DirectoryService<N: NodeRepository, M: MemberRepository> {
    nodes: N,
    members: M,
    config: DirectoryConfig,
    locks: TenantLocks,
}

impl<N: NodeRepository, M: MemberRepository> DirectoryService<N, M> {
    pub fn new(nodes: N, members: M, config: DirectoryConfig) -> Self {
        Self {
            nodes,
            members,
            config,
            locks: TenantLocks::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations (serialized per tenant)
    // -----------------------------------------------------------------------

    /// Create a node, promoting its parent to a group when one is given.
    #[instrument(skip(self, input), fields(tenant_id = %ctx.tenant_id, name = %input.name))]
    pub async fn create(&self, ctx: &TenantContext, input: CreateNode) -> ArborResult<Node> {
        let _guard = self.locks.acquire(ctx.tenant_id).await;

        self.ensure_name_free(ctx.tenant_id, &input.name, None)
            .await?;
        if let Some(parent_id) = input.parent_id {
            // A brand-new id cannot be anyone's ancestor; existence is enough.
            self.nodes.get_by_id(ctx.tenant_id, parent_id).await?;
        }

        let node = self
            .nodes
            .create(NewNode {
                tenant_id: ctx.tenant_id,
                name: input.name,
                description: input.description,
                parent_id: input.parent_id,
                is_group: input.is_group,
                actor_id: ctx.actor_id,
            })
            .await?;

        info!(node_id = %node.id, parent_id = ?node.parent_id, "Node created");
        Ok(node)
    }

    /// Apply a patch: rename, reparent, describe, or toggle `disabled`.
    #[instrument(skip(self, patch), fields(tenant_id = %ctx.tenant_id, node_id = %id))]
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        patch: UpdateNode,
    ) -> ArborResult<Node> {
        let _guard = self.locks.acquire(ctx.tenant_id).await;
        self.apply_update(ctx, id, patch).await
    }

    /// Reparent a node. `ParentRef::Root` detaches it and is always legal.
    #[instrument(skip(self), fields(tenant_id = %ctx.tenant_id, node_id = %id))]
    pub async fn move_node(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        target: ParentRef,
    ) -> ArborResult<Node> {
        let _guard = self.locks.acquire(ctx.tenant_id).await;
        self.apply_update(
            ctx,
            id,
            UpdateNode {
                parent_id: Some(target),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a node that has neither children nor attached members.
    #[instrument(skip(self), fields(tenant_id = %ctx.tenant_id, node_id = %id))]
    pub async fn remove(&self, ctx: &TenantContext, id: Uuid) -> ArborResult<()> {
        let _guard = self.locks.acquire(ctx.tenant_id).await;

        self.nodes.get_by_id(ctx.tenant_id, id).await?;

        let children = self.nodes.count_children(ctx.tenant_id, id).await?;
        if children > 0 {
            return Err(ConflictReason::HasChildren { count: children }.into());
        }
        let members = self.members.count_by_node(ctx.tenant_id, id).await?;
        if members.total > 0 {
            return Err(ConflictReason::HasMembers {
                count: members.total,
            }
            .into());
        }

        self.nodes.delete(ctx.tenant_id, id).await?;
        info!("Node removed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_one(&self, ctx: &TenantContext, id: Uuid) -> ArborResult<NodeWithMembers> {
        let node = self.nodes.get_by_id(ctx.tenant_id, id).await?;
        let members = self.members.list_by_node(ctx.tenant_id, id).await?;
        Ok(NodeWithMembers { node, members })
    }

    pub async fn find_children(
        &self,
        ctx: &TenantContext,
        parent_id: Uuid,
    ) -> ArborResult<Vec<Node>> {
        self.nodes.get_children(ctx.tenant_id, parent_id).await
    }

    pub async fn find_all(&self, ctx: &TenantContext) -> ArborResult<Vec<Node>> {
        self.nodes.list_all(ctx.tenant_id).await
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        mut pagination: Pagination,
    ) -> ArborResult<PaginatedResult<Node>> {
        if pagination.limit == 0 {
            pagination.limit = self.config.default_page_size;
        }
        self.nodes.list(ctx.tenant_id, pagination).await
    }

    /// The tenant's whole forest from a single load.
    #[instrument(skip(self), fields(tenant_id = %ctx.tenant_id))]
    pub async fn find_tree(&self, ctx: &TenantContext) -> ArborResult<Vec<NodeTree>> {
        let nodes = self.nodes.list_all(ctx.tenant_id).await?;
        let count = nodes.len();
        let forest = tree::build_forest(nodes);
        debug!(nodes = count, roots = forest.len(), "Tree assembled");
        Ok(forest)
    }

    #[instrument(skip(self), fields(tenant_id = %ctx.tenant_id, node_id = %id))]
    pub async fn get_hierarchy(&self, ctx: &TenantContext, id: Uuid) -> ArborResult<Hierarchy> {
        let node = self.nodes.get_by_id(ctx.tenant_id, id).await?;
        let ancestors = self.ancestors(ctx.tenant_id, &node).await?;
        let descendants = self.descendants(ctx.tenant_id, &node).await?;
        Ok(Hierarchy {
            node,
            ancestors,
            descendants,
        })
    }

    /// Counts cover members attached directly to `id`; members of
    /// descendant nodes are not included.
    pub async fn get_stats(&self, ctx: &TenantContext, id: Uuid) -> ArborResult<NodeStats> {
        self.nodes.get_by_id(ctx.tenant_id, id).await?;
        let members = self.members.count_by_node(ctx.tenant_id, id).await?;
        let child_group_count = self.nodes.count_children(ctx.tenant_id, id).await?;
        Ok(NodeStats {
            total_members: members.total,
            active_members: members.active(),
            disabled_members: members.disabled,
            child_group_count,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Caller must hold the tenant lock.
    async fn apply_update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        patch: UpdateNode,
    ) -> ArborResult<Node> {
        let current = self.nodes.get_by_id(ctx.tenant_id, id).await?;

        if let Some(name) = patch.name.as_deref() {
            if name != current.name {
                self.ensure_name_free(ctx.tenant_id, name, Some(id)).await?;
            }
        }
        if let Some(ParentRef::Node(parent_id)) = patch.parent_id {
            self.ensure_reparent_allowed(ctx.tenant_id, id, parent_id)
                .await?;
        }

        let node = self
            .nodes
            .update(
                ctx.tenant_id,
                id,
                NodeChanges {
                    name: patch.name,
                    parent_id: patch.parent_id.map(ParentRef::node_id),
                    description: patch.description,
                    disabled: patch.disabled,
                    actor_id: ctx.actor_id,
                },
            )
            .await?;

        info!(parent_id = ?node.parent_id, "Node updated");
        Ok(node)
    }

    async fn ensure_name_free(
        &self,
        tenant_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> ArborResult<()> {
        match self.nodes.find_by_name(tenant_id, name).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(ConflictReason::DuplicateName { name: name.into() }.into())
            }
            _ => Ok(()),
        }
    }

    async fn ensure_reparent_allowed(
        &self,
        tenant_id: Uuid,
        moving_id: Uuid,
        parent_id: Uuid,
    ) -> ArborResult<()> {
        if parent_id == moving_id {
            return Err(ConflictReason::SelfParent.into());
        }
        let parent = self.nodes.get_by_id(tenant_id, parent_id).await?;
        if self.is_ancestor_or_self(tenant_id, moving_id, &parent).await? {
            warn!(parent_id = %parent_id, "Rejected move that would create a cycle");
            return Err(ConflictReason::CircularReference.into());
        }
        Ok(())
    }

    /// Walk up from `start`, one tenant-scoped lookup per step, and report
    /// whether `target` is on the chain. A chain that revisits a node is
    /// already corrupt and counts as cyclic.
    async fn is_ancestor_or_self(
        &self,
        tenant_id: Uuid,
        target: Uuid,
        start: &Node,
    ) -> ArborResult<bool> {
        if start.id == target {
            return Ok(true);
        }
        let mut visited = HashSet::from([start.id]);
        let mut current = start.parent_id;

        while let Some(id) = current {
            if id == target {
                return Ok(true);
            }
            if !visited.insert(id) {
                error!(
                    tenant_id = %tenant_id,
                    node_id = %id,
                    "Stored parent chain loops"
                );
                return Ok(true);
            }
            current = match self.nodes.find_by_id(tenant_id, id).await? {
                Some(node) => node.parent_id,
                None => None,
            };
        }
        Ok(false)
    }

    /// Root first, immediate parent last. A missing parent ends the walk.
    async fn ancestors(&self, tenant_id: Uuid, node: &Node) -> ArborResult<Vec<Node>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([node.id]);
        let mut current = node.parent_id;

        while let Some(id) = current {
            if !visited.insert(id) {
                warn!(node_id = %id, "Ancestor walk hit a parent loop");
                break;
            }
            match self.nodes.find_by_id(tenant_id, id).await? {
                Some(parent) => {
                    current = parent.parent_id;
                    chain.push(parent);
                }
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }

    /// Pre-order: each child, then that child's own subtree, siblings by
    /// name. One scoped children query per visited node.
    async fn descendants(&self, tenant_id: Uuid, node: &Node) -> ArborResult<Vec<Node>> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([node.id]);
        let mut stack: Vec<Node> = self
            .nodes
            .get_children(tenant_id, node.id)
            .await?
            .into_iter()
            .rev()
            .collect();

        while let Some(child) = stack.pop() {
            if !visited.insert(child.id) {
                warn!(node_id = %child.id, "Descendant walk revisited a node");
                continue;
            }
            let grandchildren = self.nodes.get_children(tenant_id, child.id).await?;
            stack.extend(grandchildren.into_iter().rev());
            out.push(child);
        }

        Ok(out)
    }
}
