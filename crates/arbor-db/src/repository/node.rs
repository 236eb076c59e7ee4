//! SurrealDB implementation of [`NodeRepository`].

use arbor_core::error::ArborResult;
use arbor_core::models::node::{NewNode, Node, NodeChanges};
use arbor_core::repository::{NodeRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_count, parse_uuid};
use crate::error::DbError;

const ENTITY: &str = "node";

/// Appended inside a transaction whenever a statement gives a node a
/// parent. Scoped by tenant like every other write.
const PROMOTE_PARENT: &str = " UPDATE type::record('node', $parent_id) SET \
     is_group = true, updated_by = $actor, updated_at = time::now() \
     WHERE tenant_id = $tenant_id;";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct NodeRow {
    tenant_id: String,
    name: String,
    description: String,
    parent_id: Option<String>,
    is_group: bool,
    disabled: bool,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NodeRow {
    fn into_node(self, id: Uuid) -> Result<Node, DbError> {
        Ok(Node {
            id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            description: self.description,
            parent_id: self
                .parent_id
                .as_deref()
                .map(|p| parse_uuid(p, "parent"))
                .transpose()?,
            is_group: self.is_group,
            disabled: self.disabled,
            created_by: parse_uuid(&self.created_by, "creator")?,
            updated_by: parse_uuid(&self.updated_by, "modifier")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct NodeRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    description: String,
    parent_id: Option<String>,
    is_group: bool,
    disabled: bool,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NodeRowWithId {
    fn try_into_node(self) -> Result<Node, DbError> {
        let id = parse_uuid(&self.record_id, "node")?;
        NodeRow {
            tenant_id: self.tenant_id,
            name: self.name,
            description: self.description,
            parent_id: self.parent_id,
            is_group: self.is_group,
            disabled: self.disabled,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_node(id)
    }
}

fn rows_into_nodes(rows: Vec<NodeRowWithId>) -> Result<Vec<Node>, DbError> {
    rows.into_iter().map(NodeRowWithId::try_into_node).collect()
}

/// SurrealDB implementation of the Node repository.
#[derive(Clone)]
pub struct SurrealNodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NodeRepository for SurrealNodeRepository<C> {
    async fn create(&self, input: NewNode) -> ArborResult<Node> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let parent_id_str = input.parent_id.map(|p| p.to_string());

        let mut query = String::from(
            "BEGIN TRANSACTION; \
             CREATE type::record('node', $id) SET \
             tenant_id = $tenant_id, name = $name, \
             description = $description, parent_id = $parent_id, \
             is_group = $is_group, \
             created_by = $actor, updated_by = $actor;",
        );
        if parent_id_str.is_some() {
            query.push_str(PROMOTE_PARENT);
        }
        query.push_str(" COMMIT TRANSACTION;");

        let name = input.name;
        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", name.clone()))
            .bind(("description", input.description))
            .bind(("parent_id", parent_id_str))
            .bind(("is_group", input.is_group))
            .bind(("actor", input.actor_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, Some(&name)))?;

        // Slot 0 is BEGIN; slot 1 is the CREATE.
        let rows: Vec<NodeRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_node(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> ArborResult<Node> {
        self.find_by_id(tenant_id, id).await?.ok_or_else(|| {
            DbError::NotFound {
                entity: ENTITY.into(),
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> ArborResult<Option<Node>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('node', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NodeRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_node(id)?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> ArborResult<Option<Node>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM node \
                 WHERE tenant_id = $tenant_id AND name = $name \
                 LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NodeRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_node()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, changes: NodeChanges) -> ArborResult<Node> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if changes.name.is_some() {
            sets.push("name = $name");
        }
        if changes.description.is_some() {
            sets.push("description = $description");
        }
        if changes.parent_id.is_some() {
            sets.push("parent_id = $parent_id");
        }
        if changes.disabled.is_some() {
            sets.push("disabled = $disabled");
        }
        sets.push("updated_by = $actor");
        sets.push("updated_at = time::now()");

        let new_parent = changes.parent_id.flatten();
        let mut query = format!(
            "BEGIN TRANSACTION; \
             UPDATE type::record('node', $id) SET {} \
             WHERE tenant_id = $tenant_id;",
            sets.join(", ")
        );
        if new_parent.is_some() {
            query.push_str(PROMOTE_PARENT);
        }
        query.push_str(" COMMIT TRANSACTION;");

        let new_name = changes.name.clone();
        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("actor", changes.actor_id.to_string()));

        if let Some(name) = changes.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = changes.description {
            builder = builder.bind(("description", description));
        }
        if let Some(parent) = changes.parent_id {
            builder = builder.bind(("parent_id", parent.map(|p| p.to_string())));
        }
        if let Some(disabled) = changes.disabled {
            builder = builder.bind(("disabled", disabled));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, new_name.as_deref()))?;

        // Slot 0 is BEGIN; slot 1 is the UPDATE.
        let rows: Vec<NodeRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_node(id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> ArborResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "DELETE type::record('node', $id) \
                 WHERE tenant_id = $tenant_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, None))?;

        let rows: Vec<NodeRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: ENTITY.into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list_all(&self, tenant_id: Uuid) -> ArborResult<Vec<Node>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM node \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NodeRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_nodes(rows)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> ArborResult<PaginatedResult<Node>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM node \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = first_count(&count_rows);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM node \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NodeRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: rows_into_nodes(rows)?,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn get_children(&self, tenant_id: Uuid, parent_id: Uuid) -> ArborResult<Vec<Node>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM node \
                 WHERE tenant_id = $tenant_id AND parent_id = $parent_id \
                 ORDER BY name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("parent_id", parent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NodeRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_into_nodes(rows)?)
    }

    async fn count_children(&self, tenant_id: Uuid, parent_id: Uuid) -> ArborResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM node \
                 WHERE tenant_id = $tenant_id AND parent_id = $parent_id \
                 GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("parent_id", parent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(&rows))
    }
}
