//! SurrealDB implementation of [`MemberRepository`].

use arbor_core::error::ArborResult;
use arbor_core::models::member::{CreateMember, Member, MemberCounts};
use arbor_core::repository::MemberRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_count, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MemberRow {
    tenant_id: String,
    node_id: String,
    name: String,
    disabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self, id: Uuid) -> Result<Member, DbError> {
        Ok(Member {
            id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            node_id: parse_uuid(&self.node_id, "node")?,
            name: self.name,
            disabled: self.disabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct MemberRowWithId {
    record_id: String,
    tenant_id: String,
    node_id: String,
    name: String,
    disabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRowWithId {
    fn try_into_member(self) -> Result<Member, DbError> {
        let id = parse_uuid(&self.record_id, "member")?;
        MemberRow {
            tenant_id: self.tenant_id,
            node_id: self.node_id,
            name: self.name,
            disabled: self.disabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_member(id)
    }
}

fn missing(id: String) -> DbError {
    DbError::NotFound {
        entity: "member".into(),
        id,
    }
}

/// SurrealDB implementation of the Member repository.
#[derive(Clone)]
pub struct SurrealMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberRepository for SurrealMemberRepository<C> {
    async fn attach(&self, input: CreateMember) -> ArborResult<Member> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let tenant_id_str = input.tenant_id.to_string();
        let node_id_str = input.node_id.to_string();

        // The node must belong to the member's tenant.
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM node \
                 WHERE id = type::record('node', $node_id) \
                 AND tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("node_id", node_id_str.clone()))
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let node_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if first_count(&node_count) == 0 {
            return Err(DbError::NotFound {
                entity: "node".into(),
                id: node_id_str,
            }
            .into());
        }

        let result = self
            .db
            .query(
                "CREATE type::record('member', $id) SET \
                 tenant_id = $tenant_id, node_id = $node_id, \
                 name = $name, disabled = $disabled",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("node_id", node_id_str))
            .bind(("name", input.name))
            .bind(("disabled", input.disabled))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, None))?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| missing(id_str))?;
        Ok(row.into_member(id)?)
    }

    async fn detach(&self, tenant_id: Uuid, id: Uuid) -> ArborResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('member', $id) \
                 WHERE tenant_id = $tenant_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(missing(id_str).into());
        }
        Ok(())
    }

    async fn set_disabled(&self, tenant_id: Uuid, id: Uuid, disabled: bool) -> ArborResult<Member> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('member', $id) SET \
                 disabled = $disabled, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("disabled", disabled))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| missing(id_str))?;
        Ok(row.into_member(id)?)
    }

    async fn list_by_node(&self, tenant_id: Uuid, node_id: Uuid) -> ArborResult<Vec<Member>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM member \
                 WHERE tenant_id = $tenant_id AND node_id = $node_id \
                 ORDER BY name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("node_id", node_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(MemberRowWithId::try_into_member)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn count_by_node(&self, tenant_id: Uuid, node_id: Uuid) -> ArborResult<MemberCounts> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM member \
                 WHERE tenant_id = $tenant_id AND node_id = $node_id \
                 GROUP ALL; \
                 SELECT count() AS total FROM member \
                 WHERE tenant_id = $tenant_id AND node_id = $node_id \
                 AND disabled = true GROUP ALL;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("node_id", node_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let total: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let disabled: Vec<CountRow> = result.take(1).map_err(DbError::from)?;

        Ok(MemberCounts {
            total: first_count(&total),
            disabled: first_count(&disabled),
        })
    }
}
