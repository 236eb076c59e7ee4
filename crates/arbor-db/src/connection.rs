//! SurrealDB connection management for the node store.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{SurrealMemberRepository, SurrealNodeRepository};
use crate::schema::run_migrations;

/// Where the node store lives and how to authenticate to it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "arbor".into(),
            database: "directory".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// An open, migrated connection to the node store.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Sign in as root, select namespace and database, then bring the
    /// schema up to date.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening node store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;
        info!("Node store ready");

        Ok(Self { db })
    }

    pub fn nodes(&self) -> SurrealNodeRepository<Client> {
        SurrealNodeRepository::new(self.db.clone())
    }

    pub fn members(&self) -> SurrealMemberRepository<Client> {
        SurrealMemberRepository::new(self.db.clone())
    }
}
