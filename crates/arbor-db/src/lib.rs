//! Arbor Database — SurrealDB connection management and the node store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Tenant-scoped implementations of the `arbor-core` repository traits
//!   ([`repository::SurrealNodeRepository`], [`repository::SurrealMemberRepository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
