//! Arbor Core — domain models, error taxonomy and repository traits
//! for the tenant-scoped hierarchical directory.

pub mod error;
pub mod models;
pub mod repository;
