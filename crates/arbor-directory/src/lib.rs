//! Arbor Directory — tenant-scoped hierarchical directory service:
//! creation, rename, cycle-safe reparenting, guarded deletion, tree
//! assembly, ancestor/descendant queries and member statistics.

pub mod config;
pub mod locks;
pub mod service;
pub mod tree;

pub use config::DirectoryConfig;
pub use service::DirectoryService;
