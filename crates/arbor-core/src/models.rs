//! Domain models for Arbor.
//!
//! These are the core types shared across all crates.

pub mod context;
pub mod hierarchy;
pub mod member;
pub mod node;
