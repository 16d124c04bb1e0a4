//! Shared domain types for the MGNREGA district report service.
//!
//! Kept dependency-light so both the upstream client and the storage layer
//! can depend on it without pulling in HTTP or database stacks.

pub mod fiscal;
pub mod types;
