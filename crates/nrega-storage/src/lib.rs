//! Persistence layer for cached MGNREGA district reports.
//!
//! One SQLite database accessed through SeaORM, with migrations run on
//! connect. The uniqueness invariant (one row per state, district, and
//! fiscal year) lives in the schema as a composite primary key; the store's
//! upsert rides on `INSERT ... ON CONFLICT DO UPDATE`, so concurrent writers
//! for the same triple serialize to a single surviving row.

pub mod entities;
pub mod error;
pub mod store;


pub use error::{Result, StorageError};
pub use store::report::ReportRow;
pub use store::ReportStore;
