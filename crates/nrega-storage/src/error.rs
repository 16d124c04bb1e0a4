/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use nrega_storage::error::StorageError;
///
/// let err = StorageError::InvalidKey {
///     reason: "district_name is empty",
/// };
/// assert!(err.to_string().contains("district_name"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The identity triple is unusable as a key (an empty component).
    /// Upstream records missing identity fields land here, one per record.
    #[error("storage: invalid record key: {reason}")]
    InvalidKey { reason: &'static str },

    /// An upsert succeeded but the row could not be read back, which should
    /// be unreachable under normal conditions.
    #[error("storage: upsert of {entity} succeeded but the row could not be read back")]
    UpsertReadback { entity: &'static str },

    /// An underlying database error.
    #[error("storage: database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// JSON serialization failure for the raw_api_record column.
    #[error("storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
