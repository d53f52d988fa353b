use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Save slot '{id}' not found")]
    NotFound { id: String },

    #[error("Corrupt save data: {reason}")]
    CorruptData { reason: String },

    #[error("No migration path from format version {from} to {to}")]
    Migration { from: String, to: String },

    #[error("Storage quota exceeded writing '{key}': need {needed} bytes, {available} available")]
    StorageQuota {
        key:       String,
        needed:    usize,
        available: usize,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptData { reason: reason.into() }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
