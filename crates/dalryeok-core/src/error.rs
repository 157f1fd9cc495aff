use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    #[error("Not an ISO date: {0:?}")]
    NotIsoDate(String),

    #[error("Not a canonical YYYY-MM-DD key: {0:?}")]
    NotCanonical(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title too long: {0} characters (max 200)")]
    TitleTooLong(usize),

    #[error("Body too long: {0} characters (max 5000)")]
    BodyTooLong(usize),

    #[error("Invalid date key: {0}")]
    InvalidDateKey(#[from] DateKeyError),

    #[error("Organization id is required")]
    EmptyOrgId,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid draft: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),
}
