use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Column decode error: {0}")]
    Decode(String),

    #[error("UUID parsing error: {0}")]
    UuidParsing(#[from] uuid::Error),
}
