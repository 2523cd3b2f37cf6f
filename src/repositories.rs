pub mod category_repository;
pub mod transaction_repository;

pub use category_repository::{
    CategoryRepository, InMemoryCategoryRepository, PostgresCategoryRepository,
};
pub use transaction_repository::{
    InMemoryTransactionRepository, PostgresTransactionRepository, TransactionRepository,
};

/// Repository errors for store operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Resource not found")]
    NotFound,

    /// The record's status changed between the caller's read and this write
    #[error("Record was modified concurrently")]
    Conflict,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
