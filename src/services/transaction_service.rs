use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::filters::TransactionFilter;
use crate::models::transaction::{Transaction, TransactionRequest, TransactionStatus};
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::RepositoryError;
use crate::validation::validate_receiver_fields;

/// Transaction service errors
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Malformed receiver identifiers or a lifecycle-guard rejection
    #[error("{0}")]
    Validation(String),

    #[error("Transaction {0} not found")]
    NotFound(Uuid),

    /// The record's status changed between read and write
    #[error("Transaction {0} was modified concurrently")]
    Conflict(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Trait defining transaction service operations
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Validate and persist a new transaction; status defaults to NEW
    /// when the request does not carry one
    async fn create_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<Transaction, TransactionError>;

    /// Fetch a single transaction by id, soft-deleted ones included
    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, TransactionError>;

    /// All active transactions matching the filter criteria
    async fn search_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// All active transactions, unfiltered
    async fn list_active(&self) -> Result<Vec<Transaction>, TransactionError>;

    /// Replace all mutable fields of a transaction; permitted only while
    /// its current status allows updates
    async fn update_transaction(
        &self,
        id: Uuid,
        request: TransactionRequest,
    ) -> Result<Transaction, TransactionError>;

    /// Soft-delete a transaction by flipping its status to DELETED;
    /// permitted only while its current status allows deletion
    async fn delete_transaction(&self, id: Uuid) -> Result<(), TransactionError>;
}

/// Implementation of TransactionService
pub struct TransactionServiceImpl {
    transaction_repository: Arc<dyn TransactionRepository>,
}

impl TransactionServiceImpl {
    pub fn new(transaction_repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            transaction_repository,
        }
    }

    /// Map a request onto a full entity under the given id
    fn build_transaction(id: Uuid, request: TransactionRequest) -> Transaction {
        Transaction {
            id,
            person_type: request.person_type,
            operation_date: request.operation_date,
            transaction_type: request.transaction_type,
            comment: request.comment,
            amount: request.amount,
            status: request.status.unwrap_or(TransactionStatus::New),
            sender_bank: request.sender_bank,
            account: request.account,
            receiver_bank: request.receiver_bank,
            receiver_account: request.receiver_account,
            receiver_inn: request.receiver_inn,
            category: request.category,
            receiver_phone: request.receiver_phone,
        }
    }
}

#[async_trait]
impl TransactionService for TransactionServiceImpl {
    async fn create_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        // Check receiver identifiers before anything reaches storage
        validate_receiver_fields(&request)
            .map_err(|e| TransactionError::Validation(e.to_string()))?;

        let transaction = Self::build_transaction(Uuid::new_v4(), request);

        self.transaction_repository
            .create(transaction)
            .await
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, TransactionError> {
        self.transaction_repository
            .find_by_id(id)
            .await
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?
            .ok_or(TransactionError::NotFound(id))
    }

    async fn search_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, TransactionError> {
        self.transaction_repository
            .find_all(&filter)
            .await
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))
    }

    async fn list_active(&self) -> Result<Vec<Transaction>, TransactionError> {
        self.search_transactions(TransactionFilter::default()).await
    }

    async fn update_transaction(
        &self,
        id: Uuid,
        request: TransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        // Find existing record first: an unknown id is NotFound even if
        // the body is also invalid
        let existing = self
            .transaction_repository
            .find_by_id(id)
            .await
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?
            .ok_or(TransactionError::NotFound(id))?;

        // Lifecycle guard before field validation
        if !existing.status.permits_update() {
            return Err(TransactionError::Validation(format!(
                "cannot update {} transaction",
                existing.status
            )));
        }

        validate_receiver_fields(&request)
            .map_err(|e| TransactionError::Validation(e.to_string()))?;

        let replacement = Self::build_transaction(id, request);

        // The write only lands if the status is still what we just read
        self.transaction_repository
            .update(replacement, existing.status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TransactionError::NotFound(id),
                RepositoryError::Conflict => TransactionError::Conflict(id),
                RepositoryError::DatabaseError(msg) => TransactionError::DatabaseError(msg),
            })
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), TransactionError> {
        let existing = self
            .transaction_repository
            .find_by_id(id)
            .await
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?
            .ok_or(TransactionError::NotFound(id))?;

        if !existing.status.permits_delete() {
            return Err(TransactionError::Validation(format!(
                "cannot delete {} transaction",
                existing.status
            )));
        }

        self.transaction_repository
            .mark_deleted(id, existing.status)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TransactionError::NotFound(id),
                RepositoryError::Conflict => TransactionError::Conflict(id),
                RepositoryError::DatabaseError(msg) => TransactionError::DatabaseError(msg),
            })
    }
}
