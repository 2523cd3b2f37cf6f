use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::filters::TransactionFilter;
use crate::models::transaction::{PersonType, Transaction, TransactionStatus, TransactionType};

/// Trait defining transaction store operations
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persist a new transaction
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError>;

    /// Find a transaction by id, soft-deleted records included
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError>;

    /// Replace all mutable fields, but only while the stored status still
    /// equals `expected_status` (compare-and-swap on the status column)
    async fn update(
        &self,
        transaction: Transaction,
        expected_status: TransactionStatus,
    ) -> Result<Transaction, RepositoryError>;

    /// Flip the status to DELETED, but only while the stored status still
    /// equals `expected_status`
    async fn mark_deleted(
        &self,
        id: Uuid,
        expected_status: TransactionStatus,
    ) -> Result<(), RepositoryError>;

    /// All non-deleted transactions matching the filter, ordered by
    /// operation date ascending
    async fn find_all(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError>;
}

const TRANSACTION_COLUMNS: &str = "id, person_type, operation_date, transaction_type, comment, \
     amount, status, sender_bank, account, receiver_bank, receiver_account, receiver_inn, \
     category, receiver_phone";

/// Raw database row; enum columns are stored as TEXT and parsed on the
/// way out
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    person_type: String,
    operation_date: chrono::NaiveDateTime,
    transaction_type: String,
    comment: Option<String>,
    amount: rust_decimal::Decimal,
    status: String,
    sender_bank: String,
    account: String,
    receiver_bank: String,
    receiver_account: String,
    receiver_inn: Option<String>,
    category: String,
    receiver_phone: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let person_type = PersonType::from_db_string(&row.person_type).ok_or_else(|| {
            RepositoryError::DatabaseError(format!("unknown person type '{}'", row.person_type))
        })?;
        let transaction_type =
            TransactionType::from_db_string(&row.transaction_type).ok_or_else(|| {
                RepositoryError::DatabaseError(format!(
                    "unknown transaction type '{}'",
                    row.transaction_type
                ))
            })?;
        let status = TransactionStatus::from_db_string(&row.status).ok_or_else(|| {
            RepositoryError::DatabaseError(format!("unknown status '{}'", row.status))
        })?;

        Ok(Transaction {
            id: row.id,
            person_type,
            operation_date: row.operation_date,
            transaction_type,
            comment: row.comment,
            amount: row.amount,
            status,
            sender_bank: row.sender_bank,
            account: row.account,
            receiver_bank: row.receiver_bank,
            receiver_account: row.receiver_account,
            receiver_inn: row.receiver_inn,
            category: row.category,
            receiver_phone: row.receiver_phone,
        })
    }
}

/// PostgreSQL implementation of TransactionRepository
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn row_exists(&self, id: Uuid) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        let query = format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {TRANSACTION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(transaction.id)
            .bind(transaction.person_type.as_str())
            .bind(transaction.operation_date)
            .bind(transaction.transaction_type.as_str())
            .bind(&transaction.comment)
            .bind(transaction.amount)
            .bind(transaction.status.as_str())
            .bind(&transaction.sender_bank)
            .bind(&transaction.account)
            .bind(&transaction.receiver_bank)
            .bind(&transaction.receiver_account)
            .bind(&transaction.receiver_inn)
            .bind(&transaction.category)
            .bind(&transaction.receiver_phone)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError> {
        let query = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        transaction: Transaction,
        expected_status: TransactionStatus,
    ) -> Result<Transaction, RepositoryError> {
        let query = format!(
            "UPDATE transactions \
             SET person_type = $3, operation_date = $4, transaction_type = $5, comment = $6, \
                 amount = $7, status = $8, sender_bank = $9, account = $10, receiver_bank = $11, \
                 receiver_account = $12, receiver_inn = $13, category = $14, receiver_phone = $15 \
             WHERE id = $1 AND status = $2 \
             RETURNING {TRANSACTION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(transaction.id)
            .bind(expected_status.as_str())
            .bind(transaction.person_type.as_str())
            .bind(transaction.operation_date)
            .bind(transaction.transaction_type.as_str())
            .bind(&transaction.comment)
            .bind(transaction.amount)
            .bind(transaction.status.as_str())
            .bind(&transaction.sender_bank)
            .bind(&transaction.account)
            .bind(&transaction.receiver_bank)
            .bind(&transaction.receiver_account)
            .bind(&transaction.receiver_inn)
            .bind(&transaction.category)
            .bind(&transaction.receiver_phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => row.try_into(),
            // No row updated: either the id is gone or the status moved
            // under us since the caller read it.
            None if self.row_exists(transaction.id).await? => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn mark_deleted(
        &self,
        id: Uuid,
        expected_status: TransactionStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE transactions SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected_status.as_str())
            .bind(TransactionStatus::Deleted.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            if self.row_exists(id).await? {
                return Err(RepositoryError::Conflict);
            }
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_all(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        // Build dynamic SQL from the provided criteria. Soft-deleted rows
        // are excluded unconditionally, so an explicit DELETED status
        // filter can never match anything.
        let mut query =
            format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE status <> $1");

        let mut param_count = 1;
        let mut conditions = Vec::new();

        if filter.sender_bank.is_some() {
            param_count += 1;
            conditions.push(format!("sender_bank = ${}", param_count));
        }

        if filter.receiver_bank.is_some() {
            param_count += 1;
            conditions.push(format!("receiver_bank = ${}", param_count));
        }

        if filter.category.is_some() {
            param_count += 1;
            conditions.push(format!("category = ${}", param_count));
        }

        if filter.transaction_type.is_some() {
            param_count += 1;
            conditions.push(format!("transaction_type = ${}", param_count));
        }

        if filter.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        if filter.date_from.is_some() {
            param_count += 1;
            conditions.push(format!("operation_date >= ${}", param_count));
        }

        if filter.date_to.is_some() {
            param_count += 1;
            conditions.push(format!("operation_date <= ${}", param_count));
        }

        if filter.amount_min.is_some() {
            param_count += 1;
            conditions.push(format!("amount >= ${}", param_count));
        }

        if filter.amount_max.is_some() {
            param_count += 1;
            conditions.push(format!("amount <= ${}", param_count));
        }

        if !conditions.is_empty() {
            query.push_str(" AND ");
            query.push_str(&conditions.join(" AND "));
        }

        query.push_str(" ORDER BY operation_date");

        let mut sqlx_query = sqlx::query_as::<_, TransactionRow>(&query)
            .bind(TransactionStatus::Deleted.as_str());

        // Bind parameters in the same order the conditions were added
        if let Some(sender_bank) = &filter.sender_bank {
            sqlx_query = sqlx_query.bind(sender_bank);
        }

        if let Some(receiver_bank) = &filter.receiver_bank {
            sqlx_query = sqlx_query.bind(receiver_bank);
        }

        if let Some(category) = &filter.category {
            sqlx_query = sqlx_query.bind(category);
        }

        if let Some(transaction_type) = filter.transaction_type {
            sqlx_query = sqlx_query.bind(transaction_type.as_str());
        }

        if let Some(status) = filter.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }

        if let Some(date_from) = filter.date_from {
            sqlx_query = sqlx_query.bind(date_from);
        }

        if let Some(date_to) = filter.date_to {
            sqlx_query = sqlx_query.bind(date_to);
        }

        if let Some(amount_min) = filter.amount_min {
            sqlx_query = sqlx_query.bind(amount_min);
        }

        if let Some(amount_max) = filter.amount_max {
            sqlx_query = sqlx_query.bind(amount_max);
        }

        let rows = sqlx_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

/// In-memory implementation backed by a mutex-guarded map. One lock per
/// operation gives the single-record atomicity the store contract asks
/// for; the test suites run against this implementation.
pub struct InMemoryTransactionRepository {
    entries: Mutex<HashMap<Uuid, Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Transaction>>, RepositoryError> {
        self.entries
            .lock()
            .map_err(|_| RepositoryError::DatabaseError("store lock poisoned".to_string()))
    }
}

impl Default for InMemoryTransactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// The same predicate fold the SQL builder expresses, evaluated in
/// memory: absent criteria match everything, present criteria must all
/// hold, DELETED rows never match.
fn matches_filter(filter: &TransactionFilter, transaction: &Transaction) -> bool {
    if transaction.status == TransactionStatus::Deleted {
        return false;
    }
    filter
        .sender_bank
        .as_ref()
        .map_or(true, |bank| *bank == transaction.sender_bank)
        && filter
            .receiver_bank
            .as_ref()
            .map_or(true, |bank| *bank == transaction.receiver_bank)
        && filter
            .category
            .as_ref()
            .map_or(true, |category| *category == transaction.category)
        && filter
            .transaction_type
            .map_or(true, |kind| kind == transaction.transaction_type)
        && filter
            .status
            .map_or(true, |status| status == transaction.status)
        && filter
            .date_from
            .map_or(true, |from| transaction.operation_date >= from)
        && filter
            .date_to
            .map_or(true, |to| transaction.operation_date <= to)
        && filter
            .amount_min
            .map_or(true, |min| transaction.amount >= min)
        && filter
            .amount_max
            .map_or(true, |max| transaction.amount <= max)
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn create(&self, transaction: Transaction) -> Result<Transaction, RepositoryError> {
        self.entries()?
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self.entries()?.get(&id).cloned())
    }

    async fn update(
        &self,
        transaction: Transaction,
        expected_status: TransactionStatus,
    ) -> Result<Transaction, RepositoryError> {
        let mut entries = self.entries()?;
        match entries.get_mut(&transaction.id) {
            None => Err(RepositoryError::NotFound),
            Some(stored) if stored.status != expected_status => Err(RepositoryError::Conflict),
            Some(stored) => {
                *stored = transaction.clone();
                Ok(transaction)
            }
        }
    }

    async fn mark_deleted(
        &self,
        id: Uuid,
        expected_status: TransactionStatus,
    ) -> Result<(), RepositoryError> {
        let mut entries = self.entries()?;
        match entries.get_mut(&id) {
            None => Err(RepositoryError::NotFound),
            Some(stored) if stored.status != expected_status => Err(RepositoryError::Conflict),
            Some(stored) => {
                stored.status = TransactionStatus::Deleted;
                Ok(())
            }
        }
    }

    async fn find_all(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut matching: Vec<Transaction> = self
            .entries()?
            .values()
            .filter(|transaction| matches_filter(filter, transaction))
            .cloned()
            .collect();
        matching.sort_by_key(|transaction| transaction.operation_date);
        Ok(matching)
    }
}
