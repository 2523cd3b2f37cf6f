use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::category::Category;

/// Trait defining category store operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Find a category by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;

    /// All categories, ordered by name
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Replace a category's name; NotFound on unknown id
    async fn update(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Hard-delete a category; NotFound on unknown id
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// PostgreSQL implementation of CategoryRepository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(category.id)
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn update(&self, category: Category) -> Result<Category, RepositoryError> {
        let updated = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(category.id)
        .bind(&category.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        updated.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// In-memory implementation for the test suites
pub struct InMemoryCategoryRepository {
    categories: Mutex<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: Mutex::new(HashMap::new()),
        }
    }

    fn categories(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Category>>, RepositoryError> {
        self.categories
            .lock()
            .map_err(|_| RepositoryError::DatabaseError("store lock poisoned".to_string()))
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        self.categories()?.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        Ok(self.categories()?.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut all: Vec<Category> = self.categories()?.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update(&self, category: Category) -> Result<Category, RepositoryError> {
        let mut categories = self.categories()?;
        match categories.get_mut(&category.id) {
            None => Err(RepositoryError::NotFound),
            Some(stored) => {
                *stored = category.clone();
                Ok(category)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        if self.categories()?.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
