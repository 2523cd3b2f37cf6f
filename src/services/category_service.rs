use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::{Category, CategoryRequest};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::RepositoryError;

/// Category service errors
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Category {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Trait defining category service operations
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Create a new category
    async fn create_category(&self, request: CategoryRequest) -> Result<Category, CategoryError>;

    /// All categories, ordered by name
    async fn get_categories(&self) -> Result<Vec<Category>, CategoryError>;

    /// Rename an existing category
    async fn update_category(
        &self,
        id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Hard-delete a category by id
    async fn delete_category(&self, id: Uuid) -> Result<(), CategoryError>;
}

/// Implementation of CategoryService
pub struct CategoryServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
}

impl CategoryServiceImpl {
    pub fn new(category_repository: Arc<dyn CategoryRepository>) -> Self {
        Self {
            category_repository,
        }
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    async fn create_category(&self, request: CategoryRequest) -> Result<Category, CategoryError> {
        let category = Category {
            id: Uuid::new_v4(),
            name: request.name,
        };

        self.category_repository
            .create(category)
            .await
            .map_err(|e| CategoryError::DatabaseError(e.to_string()))
    }

    async fn get_categories(&self) -> Result<Vec<Category>, CategoryError> {
        self.category_repository
            .find_all()
            .await
            .map_err(|e| CategoryError::DatabaseError(e.to_string()))
    }

    async fn update_category(
        &self,
        id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, CategoryError> {
        let replacement = Category {
            id,
            name: request.name,
        };

        self.category_repository
            .update(replacement)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CategoryError::NotFound(id),
                other => CategoryError::DatabaseError(other.to_string()),
            })
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), CategoryError> {
        self.category_repository
            .delete(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CategoryError::NotFound(id),
                other => CategoryError::DatabaseError(other.to_string()),
            })
    }
}
