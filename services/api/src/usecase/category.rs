use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::Category;
use crate::domain::validation::Validator;
use crate::error::ApiError;

// ── ListCategories ───────────────────────────────────────────────────────────

pub struct ListCategoriesUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Category>, ApiError> {
        self.repo.list().await
    }
}

// ── CreateCategory ───────────────────────────────────────────────────────────

pub struct CreateCategoryUseCase<R: CategoryRepository> {
    pub repo: R,
}

impl<R: CategoryRepository> CreateCategoryUseCase<R> {
    pub async fn execute(&self, title: &str) -> Result<Category, ApiError> {
        Validator::new().text("title", title, 100).finish()?;
        let title = title.trim();
        if self.repo.find_by_title(title).await?.is_some() {
            return Err(ApiError::CategoryAlreadyExists);
        }
        let category = Category {
            id: Uuid::now_v7(),
            title: title.to_owned(),
            created_at: Utc::now(),
        };
        self.repo.create(&category).await?;
        Ok(category)
    }
}
