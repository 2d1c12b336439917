use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use marquee_api_schema::categories;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::Category;
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Title)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Category>, ApiError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Title.eq(title))
            .one(&self.db)
            .await
            .context("find category by title")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, category: &Category) -> Result<(), ApiError> {
        categories::ActiveModel {
            id: Set(category.id),
            title: Set(category.title.clone()),
            created_at: Set(category.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ApiError::from_db(e, ApiError::CategoryAlreadyExists, "create category"))?;
        Ok(())
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        title: model.title,
        created_at: model.created_at,
    }
}
