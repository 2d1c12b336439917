use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Category;
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::handlers::Listed;
use crate::state::AppState;
use crate::usecase::category::{CreateCategoryUseCase, ListCategoriesUseCase};

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            title: c.title,
            created_at: c.created_at,
        }
    }
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Listed<CategoryResponse>>, ApiError> {
    let usecase = ListCategoriesUseCase {
        repo: state.category_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(Json(Listed::new(
        categories.into_iter().map(CategoryResponse::from).collect(),
    )))
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub title: String,
}

pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    auth.require_admin()?;
    let usecase = CreateCategoryUseCase {
        repo: state.category_repo(),
    };
    let category = usecase.execute(&body.title).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}
