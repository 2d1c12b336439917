use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, Statement,
};
use uuid::Uuid;

use marquee_api_schema::{ratings, tickets};
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::ticket::TicketStatus;

use crate::domain::repository::RatingRepository;
use crate::domain::types::{Rating, RatingFilter};
use crate::error::ApiError;

use super::fetch_page;

const REFRESH_AVERAGE_SQL: &str = r#"
    UPDATE events
    SET average_rating = COALESCE(
            (SELECT ROUND(AVG(rating)::NUMERIC, 1)::FLOAT8 FROM ratings WHERE event_id = $1),
            0
        ),
        updated_at = NOW()
    WHERE id = $1
    RETURNING average_rating
"#;

#[derive(Debug, FromQueryResult)]
struct AverageRow {
    average_rating: f64,
}

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
}

impl RatingRepository for DbRatingRepository {
    async fn list(
        &self,
        filter: RatingFilter,
        page: PageRequest,
    ) -> Result<Page<Rating>, ApiError> {
        let mut select = ratings::Entity::find();
        if let Some(event_id) = filter.event_id {
            select = select.filter(ratings::Column::EventId.eq(event_id));
        }
        if let Some(user_id) = filter.user_id {
            select = select.filter(ratings::Column::UserId.eq(user_id));
        }
        if let Some(min) = filter.min_rating {
            select = select.filter(ratings::Column::Rating.gte(min));
        }
        let select = select.order_by_desc(ratings::Column::CreatedAt);
        let page = fetch_page(select, &self.db, page, "list ratings").await?;
        Ok(page.map(rating_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, ApiError> {
        let model = ratings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find rating by id")?;
        Ok(model.map(rating_from_model))
    }

    async fn find_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Rating>, ApiError> {
        let model = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::EventId.eq(event_id))
            .one(&self.db)
            .await
            .context("find rating by user and event")?;
        Ok(model.map(rating_from_model))
    }

    async fn create(&self, rating: &Rating) -> Result<(), ApiError> {
        active_model(rating)
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db(e, ApiError::AlreadyRated, "create rating"))?;
        Ok(())
    }

    async fn update(&self, rating: &Rating) -> Result<(), ApiError> {
        let mut am = active_model(rating);
        am.created_at = NotSet;
        am.update(&self.db).await.context("update rating")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = ratings::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete rating")?;
        Ok(result.rows_affected > 0)
    }

    async fn refresh_average(&self, event_id: Uuid) -> Result<f64, ApiError> {
        let row = AverageRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            REFRESH_AVERAGE_SQL,
            [event_id.into()],
        ))
        .one(&self.db)
        .await
        .context("refresh average rating")?;
        Ok(row.map(|r| r.average_rating).unwrap_or(0.0))
    }

    async fn has_attended(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, ApiError> {
        let count = tickets::Entity::find()
            .filter(tickets::Column::PurchasedBy.eq(user_id))
            .filter(tickets::Column::EventId.eq(event_id))
            .filter(tickets::Column::VerifiedAt.is_not_null())
            .filter(
                tickets::Column::Status
                    .is_in([TicketStatus::Active.as_str(), TicketStatus::Used.as_str()]),
            )
            .count(&self.db)
            .await
            .context("check event attendance")?;
        Ok(count > 0)
    }
}

fn active_model(rating: &Rating) -> ratings::ActiveModel {
    ratings::ActiveModel {
        id: Set(rating.id),
        user_id: Set(rating.user_id),
        event_id: Set(rating.event_id),
        rating: Set(rating.rating),
        comment: Set(rating.comment.clone()),
        created_at: Set(rating.created_at),
        updated_at: Set(rating.updated_at),
    }
}

fn rating_from_model(model: ratings::Model) -> Rating {
    Rating {
        id: model.id,
        user_id: model.user_id,
        event_id: model.event_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
