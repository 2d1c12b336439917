use chrono::Utc;
use uuid::Uuid;

use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::user::UserRole;

use crate::domain::repository::{EventRepository, RatingRepository};
use crate::domain::types::{Rating, RatingFilter, User};
use crate::domain::validation::Validator;
use crate::error::ApiError;

const MAX_COMMENT_LEN: usize = 500;

fn validate_rating(rating: Option<i16>, comment: Option<&str>) -> Result<(), ApiError> {
    Validator::new()
        .check(
            rating.is_none_or(|r| (1..=5).contains(&r)),
            "rating must be between 1 and 5",
        )
        .max_len("comment", comment, MAX_COMMENT_LEN)
        .finish()
}

// ── ListEventRatings ─────────────────────────────────────────────────────────

pub struct ListEventRatingsUseCase<R: RatingRepository, E: EventRepository> {
    pub ratings: R,
    pub events: E,
}

impl<R: RatingRepository, E: EventRepository> ListEventRatingsUseCase<R, E> {
    pub async fn execute(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Rating>, ApiError> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(ApiError::EventNotFound);
        }
        let filter = RatingFilter {
            event_id: Some(event_id),
            ..RatingFilter::default()
        };
        self.ratings.list(filter, page.clamped()).await
    }
}

// ── ListAllRatings ───────────────────────────────────────────────────────────

pub struct ListAllRatingsUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> ListAllRatingsUseCase<R> {
    pub async fn execute(
        &self,
        filter: RatingFilter,
        page: PageRequest,
    ) -> Result<Page<Rating>, ApiError> {
        self.ratings.list(filter, page.clamped()).await
    }
}

// ── CreateRating ─────────────────────────────────────────────────────────────

pub struct CreateRatingUseCase<R: RatingRepository, E: EventRepository> {
    pub ratings: R,
    pub events: E,
}

impl<R: RatingRepository, E: EventRepository> CreateRatingUseCase<R, E> {
    /// Non-admins must have attended the event. Refreshes the event's average.
    pub async fn execute(
        &self,
        user: &User,
        event_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Rating, ApiError> {
        validate_rating(Some(rating), comment.as_deref())?;
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(ApiError::EventNotFound);
        }
        if user.role != UserRole::Admin
            && !self.ratings.has_attended(user.id, event_id).await?
        {
            return Err(ApiError::NotAttended);
        }
        if self
            .ratings
            .find_by_user_and_event(user.id, event_id)
            .await?
            .is_some()
        {
            return Err(ApiError::AlreadyRated);
        }

        let now = Utc::now();
        let rating = Rating {
            id: Uuid::now_v7(),
            user_id: user.id,
            event_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        };
        self.ratings.create(&rating).await?;
        let average = self.ratings.refresh_average(event_id).await?;
        tracing::info!(event_id = %event_id, average, "rating added");
        Ok(rating)
    }
}

/// Load a rating the caller may edit: its owner or an admin.
async fn owned_rating<R: RatingRepository>(
    ratings: &R,
    user: &User,
    id: Uuid,
) -> Result<Rating, ApiError> {
    let rating = ratings
        .find_by_id(id)
        .await?
        .ok_or(ApiError::RatingNotFound)?;
    if rating.user_id != user.id && user.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(rating)
}

// ── UpdateRating ─────────────────────────────────────────────────────────────

pub struct UpdateRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> UpdateRatingUseCase<R> {
    pub async fn execute(
        &self,
        user: &User,
        id: Uuid,
        rating: Option<i16>,
        comment: Option<String>,
    ) -> Result<Rating, ApiError> {
        if rating.is_none() && comment.is_none() {
            return Err(ApiError::MissingData);
        }
        validate_rating(rating, comment.as_deref())?;
        let mut stored = owned_rating(&self.ratings, user, id).await?;
        if let Some(rating) = rating {
            stored.rating = rating;
        }
        if comment.is_some() {
            stored.comment = comment;
        }
        stored.updated_at = Utc::now();
        self.ratings.update(&stored).await?;
        self.ratings.refresh_average(stored.event_id).await?;
        Ok(stored)
    }
}

// ── DeleteRating ─────────────────────────────────────────────────────────────

pub struct DeleteRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> DeleteRatingUseCase<R> {
    pub async fn execute(&self, user: &User, id: Uuid) -> Result<(), ApiError> {
        let stored = owned_rating(&self.ratings, user, id).await?;
        if !self.ratings.delete(id).await? {
            return Err(ApiError::RatingNotFound);
        }
        self.ratings.refresh_average(stored.event_id).await?;
        Ok(())
    }
}
