use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{NotSet, Set}, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use marquee_api_schema::exhibitions;
use marquee_domain::event::ExhibitionStatus;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::repository::ExhibitionRepository;
use crate::domain::types::{Exhibition, Venue};
use crate::error::ApiError;

use super::{fetch_page, parse_column};

#[derive(Clone)]
pub struct DbExhibitionRepository {
    pub db: DatabaseConnection,
}

impl ExhibitionRepository for DbExhibitionRepository {
    async fn list(
        &self,
        status: Option<ExhibitionStatus>,
        page: PageRequest,
    ) -> Result<Page<Exhibition>, ApiError> {
        let mut select = exhibitions::Entity::find();
        if let Some(status) = status {
            select = select.filter(exhibitions::Column::Status.eq(status.as_str()));
        }
        let select = select.order_by_asc(exhibitions::Column::StartDate);
        let page = fetch_page(select, &self.db, page, "list exhibitions").await?;
        let total = page.total;
        let items = page
            .items
            .into_iter()
            .map(exhibition_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn list_starting_after(&self, now: DateTime<Utc>) -> Result<Vec<Exhibition>, ApiError> {
        let models = exhibitions::Entity::find()
            .filter(exhibitions::Column::StartDate.gt(now))
            .order_by_asc(exhibitions::Column::StartDate)
            .all(&self.db)
            .await
            .context("list upcoming exhibitions")?;
        models.into_iter().map(exhibition_from_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        let model = exhibitions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find exhibition by id")?;
        model.map(exhibition_from_model).transpose()
    }

    async fn create(&self, exhibition: &Exhibition) -> Result<(), ApiError> {
        active_model(exhibition)
            .insert(&self.db)
            .await
            .context("create exhibition")?;
        Ok(())
    }

    async fn update(&self, exhibition: &Exhibition) -> Result<(), ApiError> {
        let mut am = active_model(exhibition);
        am.created_at = NotSet;
        am.update(&self.db).await.context("update exhibition")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = exhibitions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete exhibition")?;
        Ok(result.rows_affected > 0)
    }
}

fn active_model(exhibition: &Exhibition) -> exhibitions::ActiveModel {
    let venue = &exhibition.venue;
    exhibitions::ActiveModel {
        id: Set(exhibition.id),
        name: Set(exhibition.name.clone()),
        description: Set(exhibition.description.clone()),
        start_date: Set(exhibition.start_date),
        end_date: Set(exhibition.end_date),
        venue_name: Set(venue.name.clone()),
        venue_address: Set(venue.address.clone()),
        venue_city: Set(venue.city.clone()),
        venue_state: Set(venue.state.clone()),
        venue_pincode: Set(venue.pincode.clone()),
        venue_latitude: Set(venue.latitude),
        venue_longitude: Set(venue.longitude),
        map_layout: Set(exhibition.map_layout.clone()),
        organizer_id: Set(exhibition.organizer_id),
        status: Set(exhibition.status.as_str().to_owned()),
        created_at: Set(exhibition.created_at),
        updated_at: Set(exhibition.updated_at),
    }
}

fn exhibition_from_model(model: exhibitions::Model) -> Result<Exhibition, ApiError> {
    Ok(Exhibition {
        id: model.id,
        name: model.name,
        description: model.description,
        start_date: model.start_date,
        end_date: model.end_date,
        venue: Venue {
            name: model.venue_name,
            address: model.venue_address,
            city: model.venue_city,
            state: model.venue_state,
            pincode: model.venue_pincode,
            latitude: model.venue_latitude,
            longitude: model.venue_longitude,
        },
        map_layout: model.map_layout,
        organizer_id: model.organizer_id,
        status: parse_column(&model.status, "exhibitions.status")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
