use sea_orm::entity::prelude::*;

/// Purchase record granting admission. `qr_code` is issued once payment completes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ticket_number: String,
    #[sea_orm(unique)]
    pub qr_code: Option<String>,
    pub purchased_by: Uuid,
    pub issued_by: Uuid,
    pub event_id: Uuid,
    pub show_id: Option<Uuid>,
    pub head_count: i32,
    pub attendees: Json,
    pub total_amount: i64,
    pub payment_status: String,
    pub payment_id: Option<Uuid>,
    pub entry_pass_id: Option<Uuid>,
    pub status: String,
    pub purchase_date: chrono::DateTime<chrono::Utc>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub verified_by: Option<Uuid>,
    pub attended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PurchasedBy",
        to = "super::users::Column::Id"
    )]
    Purchaser,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchaser.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
