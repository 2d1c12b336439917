use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement, TransactionTrait,
};
use uuid::Uuid;

use marquee_api_schema::tickets;
use marquee_domain::pagination::{Page, PageRequest};

use crate::domain::repository::TicketRepository;
use crate::domain::types::{OutboxEvent, Ticket, TicketFilter, TicketState};
use crate::error::ApiError;

use super::event::{SEATS_TAKEN_SQL, SeatsTakenRow};
use super::{fetch_page, from_json, insert_outbox_event, parse_column, to_json};

/// Reserve seats only if they fit. Zero rows affected means the show is full.
const RESERVE_SHOW_SEATS_SQL: &str = r#"
    UPDATE shows
    SET seats_booked = seats_booked + $1
    WHERE id = $2 AND seats_booked + $1 <= seat_capacity
"#;

const RELEASE_SHOW_SEATS_SQL: &str = r#"
    UPDATE shows
    SET seats_booked = GREATEST(seats_booked - $1, 0)
    WHERE id = $2
"#;

/// Serializes capacity checks for events booked without a show.
const LOCK_EVENT_SQL: &str = "SELECT capacity FROM events WHERE id = $1 FOR UPDATE";

const DEBIT_ENTRY_PASS_SQL: &str = r#"
    UPDATE entry_passes
    SET head_count = head_count - $1, updated_at = NOW()
    WHERE id = $2 AND status = 'active' AND expires_at > NOW() AND head_count >= $1
"#;

#[derive(Debug, FromQueryResult)]
struct CapacityRow {
    capacity: i32,
}

#[derive(Clone)]
pub struct DbTicketRepository {
    pub db: DatabaseConnection,
}

impl TicketRepository for DbTicketRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        let model = tickets::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ticket by id")?;
        model.map(ticket_from_model).transpose()
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Ticket>, ApiError> {
        let model = tickets::Entity::find()
            .filter(tickets::Column::QrCode.eq(qr_code))
            .one(&self.db)
            .await
            .context("find ticket by qr code")?;
        model.map(ticket_from_model).transpose()
    }

    async fn list(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, ApiError> {
        let mut select = tickets::Entity::find();
        if let Some(user_id) = filter.purchased_by {
            select = select.filter(tickets::Column::PurchasedBy.eq(user_id));
        }
        if let Some(event_id) = filter.event_id {
            select = select.filter(tickets::Column::EventId.eq(event_id));
        }
        if let Some(status) = filter.status {
            select = select.filter(tickets::Column::Status.eq(status.as_str()));
        }
        if let Some(payment_status) = filter.payment_status {
            select = select.filter(tickets::Column::PaymentStatus.eq(payment_status.as_str()));
        }
        let select = select.order_by_desc(tickets::Column::PurchaseDate);
        let page = fetch_page(select, &self.db, page, "list tickets").await?;
        let total = page.total;
        let items = page
            .items
            .into_iter()
            .map(ticket_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn book(&self, ticket: &Ticket, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let txn = self.db.begin().await.context("begin booking")?;
        let backend = txn.get_database_backend();
        let seats = ticket.head_count;

        match ticket.show_id {
            Some(show_id) => {
                let result = txn
                    .execute(Statement::from_sql_and_values(
                        backend,
                        RESERVE_SHOW_SEATS_SQL,
                        [seats.into(), show_id.into()],
                    ))
                    .await
                    .context("reserve show seats")?;
                if result.rows_affected() == 0 {
                    return Err(ApiError::SoldOut);
                }
            }
            None => {
                let capacity = CapacityRow::find_by_statement(Statement::from_sql_and_values(
                    backend,
                    LOCK_EVENT_SQL,
                    [ticket.event_id.into()],
                ))
                .one(&txn)
                .await
                .context("lock event for booking")?
                .ok_or(ApiError::EventNotFound)?
                .capacity;
                let taken = SeatsTakenRow::find_by_statement(Statement::from_sql_and_values(
                    backend,
                    SEATS_TAKEN_SQL,
                    [ticket.event_id.into()],
                ))
                .one(&txn)
                .await
                .context("sum seats taken")?
                .map(|r| r.taken)
                .unwrap_or(0);
                if taken + i64::from(seats) > i64::from(capacity) {
                    return Err(ApiError::SoldOut);
                }
            }
        }

        if let Some(pass_id) = ticket.entry_pass_id {
            let result = txn
                .execute(Statement::from_sql_and_values(
                    backend,
                    DEBIT_ENTRY_PASS_SQL,
                    [seats.into(), pass_id.into()],
                ))
                .await
                .context("debit entry pass")?;
            if result.rows_affected() == 0 {
                return Err(ApiError::InsufficientPassCredit);
            }
        }

        active_model(ticket)?
            .insert(&txn)
            .await
            .context("insert ticket")?;
        if let Some(event) = outbox {
            insert_outbox_event(&txn, event)
                .await
                .context("insert booking outbox event")?;
        }
        txn.commit().await.context("commit booking")?;
        Ok(())
    }

    async fn update(&self, ticket: &Ticket, expected: TicketState) -> Result<bool, ApiError> {
        update_ticket(&self.db, ticket, expected).await
    }

    async fn update_releasing_seats(
        &self,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError> {
        let txn = self.db.begin().await.context("begin ticket release")?;
        if !update_ticket(&txn, ticket, expected).await? {
            txn.rollback().await.context("roll back ticket release")?;
            return Ok(false);
        }
        release_show_seats(&txn, ticket).await?;
        txn.commit().await.context("commit ticket release")?;
        Ok(true)
    }
}

/// Overwrite the ticket's mutable columns while the stored row still holds
/// `expected`. Returns whether a row was written.
pub(super) async fn update_ticket<C: ConnectionTrait>(
    conn: &C,
    ticket: &Ticket,
    expected: TicketState,
) -> Result<bool, ApiError> {
    let mut am = active_model(ticket)?;
    am.id = NotSet;
    am.created_at = NotSet;
    let result = tickets::Entity::update_many()
        .set(am)
        .filter(tickets::Column::Id.eq(ticket.id))
        .filter(tickets::Column::Status.eq(expected.status.as_str()))
        .filter(tickets::Column::PaymentStatus.eq(expected.payment_status.as_str()))
        .exec(conn)
        .await
        .context("update ticket")?;
    Ok(result.rows_affected == 1)
}

/// Hand a ticket's show seats back. The counter never drops below zero.
pub(super) async fn release_show_seats<C: ConnectionTrait>(
    conn: &C,
    ticket: &Ticket,
) -> Result<(), ApiError> {
    let Some(show_id) = ticket.show_id else {
        return Ok(());
    };
    conn.execute(Statement::from_sql_and_values(
        conn.get_database_backend(),
        RELEASE_SHOW_SEATS_SQL,
        [ticket.head_count.into(), show_id.into()],
    ))
    .await
    .context("release show seats")?;
    Ok(())
}

fn active_model(ticket: &Ticket) -> Result<tickets::ActiveModel, ApiError> {
    Ok(tickets::ActiveModel {
        id: Set(ticket.id),
        ticket_number: Set(ticket.ticket_number.clone()),
        qr_code: Set(ticket.qr_code.clone()),
        purchased_by: Set(ticket.purchased_by),
        issued_by: Set(ticket.issued_by),
        event_id: Set(ticket.event_id),
        show_id: Set(ticket.show_id),
        head_count: Set(ticket.head_count),
        attendees: Set(to_json(&ticket.attendees, "tickets.attendees")?),
        total_amount: Set(ticket.total_amount),
        payment_status: Set(ticket.payment_status.as_str().to_owned()),
        payment_id: Set(ticket.payment_id),
        entry_pass_id: Set(ticket.entry_pass_id),
        status: Set(ticket.status.as_str().to_owned()),
        purchase_date: Set(ticket.purchase_date),
        verified_at: Set(ticket.verified_at),
        verified_by: Set(ticket.verified_by),
        attended_at: Set(ticket.attended_at),
        created_at: Set(ticket.created_at),
        updated_at: Set(ticket.updated_at),
    })
}

fn ticket_from_model(model: tickets::Model) -> Result<Ticket, ApiError> {
    Ok(Ticket {
        id: model.id,
        ticket_number: model.ticket_number,
        qr_code: model.qr_code,
        purchased_by: model.purchased_by,
        issued_by: model.issued_by,
        event_id: model.event_id,
        show_id: model.show_id,
        head_count: model.head_count,
        attendees: from_json(model.attendees, "tickets.attendees")?,
        total_amount: model.total_amount,
        payment_status: parse_column(&model.payment_status, "tickets.payment_status")?,
        payment_id: model.payment_id,
        entry_pass_id: model.entry_pass_id,
        status: parse_column(&model.status, "tickets.status")?,
        purchase_date: model.purchase_date,
        verified_at: model.verified_at,
        verified_by: model.verified_by,
        attended_at: model.attended_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
