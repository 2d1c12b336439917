use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use marquee_api_schema::payments;
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::payment::PaymentStatus;

use crate::domain::repository::PaymentRepository;
use crate::domain::types::{OutboxEvent, Payment, PaymentFilter, Ticket, TicketState};
use crate::error::ApiError;

use super::ticket::{release_show_seats, update_ticket};
use super::{fetch_page, insert_outbox_event, parse_column};

#[derive(Clone)]
pub struct DbPaymentRepository {
    pub db: DatabaseConnection,
}

impl PaymentRepository for DbPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<(), ApiError> {
        active_model(payment)
            .insert(&self.db)
            .await
            .context("insert payment")?;
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, ApiError> {
        let model = payments::Entity::find()
            .filter(payments::Column::GatewayOrderId.eq(order_id))
            .one(&self.db)
            .await
            .context("find payment by order id")?;
        model.map(payment_from_model).transpose()
    }

    async fn find_completed_for_ticket(
        &self,
        ticket_id: Uuid,
    ) -> Result<Option<Payment>, ApiError> {
        let model = payments::Entity::find()
            .filter(payments::Column::TicketId.eq(ticket_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Completed.as_str()))
            .order_by_desc(payments::Column::TransactionDate)
            .one(&self.db)
            .await
            .context("find completed payment for ticket")?;
        model.map(payment_from_model).transpose()
    }

    async fn list(
        &self,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, ApiError> {
        let mut select = payments::Entity::find();
        if let Some(user_id) = filter.user_id {
            select = select.filter(payments::Column::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            select = select.filter(payments::Column::Status.eq(status.as_str()));
        }
        let select = select.order_by_desc(payments::Column::TransactionDate);
        let page = fetch_page(select, &self.db, page, "list payments").await?;
        let total = page.total;
        let items = page
            .items
            .into_iter()
            .map(payment_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn list_all(&self) -> Result<Vec<Payment>, ApiError> {
        let models = payments::Entity::find()
            .order_by_desc(payments::Column::TransactionDate)
            .all(&self.db)
            .await
            .context("list payment history")?;
        models.into_iter().map(payment_from_model).collect()
    }

    async fn record_failure(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError> {
        let txn = self.db.begin().await.context("begin payment failure")?;
        if !update_ticket(&txn, ticket, expected).await? {
            txn.rollback().await.context("roll back payment failure")?;
            return Ok(false);
        }
        update_payment(&txn, payment).await?;
        txn.commit().await.context("commit payment failure")?;
        Ok(true)
    }

    async fn complete(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
        outbox: &OutboxEvent,
    ) -> Result<bool, ApiError> {
        let txn = self.db.begin().await.context("begin payment completion")?;
        if !update_ticket(&txn, ticket, expected).await? {
            txn.rollback()
                .await
                .context("roll back payment completion")?;
            return Ok(false);
        }
        update_payment(&txn, payment).await?;
        insert_outbox_event(&txn, outbox)
            .await
            .context("insert ticket confirmation outbox event")?;
        txn.commit().await.context("commit payment completion")?;
        Ok(true)
    }

    async fn refund(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
        outbox: &OutboxEvent,
        release_seats: bool,
    ) -> Result<bool, ApiError> {
        let txn = self.db.begin().await.context("begin refund")?;
        if !update_ticket(&txn, ticket, expected).await? {
            txn.rollback().await.context("roll back refund")?;
            return Ok(false);
        }
        update_payment(&txn, payment).await?;
        if release_seats {
            release_show_seats(&txn, ticket).await?;
        }
        insert_outbox_event(&txn, outbox)
            .await
            .context("insert refund outbox event")?;
        txn.commit().await.context("commit refund")?;
        Ok(true)
    }
}

async fn update_payment<C: ConnectionTrait>(conn: &C, payment: &Payment) -> Result<(), ApiError> {
    let mut am = active_model(payment);
    am.created_at = NotSet;
    am.update(conn).await.context("update payment")?;
    Ok(())
}

fn active_model(payment: &Payment) -> payments::ActiveModel {
    payments::ActiveModel {
        id: Set(payment.id),
        user_id: Set(payment.user_id),
        ticket_id: Set(payment.ticket_id),
        amount: Set(payment.amount),
        currency: Set(payment.currency.clone()),
        gateway_order_id: Set(payment.gateway_order_id.clone()),
        gateway_payment_id: Set(payment.gateway_payment_id.clone()),
        gateway_signature: Set(payment.gateway_signature.clone()),
        status: Set(payment.status.as_str().to_owned()),
        payment_method: Set(payment.payment_method.map(|m| m.as_str().to_owned())),
        refund_amount: Set(payment.refund_amount),
        refund_id: Set(payment.refund_id.clone()),
        transaction_date: Set(payment.transaction_date),
        metadata: Set(payment.metadata.clone()),
        created_at: Set(payment.created_at),
        updated_at: Set(payment.updated_at),
    }
}

fn payment_from_model(model: payments::Model) -> Result<Payment, ApiError> {
    let payment_method = model
        .payment_method
        .as_deref()
        .map(|m| parse_column(m, "payments.payment_method"))
        .transpose()?;
    Ok(Payment {
        id: model.id,
        user_id: model.user_id,
        ticket_id: model.ticket_id,
        amount: model.amount,
        currency: model.currency,
        gateway_order_id: model.gateway_order_id,
        gateway_payment_id: model.gateway_payment_id,
        gateway_signature: model.gateway_signature,
        status: parse_column(&model.status, "payments.status")?,
        payment_method,
        refund_amount: model.refund_amount,
        refund_id: model.refund_id,
        transaction_date: model.transaction_date,
        metadata: model.metadata,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
