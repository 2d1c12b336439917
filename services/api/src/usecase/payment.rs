use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::payment::{PaymentMethod, PaymentStatus};
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};

use crate::domain::repository::{GatewayOrder, PaymentGateway, PaymentRepository, TicketRepository};
use crate::domain::types::{
    CURRENCY, OutboxEvent, Payment, PaymentFilter, Ticket, User, outbox_kind,
};
use crate::domain::validation::Validator;
use crate::error::ApiError;
use crate::usecase::ticket::{IssuedTicket, confirmation_event, issue_qr, lost_write};

/// Load a ticket that belongs to `user`.
async fn own_ticket<T: TicketRepository>(
    tickets: &T,
    user: &User,
    id: Uuid,
) -> Result<Ticket, ApiError> {
    let ticket = tickets
        .find_by_id(id)
        .await?
        .ok_or(ApiError::TicketNotFound)?;
    if ticket.purchased_by != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(ticket)
}

// ── CreateOrder ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CreateOrderOutput {
    pub order: GatewayOrder,
    pub payment: Payment,
    pub ticket: Ticket,
}

pub struct CreateOrderUseCase<T: TicketRepository, P: PaymentRepository, G: PaymentGateway> {
    pub tickets: T,
    pub payments: P,
    pub gateway: G,
}

impl<T, P, G> CreateOrderUseCase<T, P, G>
where
    T: TicketRepository,
    P: PaymentRepository,
    G: PaymentGateway,
{
    pub async fn execute(
        &self,
        user: &User,
        ticket_id: Uuid,
        payment_method: Option<PaymentMethod>,
    ) -> Result<CreateOrderOutput, ApiError> {
        let ticket = own_ticket(&self.tickets, user, ticket_id).await?;
        if !ticket
            .payment_status
            .can_transition_to(TicketPaymentStatus::Completed)
        {
            return Err(ApiError::AlreadyPaid);
        }
        if ticket.status != TicketStatus::Active {
            return Err(ApiError::TicketNotUsable(format!("Ticket status: {}", ticket.status)));
        }

        let order = self.gateway.create_order(ticket.total_amount, CURRENCY);
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::now_v7(),
            user_id: user.id,
            ticket_id: ticket.id,
            amount: ticket.total_amount,
            currency: CURRENCY.to_owned(),
            gateway_order_id: order.order_id.clone(),
            gateway_payment_id: None,
            gateway_signature: None,
            status: PaymentStatus::Initiated,
            payment_method,
            refund_amount: None,
            refund_id: None,
            transaction_date: now,
            metadata: None,
            created_at: now,
            updated_at: now,
        };
        self.payments.create(&payment).await?;
        Ok(CreateOrderOutput {
            order,
            payment,
            ticket,
        })
    }
}

// ── VerifyPayment ────────────────────────────────────────────────────────────

pub struct VerifyPaymentInput {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub ticket_id: Uuid,
}

pub struct VerifyPaymentUseCase<T: TicketRepository, P: PaymentRepository, G: PaymentGateway> {
    pub tickets: T,
    pub payments: P,
    pub gateway: G,
}

impl<T, P, G> VerifyPaymentUseCase<T, P, G>
where
    T: TicketRepository,
    P: PaymentRepository,
    G: PaymentGateway,
{
    pub async fn execute(
        &self,
        user: &User,
        input: VerifyPaymentInput,
    ) -> Result<IssuedTicket, ApiError> {
        Validator::new()
            .text("order_id", &input.order_id, 128)
            .text("payment_id", &input.payment_id, 128)
            .text("signature", &input.signature, 256)
            .finish()?;

        let mut ticket = own_ticket(&self.tickets, user, input.ticket_id).await?;
        let mut payment = self
            .payments
            .find_by_order_id(&input.order_id)
            .await?
            .filter(|p| p.ticket_id == ticket.id)
            .ok_or(ApiError::PaymentNotFound)?;
        if payment.status == PaymentStatus::Completed {
            return Err(ApiError::AlreadyPaid);
        }

        let expected = ticket.state();
        let now = Utc::now();
        if !self
            .gateway
            .verify_signature(&input.order_id, &input.payment_id, &input.signature)
        {
            tracing::warn!(
                ticket_id = %ticket.id,
                order_id = %input.order_id,
                user_id = %user.id,
                "payment signature rejected"
            );
            payment.status = PaymentStatus::Failed;
            payment.updated_at = now;
            if let Ok(failed) = ticket.payment_status.transition(TicketPaymentStatus::Failed) {
                ticket.payment_status = failed;
            }
            ticket.updated_at = now;
            // A ticket paid meanwhile keeps its state. The caller's signature is still wrong.
            self.payments
                .record_failure(&payment, &ticket, expected)
                .await?;
            return Err(ApiError::InvalidSignature);
        }

        ticket.payment_status = ticket
            .payment_status
            .transition(TicketPaymentStatus::Completed)?;
        ticket.payment_id = Some(payment.id);
        ticket.updated_at = now;
        let qr_payload = issue_qr(&mut ticket, now);

        payment.status = PaymentStatus::Completed;
        payment.gateway_payment_id = Some(input.payment_id);
        payment.gateway_signature = Some(input.signature);
        payment.transaction_date = now;
        payment.updated_at = now;

        let outbox = confirmation_event(&ticket, &user.email);
        if !self
            .payments
            .complete(&payment, &ticket, expected, &outbox)
            .await?
        {
            return Err(ApiError::AlreadyPaid);
        }
        tracing::info!(
            ticket_id = %ticket.id,
            payment_id = %payment.id,
            amount = payment.amount,
            "payment verified"
        );
        Ok(IssuedTicket {
            ticket,
            qr_payload: Some(qr_payload),
        })
    }
}

// ── ListPayments ─────────────────────────────────────────────────────────────

pub struct ListPaymentsUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> ListPaymentsUseCase<P> {
    pub async fn execute(
        &self,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, ApiError> {
        self.payments.list(filter, page.clamped()).await
    }
}

// ── PaymentHistory ───────────────────────────────────────────────────────────

pub struct PaymentHistoryUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> PaymentHistoryUseCase<P> {
    pub async fn execute(&self) -> Result<Vec<Payment>, ApiError> {
        self.payments.list_all().await
    }
}

// ── Refund ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefundOutput {
    pub refund_id: String,
    pub amount: i64,
    pub ticket: Ticket,
}

pub struct RefundUseCase<T: TicketRepository, P: PaymentRepository, G: PaymentGateway> {
    pub tickets: T,
    pub payments: P,
    pub gateway: G,
}

impl<T, P, G> RefundUseCase<T, P, G>
where
    T: TicketRepository,
    P: PaymentRepository,
    G: PaymentGateway,
{
    pub async fn execute(&self, ticket_id: Uuid, amount: i64) -> Result<RefundOutput, ApiError> {
        let mut ticket = self
            .tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(ApiError::TicketNotFound)?;
        let mut payment = self
            .payments
            .find_completed_for_ticket(ticket.id)
            .await?
            .ok_or(ApiError::PaymentNotFound)?;
        Validator::new()
            .check(
                amount > 0 && amount <= payment.amount,
                format!("amount must be between 1 and {}", payment.amount),
            )
            .finish()?;

        let expected = ticket.state();
        let held_seats = ticket.status.holds_seats();
        ticket.status = ticket.status.transition(TicketStatus::Refunded)?;
        ticket.payment_status = ticket
            .payment_status
            .transition(TicketPaymentStatus::Refunded)?;

        let gateway_payment_id = payment
            .gateway_payment_id
            .clone()
            .unwrap_or_else(|| payment.gateway_order_id.clone());
        let refund_id = self.gateway.refund(&gateway_payment_id, amount);

        let now = Utc::now();
        ticket.updated_at = now;
        payment.status = PaymentStatus::Refunded;
        payment.refund_amount = Some(amount);
        payment.refund_id = Some(refund_id.clone());
        payment.updated_at = now;

        let outbox = OutboxEvent::new(
            outbox_kind::REFUND_PROCESSED,
            ticket.id,
            json!({
                "ticket_id": ticket.id,
                "ticket_number": ticket.ticket_number,
                "user_id": ticket.purchased_by,
                "payment_id": payment.id,
                "refund_id": refund_id,
                "amount": amount,
                "currency": payment.currency,
            }),
        );
        if !self
            .payments
            .refund(&payment, &ticket, expected, &outbox, held_seats)
            .await?
        {
            return Err(lost_write(&self.tickets, ticket.id, TicketStatus::Refunded).await);
        }
        tracing::info!(
            ticket_id = %ticket.id,
            refund_id = %refund_id,
            amount,
            "refund processed"
        );
        Ok(RefundOutput {
            refund_id,
            amount,
            ticket,
        })
    }
}
