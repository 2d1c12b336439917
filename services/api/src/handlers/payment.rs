use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::payment::{PaymentMethod, PaymentStatus};
use marquee_domain::ticket::{QrPayload, TicketStatus};

use crate::domain::types::{Payment, PaymentFilter};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, QueryParams};
use crate::handlers::{Listed, PageQuery, Paged, parse_param};
use crate::state::AppState;
use crate::usecase::payment::{
    CreateOrderUseCase, ListPaymentsUseCase, PaymentHistoryUseCase, RefundUseCase,
    VerifyPaymentInput, VerifyPaymentUseCase,
};

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticket_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub refund_amount: Option<i64>,
    pub refund_id: Option<String>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub transaction_date: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            ticket_id: p.ticket_id,
            amount: p.amount,
            currency: p.currency,
            gateway_order_id: p.gateway_order_id,
            gateway_payment_id: p.gateway_payment_id,
            status: p.status,
            payment_method: p.payment_method,
            refund_amount: p.refund_amount,
            refund_id: p.refund_id,
            transaction_date: p.transaction_date,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ── POST /payments/create-order ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub ticket_id: Uuid,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub ticket_id: Uuid,
    pub ticket_number: String,
    pub mock_payment_id: String,
    pub mock_signature: String,
}

pub async fn create_order(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let usecase = CreateOrderUseCase {
        tickets: state.ticket_repo(),
        payments: state.payment_repo(),
        gateway: state.gateway.clone(),
    };
    let output = usecase
        .execute(&user, body.ticket_id, body.payment_method)
        .await?;
    Ok(Json(CreateOrderResponse {
        order_id: output.order.order_id,
        amount: output.payment.amount,
        currency: output.payment.currency,
        ticket_id: output.ticket.id,
        ticket_number: output.ticket.ticket_number,
        mock_payment_id: output.order.payment_id,
        mock_signature: output.order.signature,
    }))
}

// ── POST /payments/verify ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub signature: String,
    pub ticket_id: Uuid,
}

#[derive(Serialize)]
pub struct VerifyPaymentResponse {
    pub ticket_id: Uuid,
    pub ticket_number: String,
    pub qr_code: Option<String>,
    pub qr_payload: Option<QrPayload>,
    pub status: TicketStatus,
}

pub async fn verify_payment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let usecase = VerifyPaymentUseCase {
        tickets: state.ticket_repo(),
        payments: state.payment_repo(),
        gateway: state.gateway.clone(),
    };
    let issued = usecase
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: body.order_id,
                payment_id: body.payment_id,
                signature: body.signature,
                ticket_id: body.ticket_id,
            },
        )
        .await?;
    Ok(Json(VerifyPaymentResponse {
        ticket_id: issued.ticket.id,
        ticket_number: issued.ticket.ticket_number,
        qr_code: issued.ticket.qr_code,
        qr_payload: issued.qr_payload,
        status: issued.ticket.status,
    }))
}

// ── GET /payments/me, GET /payments ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct PaymentListQuery {
    pub user: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

async fn list(
    state: &AppState,
    user_id: Option<Uuid>,
    query: PaymentListQuery,
) -> Result<Paged<PaymentResponse>, ApiError> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let filter = PaymentFilter {
        user_id,
        status: parse_param("status", query.status.as_deref())?,
    };
    let usecase = ListPaymentsUseCase {
        payments: state.payment_repo(),
    };
    let page = usecase.execute(filter, request).await?;
    Ok(Paged::from_page(page, request, PaymentResponse::from))
}

pub async fn my_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PaymentListQuery>,
) -> Result<Json<Paged<PaymentResponse>>, ApiError> {
    Ok(Json(list(&state, Some(auth.id()), query).await?))
}

pub async fn list_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PaymentListQuery>,
) -> Result<Json<Paged<PaymentResponse>>, ApiError> {
    auth.require_admin()?;
    let user = query.user;
    Ok(Json(list(&state, user, query).await?))
}

// ── GET /payments/history ────────────────────────────────────────────────────

pub async fn payment_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Listed<PaymentResponse>>, ApiError> {
    auth.require_admin()?;
    let usecase = PaymentHistoryUseCase {
        payments: state.payment_repo(),
    };
    let payments = usecase.execute().await?;
    Ok(Json(Listed::new(
        payments.into_iter().map(PaymentResponse::from).collect(),
    )))
}

// ── POST /payments/refund ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefundRequest {
    pub ticket_id: Uuid,
    pub amount: i64,
}

#[derive(Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
    pub amount: i64,
    pub status: PaymentStatus,
}

pub async fn refund(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = RefundUseCase {
        tickets: state.ticket_repo(),
        payments: state.payment_repo(),
        gateway: state.gateway.clone(),
    };
    let output = usecase.execute(body.ticket_id, body.amount).await?;
    Ok(Json(RefundResponse {
        refund_id: output.refund_id,
        amount: output.amount,
        status: PaymentStatus::Refunded,
    }))
}
