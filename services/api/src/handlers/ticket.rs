use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::ticket::{QrPayload, TicketPaymentStatus, TicketStatus};

use crate::domain::types::{Attendee, Ticket, TicketFilter};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody, PathParam, QueryParams};
use crate::handlers::{PageQuery, Paged, parse_param};
use crate::state::AppState;
use crate::usecase::ticket::{
    BookTicketInput, BookTicketUseCase, CancelTicketUseCase, GetTicketUseCase, IssuedTicket,
    ListTicketsUseCase, MarkAttendedUseCase, SetTicketStatusUseCase, VerifyQrCodeUseCase,
    VerifyTicketUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_number: String,
    pub qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_payload: Option<QrPayload>,
    pub purchased_by: Uuid,
    pub issued_by: Uuid,
    pub event_id: Uuid,
    pub show_id: Option<Uuid>,
    pub head_count: i32,
    pub attendees: Vec<Attendee>,
    pub total_amount: i64,
    pub payment_status: TicketPaymentStatus,
    pub payment_id: Option<Uuid>,
    pub entry_pass_id: Option<Uuid>,
    pub status: TicketStatus,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub purchase_date: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms_opt")]
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms_opt")]
    pub attended_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "marquee_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            qr_code: t.qr_code,
            qr_payload: None,
            purchased_by: t.purchased_by,
            issued_by: t.issued_by,
            event_id: t.event_id,
            show_id: t.show_id,
            head_count: t.head_count,
            attendees: t.attendees,
            total_amount: t.total_amount,
            payment_status: t.payment_status,
            payment_id: t.payment_id,
            entry_pass_id: t.entry_pass_id,
            status: t.status,
            purchase_date: t.purchase_date,
            verified_at: t.verified_at,
            verified_by: t.verified_by,
            attended_at: t.attended_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<IssuedTicket> for TicketResponse {
    fn from(issued: IssuedTicket) -> Self {
        Self {
            qr_payload: issued.qr_payload,
            ..issued.ticket.into()
        }
    }
}

// ── Shared with /admin ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub event: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TicketListQuery {
    fn page_request(&self) -> marquee_domain::pagination::PageRequest {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
        .request()
    }

    fn filter(&self) -> Result<TicketFilter, ApiError> {
        Ok(TicketFilter {
            purchased_by: None,
            event_id: self.event,
            status: parse_param("status", self.status.as_deref())?,
            payment_status: parse_param("payment_status", self.payment_status.as_deref())?,
        })
    }
}

pub(crate) async fn list(
    state: &AppState,
    filter: TicketFilter,
    query: &TicketListQuery,
) -> Result<Paged<TicketResponse>, ApiError> {
    let request = query.page_request();
    let usecase = ListTicketsUseCase {
        tickets: state.ticket_repo(),
    };
    let page = usecase.execute(filter, request).await?;
    Ok(Paged::from_page(page, request, TicketResponse::from))
}

/// Admin listing for `?status=&payment_status=&event=`, optionally narrowed to
/// one purchaser or one event.
pub(crate) async fn list_filtered(
    state: &AppState,
    query: TicketListQuery,
    purchased_by: Option<Uuid>,
    event_id: Option<Uuid>,
) -> Result<Paged<TicketResponse>, ApiError> {
    let mut filter = query.filter()?;
    filter.purchased_by = purchased_by;
    if event_id.is_some() {
        filter.event_id = event_id;
    }
    list(state, filter, &query).await
}

pub(crate) async fn get(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<TicketResponse, ApiError> {
    let usecase = GetTicketUseCase {
        tickets: state.ticket_repo(),
    };
    Ok(usecase.execute(&user.0, id).await?.into())
}

// ── POST /tickets/book ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BookTicketRequest {
    pub event_id: Uuid,
    pub show_id: Option<Uuid>,
    pub head_count: i32,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub use_entry_pass: bool,
}

pub async fn book_ticket(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BookTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let usecase = BookTicketUseCase {
        tickets: state.ticket_repo(),
        events: state.event_repo(),
        passes: state.entry_pass_repo(),
    };
    let issued = usecase
        .execute(
            &user,
            BookTicketInput {
                event_id: body.event_id,
                show_id: body.show_id,
                head_count: body.head_count,
                attendees: body.attendees,
                use_entry_pass: body.use_entry_pass,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(issued.into())))
}

// ── GET /tickets/me ──────────────────────────────────────────────────────────

pub async fn my_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TicketListQuery>,
) -> Result<Json<Paged<TicketResponse>>, ApiError> {
    let filter = TicketFilter {
        purchased_by: Some(auth.id()),
        status: parse_param("status", query.status.as_deref())?,
        ..TicketFilter::default()
    };
    Ok(Json(list(&state, filter, &query).await?))
}

// ── GET /tickets ─────────────────────────────────────────────────────────────

pub async fn list_tickets(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TicketListQuery>,
) -> Result<Json<Paged<TicketResponse>>, ApiError> {
    auth.require_admin()?;
    Ok(Json(list_filtered(&state, query, None, None).await?))
}

// ── GET /tickets/{id} ────────────────────────────────────────────────────────

pub async fn get_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    Ok(Json(get(&state, &auth, id).await?))
}

// ── POST /tickets/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyTicketRequest {
    #[serde(default)]
    pub qr_data: String,
}

#[derive(Serialize)]
pub struct VerifyTicketResponse {
    pub ticket: TicketResponse,
    pub can_be_used: bool,
    pub status_message: String,
}

pub async fn verify_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyTicketRequest>,
) -> Result<Json<VerifyTicketResponse>, ApiError> {
    auth.require_staff()?;
    let usecase = VerifyTicketUseCase {
        tickets: state.ticket_repo(),
    };
    let verification = usecase.execute(&body.qr_data).await?;
    Ok(Json(VerifyTicketResponse {
        ticket: verification.ticket.into(),
        can_be_used: verification.can_be_used,
        status_message: verification.status_message,
    }))
}

// ── POST /tickets/verify-qr ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyQrRequest {
    #[serde(default)]
    pub qr_code: String,
}

pub async fn verify_qr(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyQrRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    auth.require_staff()?;
    let usecase = VerifyQrCodeUseCase {
        tickets: state.ticket_repo(),
    };
    Ok(Json(usecase.execute(&body.qr_code).await?.into()))
}

// ── POST /tickets/mark-attended ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MarkAttendedRequest {
    pub ticket_id: Uuid,
}

pub async fn mark_attended(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<MarkAttendedRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    auth.require_staff()?;
    let usecase = MarkAttendedUseCase {
        tickets: state.ticket_repo(),
    };
    Ok(Json(usecase.execute(auth.id(), body.ticket_id).await?.into()))
}

// ── PUT /tickets/{id}/status ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TicketStatusRequest {
    pub status: TicketStatus,
}

pub async fn set_ticket_status(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<TicketStatusRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = SetTicketStatusUseCase {
        tickets: state.ticket_repo(),
    };
    Ok(Json(usecase.execute(id, body.status).await?.into()))
}

// ── PUT /tickets/{id}/cancel ─────────────────────────────────────────────────

pub async fn cancel_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    auth.require_admin()?;
    let usecase = CancelTicketUseCase {
        tickets: state.ticket_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}
