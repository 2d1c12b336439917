use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use marquee_api::domain::repository::{
    EntryPassRepository, EventRepository, ExhibitionRepository, PaymentRepository,
    RatingRepository, SettingsRepository, TicketRepository, UserRepository,
};
use marquee_api::domain::types::{
    EntryPass, Event, EventFilter, Exhibition, OutboxEvent, Payment, PaymentFilter, Rating,
    RatingFilter, Settings, Show, Ticket, TicketFilter, TicketState, User, Venue,
};
use marquee_api::error::ApiError;
use marquee_domain::entry_pass::EntryPassStatus;
use marquee_domain::event::{EventStatus, ExhibitionStatus};
use marquee_domain::pagination::{Page, PageRequest};
use marquee_domain::payment::PaymentStatus;
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};
use marquee_domain::user::{UserRole, UserStatus};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_PAYMENT_SECRET: &str = "test-payment-secret";

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(role: UserRole) -> User {
    let now = Utc::now();
    let id = Uuid::now_v7();
    User {
        id,
        name: "Test User".to_owned(),
        email: format!("{id}@example.com"),
        phone_number: None,
        password_hash: String::new(),
        role,
        status: UserStatus::Active,
        email_verified: true,
        email_verification_token_hash: None,
        email_verification_expires_at: None,
        reset_password_token_hash: None,
        reset_password_expires_at: None,
        qr_code: format!("USER-{}", id.simple()),
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_event(price: i64, capacity: i32) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::now_v7(),
        title: "Rust Meetup".to_owned(),
        description: "Talks and pizza".to_owned(),
        start_date: now + Duration::days(7),
        end_date: now + Duration::days(7) + Duration::hours(3),
        venue: "Hall A".to_owned(),
        category_id: None,
        exhibition_id: None,
        price,
        capacity,
        status: EventStatus::Published,
        image: None,
        gallery: vec![],
        tags: vec![],
        features: vec![],
        terms: None,
        organizer_id: Uuid::now_v7(),
        average_rating: 0.0,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_venue() -> Venue {
    Venue {
        name: "Expo Centre".to_owned(),
        address: "1 Fair Road".to_owned(),
        city: "Pune".to_owned(),
        state: "Maharashtra".to_owned(),
        pincode: "411001".to_owned(),
        latitude: Some(18.52),
        longitude: Some(73.85),
    }
}

pub fn test_exhibition() -> Exhibition {
    let now = Utc::now();
    Exhibition {
        id: Uuid::now_v7(),
        name: "Spring Fair".to_owned(),
        description: "Stalls and talks".to_owned(),
        start_date: now + Duration::days(30),
        end_date: now + Duration::days(32),
        venue: test_venue(),
        map_layout: None,
        organizer_id: None,
        status: ExhibitionStatus::Upcoming,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_show(event_id: Uuid, seat_capacity: i32, seats_booked: i32) -> Show {
    let now = Utc::now();
    Show {
        id: Uuid::now_v7(),
        event_id,
        starts_at: now + Duration::days(7),
        ends_at: now + Duration::days(7) + Duration::hours(2),
        seat_capacity,
        seats_booked,
        created_at: now,
    }
}

pub fn test_pass(user_id: Uuid, head_count: i32, expires_at: DateTime<Utc>) -> EntryPass {
    let now = Utc::now();
    EntryPass {
        id: Uuid::now_v7(),
        user_id,
        head_count,
        amount: 100_000,
        payment_id: "pay_initial".to_owned(),
        transaction_info: serde_json::json!({}),
        purchased_at: now,
        expires_at,
        status: EntryPassStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_ticket(user_id: Uuid, event_id: Uuid) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: Uuid::now_v7(),
        ticket_number: "TIX-000001-ABCDEF".to_owned(),
        qr_code: None,
        purchased_by: user_id,
        issued_by: user_id,
        event_id,
        show_id: None,
        head_count: 1,
        attendees: vec![],
        total_amount: 50_000,
        payment_status: TicketPaymentStatus::Pending,
        payment_id: None,
        entry_pass_id: None,
        status: TicketStatus::Active,
        purchase_date: now,
        verified_at: None,
        verified_by: None,
        attended_at: None,
        created_at: now,
        updated_at: now,
    }
}

// ── Interleaved writers ──────────────────────────────────────────────────────

/// Tickets whose every read is followed by another request's write, landing
/// before the caller gets to write back.
#[derive(Clone)]
pub struct Interleaved {
    pub store: MockStore,
    pub meanwhile: fn(&mut Store, Uuid),
}

impl TicketRepository for Interleaved {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        let found = TicketRepository::find_by_id(&self.store, id).await?;
        (self.meanwhile)(&mut self.store.inner.lock().unwrap(), id);
        Ok(found)
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Ticket>, ApiError> {
        self.store.find_by_qr_code(qr_code).await
    }

    async fn list(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, ApiError> {
        TicketRepository::list(&self.store, filter, page).await
    }

    async fn book(&self, ticket: &Ticket, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        self.store.book(ticket, outbox).await
    }

    async fn update(&self, ticket: &Ticket, expected: TicketState) -> Result<bool, ApiError> {
        TicketRepository::update(&self.store, ticket, expected).await
    }

    async fn update_releasing_seats(
        &self,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError> {
        self.store.update_releasing_seats(ticket, expected).await
    }
}

/// Another staff member admits the ticket.
pub fn admit_elsewhere(store: &mut Store, id: Uuid) {
    if let Some(t) = store.tickets.iter_mut().find(|t| t.id == id) {
        t.status = TicketStatus::Used;
    }
}

/// An admin cancels the ticket and its show seats go back.
pub fn cancel_elsewhere(store: &mut Store, id: Uuid) {
    let Some(t) = store.tickets.iter_mut().find(|t| t.id == id) else {
        return;
    };
    if t.status == TicketStatus::Cancelled {
        return;
    }
    t.status = TicketStatus::Cancelled;
    let (show_id, seats) = (t.show_id, t.head_count);
    if let Some(show) = store.shows.iter_mut().find(|s| Some(s.id) == show_id) {
        show.seats_booked = (show.seats_booked - seats).max(0);
    }
}

/// Another verification of the same order lands first.
pub fn pay_elsewhere(store: &mut Store, id: Uuid) {
    if let Some(t) = store.tickets.iter_mut().find(|t| t.id == id) {
        t.payment_status = TicketPaymentStatus::Completed;
        t.qr_code = Some("issued-by-first-verifier".to_owned());
    }
}

// ── MockStore ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Store {
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub exhibitions: Vec<Exhibition>,
    pub shows: Vec<Show>,
    pub tickets: Vec<Ticket>,
    pub passes: Vec<EntryPass>,
    pub payments: Vec<Payment>,
    pub ratings: Vec<Rating>,
    pub settings: Option<Settings>,
    pub outbox: Vec<OutboxEvent>,
}

impl Store {
    /// Rows whose foreign keys block deleting the user.
    fn references_user(&self, id: Uuid) -> bool {
        self.tickets.iter().any(|t| t.purchased_by == id)
            || self.payments.iter().any(|p| p.user_id == id)
            || self.events.iter().any(|e| e.organizer_id == id)
    }
}

/// In-memory stand-in for every repository. Clones share one store, so a
/// booking made through the ticket repo is visible to the event repo.
#[derive(Clone, Default)]
pub struct MockStore {
    pub inner: Arc<Mutex<Store>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, f: impl FnOnce(&mut Store)) -> Self {
        f(&mut self.inner.lock().unwrap());
        self
    }

    pub fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        f(&self.inner.lock().unwrap())
    }
}

fn paged<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(items, total)
}

fn seats_taken(store: &Store, event_id: Uuid) -> i64 {
    store
        .tickets
        .iter()
        .filter(|t| t.event_id == event_id && t.status.holds_seats())
        .map(|t| i64::from(t.head_count))
        .sum()
}

fn replace<T: Clone>(items: &mut [T], item: &T, same: impl Fn(&T) -> bool) {
    if let Some(slot) = items.iter_mut().find(|i| same(i)) {
        *slot = item.clone();
    }
}

/// Replace the stored ticket only while it still holds `expected`.
fn write_ticket(store: &mut Store, ticket: &Ticket, expected: TicketState) -> bool {
    match store.tickets.iter_mut().find(|t| t.id == ticket.id) {
        Some(slot) if slot.state() == expected => {
            *slot = ticket.clone();
            true
        }
        _ => false,
    }
}

fn release(store: &mut Store, ticket: &Ticket) {
    if let Some(show_id) = ticket.show_id {
        if let Some(show) = store.shows.iter_mut().find(|s| s.id == show_id) {
            show.seats_booked = (show.seats_booked - ticket.head_count).max(0);
        }
    }
}

impl UserRepository for MockStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.read(|s| s.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.read(|s| s.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_by_verification_token(&self, token_hash: &str) -> Result<Option<User>, ApiError> {
        Ok(self.read(|s| {
            s.users
                .iter()
                .find(|u| u.email_verification_token_hash.as_deref() == Some(token_hash))
                .cloned()
        }))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, ApiError> {
        Ok(self.read(|s| {
            s.users
                .iter()
                .find(|u| u.reset_password_token_hash.as_deref() == Some(token_hash))
                .cloned()
        }))
    }

    async fn admin_exists(&self) -> Result<bool, ApiError> {
        Ok(self.read(|s| s.users.iter().any(|u| u.role == UserRole::Admin)))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        Ok(paged(self.read(|s| s.users.clone()), page))
    }

    async fn create(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::UserAlreadyExists);
        }
        store.users.push(user.clone());
        store.outbox.extend(outbox.cloned());
        Ok(())
    }

    async fn update(&self, user: &User, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        replace(&mut store.users, user, |u| u.id == user.id);
        store.outbox.extend(outbox.cloned());
        Ok(())
    }

    async fn has_records(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.read(|s| s.references_user(id)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store.references_user(id) {
            return Err(ApiError::UserHasRecords);
        }
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        Ok(store.users.len() < before)
    }
}

impl EventRepository for MockStore {
    async fn list(&self, filter: EventFilter, page: PageRequest) -> Result<Page<Event>, ApiError> {
        let events = self.read(|s| {
            s.events
                .iter()
                .filter(|e| filter.status.is_none_or(|st| e.status == st))
                .filter(|e| filter.exhibition_id.is_none_or(|x| e.exhibition_id == Some(x)))
                .cloned()
                .collect()
        });
        Ok(paged(events, page))
    }

    async fn list_by_exhibition(&self, exhibition_id: Uuid) -> Result<Vec<Event>, ApiError> {
        Ok(self.read(|s| {
            s.events
                .iter()
                .filter(|e| e.exhibition_id == Some(exhibition_id))
                .cloned()
                .collect()
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError> {
        Ok(self.read(|s| s.events.iter().find(|e| e.id == id).cloned()))
    }

    async fn create(&self, event: &Event) -> Result<(), ApiError> {
        self.inner.lock().unwrap().events.push(event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), ApiError> {
        replace(&mut self.inner.lock().unwrap().events, event, |e| e.id == event.id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let before = store.events.len();
        store.events.retain(|e| e.id != id);
        Ok(store.events.len() < before)
    }

    async fn count_tickets(&self, event_id: Uuid) -> Result<u64, ApiError> {
        Ok(self.read(|s| s.tickets.iter().filter(|t| t.event_id == event_id).count() as u64))
    }

    async fn seats_taken(&self, event_id: Uuid) -> Result<i64, ApiError> {
        Ok(self.read(|s| seats_taken(s, event_id)))
    }

    async fn list_shows(&self, event_id: Uuid) -> Result<Vec<Show>, ApiError> {
        Ok(self.read(|s| s.shows.iter().filter(|sh| sh.event_id == event_id).cloned().collect()))
    }

    async fn find_show(&self, show_id: Uuid) -> Result<Option<Show>, ApiError> {
        Ok(self.read(|s| s.shows.iter().find(|sh| sh.id == show_id).cloned()))
    }

    async fn create_show(&self, show: &Show) -> Result<(), ApiError> {
        self.inner.lock().unwrap().shows.push(show.clone());
        Ok(())
    }
}

impl ExhibitionRepository for MockStore {
    async fn list(
        &self,
        status: Option<ExhibitionStatus>,
        page: PageRequest,
    ) -> Result<Page<Exhibition>, ApiError> {
        let exhibitions = self.read(|s| {
            s.exhibitions
                .iter()
                .filter(|x| status.is_none_or(|st| x.status == st))
                .cloned()
                .collect()
        });
        Ok(paged(exhibitions, page))
    }

    async fn list_starting_after(&self, now: DateTime<Utc>) -> Result<Vec<Exhibition>, ApiError> {
        Ok(self.read(|s| {
            s.exhibitions
                .iter()
                .filter(|x| x.start_date > now)
                .cloned()
                .collect()
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Exhibition>, ApiError> {
        Ok(self.read(|s| s.exhibitions.iter().find(|x| x.id == id).cloned()))
    }

    async fn create(&self, exhibition: &Exhibition) -> Result<(), ApiError> {
        self.inner
            .lock()
            .unwrap()
            .exhibitions
            .push(exhibition.clone());
        Ok(())
    }

    async fn update(&self, exhibition: &Exhibition) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        replace(&mut store.exhibitions, exhibition, |x| x.id == exhibition.id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let before = store.exhibitions.len();
        store.exhibitions.retain(|x| x.id != id);
        Ok(store.exhibitions.len() < before)
    }
}

impl TicketRepository for MockStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        Ok(self.read(|s| s.tickets.iter().find(|t| t.id == id).cloned()))
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Ticket>, ApiError> {
        Ok(self.read(|s| {
            s.tickets
                .iter()
                .find(|t| t.qr_code.as_deref() == Some(qr_code))
                .cloned()
        }))
    }

    async fn list(
        &self,
        filter: TicketFilter,
        page: PageRequest,
    ) -> Result<Page<Ticket>, ApiError> {
        let tickets = self.read(|s| {
            s.tickets
                .iter()
                .filter(|t| filter.purchased_by.is_none_or(|u| t.purchased_by == u))
                .filter(|t| filter.event_id.is_none_or(|e| t.event_id == e))
                .filter(|t| filter.status.is_none_or(|st| t.status == st))
                .filter(|t| filter.payment_status.is_none_or(|p| t.payment_status == p))
                .cloned()
                .collect()
        });
        Ok(paged(tickets, page))
    }

    async fn book(&self, ticket: &Ticket, outbox: Option<&OutboxEvent>) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        match ticket.show_id {
            Some(show_id) => {
                let show = store
                    .shows
                    .iter()
                    .find(|s| s.id == show_id)
                    .ok_or(ApiError::ShowNotFound)?;
                if show.seats_booked + ticket.head_count > show.seat_capacity {
                    return Err(ApiError::SoldOut);
                }
            }
            None => {
                let capacity = store
                    .events
                    .iter()
                    .find(|e| e.id == ticket.event_id)
                    .map(|e| i64::from(e.capacity))
                    .ok_or(ApiError::EventNotFound)?;
                if seats_taken(&store, ticket.event_id) + i64::from(ticket.head_count) > capacity {
                    return Err(ApiError::SoldOut);
                }
            }
        }
        if let Some(pass_id) = ticket.entry_pass_id {
            let pass = store
                .passes
                .iter()
                .find(|p| p.id == pass_id)
                .ok_or(ApiError::InsufficientPassCredit)?;
            if pass.head_count < ticket.head_count {
                return Err(ApiError::InsufficientPassCredit);
            }
        }

        if let Some(show_id) = ticket.show_id {
            if let Some(show) = store.shows.iter_mut().find(|s| s.id == show_id) {
                show.seats_booked += ticket.head_count;
            }
        }
        if let Some(pass_id) = ticket.entry_pass_id {
            if let Some(pass) = store.passes.iter_mut().find(|p| p.id == pass_id) {
                pass.head_count -= ticket.head_count;
            }
        }
        store.tickets.push(ticket.clone());
        store.outbox.extend(outbox.cloned());
        Ok(())
    }

    async fn update(&self, ticket: &Ticket, expected: TicketState) -> Result<bool, ApiError> {
        Ok(write_ticket(&mut self.inner.lock().unwrap(), ticket, expected))
    }

    async fn update_releasing_seats(
        &self,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if !write_ticket(&mut store, ticket, expected) {
            return Ok(false);
        }
        release(&mut store, ticket);
        Ok(true)
    }
}

impl PaymentRepository for MockStore {
    async fn create(&self, payment: &Payment) -> Result<(), ApiError> {
        self.inner.lock().unwrap().payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, ApiError> {
        Ok(self.read(|s| {
            s.payments
                .iter()
                .find(|p| p.gateway_order_id == order_id)
                .cloned()
        }))
    }

    async fn find_completed_for_ticket(
        &self,
        ticket_id: Uuid,
    ) -> Result<Option<Payment>, ApiError> {
        Ok(self.read(|s| {
            s.payments
                .iter()
                .find(|p| p.ticket_id == ticket_id && p.status == PaymentStatus::Completed)
                .cloned()
        }))
    }

    async fn list(
        &self,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, ApiError> {
        let payments = self.read(|s| {
            s.payments
                .iter()
                .filter(|p| filter.user_id.is_none_or(|u| p.user_id == u))
                .filter(|p| filter.status.is_none_or(|st| p.status == st))
                .cloned()
                .collect()
        });
        Ok(paged(payments, page))
    }

    async fn list_all(&self) -> Result<Vec<Payment>, ApiError> {
        Ok(self.read(|s| s.payments.clone()))
    }

    async fn record_failure(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
    ) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if !write_ticket(&mut store, ticket, expected) {
            return Ok(false);
        }
        replace(&mut store.payments, payment, |p| p.id == payment.id);
        Ok(true)
    }

    async fn complete(
        &self,
        payment: &Payment,
        ticket: &Ticket,
        expected: TicketState,
        outbox: &OutboxEvent,
    ) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        if !write_ticket(&mut store, ticket, expected) {
            return Ok(false);
        }
        replace(&mut store.payments, payment, |p| p.id == payment.id);
        store.outbox.push(outbox.clone());
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
        let mut store = self.inner.lock().unwrap();
        if !write_ticket(&mut store, ticket, expected) {
            return Ok(false);
        }
        replace(&mut store.payments, payment, |p| p.id == payment.id);
        if release_seats {
            release(&mut store, ticket);
        }
        store.outbox.push(outbox.clone());
        Ok(true)
    }
}

impl EntryPassRepository for MockStore {
    async fn find_usable(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<EntryPass>, ApiError> {
        Ok(self.read(|s| {
            s.passes
                .iter()
                .filter(|p| p.user_id == user_id && p.is_usable(now))
                .max_by_key(|p| p.expires_at)
                .cloned()
        }))
    }

    async fn create(&self, pass: &EntryPass) -> Result<(), ApiError> {
        self.inner.lock().unwrap().passes.push(pass.clone());
        Ok(())
    }

    async fn update(&self, pass: &EntryPass) -> Result<(), ApiError> {
        replace(&mut self.inner.lock().unwrap().passes, pass, |p| p.id == pass.id);
        Ok(())
    }
}

impl RatingRepository for MockStore {
    async fn list(
        &self,
        filter: RatingFilter,
        page: PageRequest,
    ) -> Result<Page<Rating>, ApiError> {
        let ratings = self.read(|s| {
            s.ratings
                .iter()
                .filter(|r| filter.event_id.is_none_or(|e| r.event_id == e))
                .filter(|r| filter.user_id.is_none_or(|u| r.user_id == u))
                .filter(|r| filter.min_rating.is_none_or(|m| r.rating >= m))
                .cloned()
                .collect()
        });
        Ok(paged(ratings, page))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, ApiError> {
        Ok(self.read(|s| s.ratings.iter().find(|r| r.id == id).cloned()))
    }

    async fn find_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Rating>, ApiError> {
        Ok(self.read(|s| {
            s.ratings
                .iter()
                .find(|r| r.user_id == user_id && r.event_id == event_id)
                .cloned()
        }))
    }

    async fn create(&self, rating: &Rating) -> Result<(), ApiError> {
        let mut store = self.inner.lock().unwrap();
        if store
            .ratings
            .iter()
            .any(|r| r.user_id == rating.user_id && r.event_id == rating.event_id)
        {
            return Err(ApiError::AlreadyRated);
        }
        store.ratings.push(rating.clone());
        Ok(())
    }

    async fn update(&self, rating: &Rating) -> Result<(), ApiError> {
        replace(&mut self.inner.lock().unwrap().ratings, rating, |r| r.id == rating.id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let before = store.ratings.len();
        store.ratings.retain(|r| r.id != id);
        Ok(store.ratings.len() < before)
    }

    async fn refresh_average(&self, event_id: Uuid) -> Result<f64, ApiError> {
        let mut store = self.inner.lock().unwrap();
        let values: Vec<f64> = store
            .ratings
            .iter()
            .filter(|r| r.event_id == event_id)
            .map(|r| f64::from(r.rating))
            .collect();
        let average = if values.is_empty() {
            0.0
        } else {
            (values.iter().sum::<f64>() / values.len() as f64 * 10.0).round() / 10.0
        };
        if let Some(event) = store.events.iter_mut().find(|e| e.id == event_id) {
            event.average_rating = average;
        }
        Ok(average)
    }

    async fn has_attended(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, ApiError> {
        Ok(self.read(|s| {
            s.tickets.iter().any(|t| {
                t.purchased_by == user_id
                    && t.event_id == event_id
                    && matches!(t.status, TicketStatus::Active | TicketStatus::Used)
                    && t.verified_at.is_some()
            })
        }))
    }
}

impl SettingsRepository for MockStore {
    async fn get(&self) -> Result<Option<Settings>, ApiError> {
        Ok(self.read(|s| s.settings.clone()))
    }

    async fn upsert(&self, settings: &Settings) -> Result<(), ApiError> {
        self.inner.lock().unwrap().settings = Some(settings.clone());
        Ok(())
    }
}
