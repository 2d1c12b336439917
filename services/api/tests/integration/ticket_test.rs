use chrono::{Duration, Utc};
use uuid::Uuid;

use marquee_api::domain::types::{Attendee, outbox_kind};
use marquee_api::error::ApiError;
use marquee_api::usecase::ticket::{
    BookTicketInput, BookTicketUseCase, CancelTicketUseCase, MarkAttendedUseCase,
    VerifyTicketUseCase,
};
use marquee_domain::event::EventStatus;
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};
use marquee_domain::user::UserRole;

use crate::helpers::{
    Interleaved, MockStore, admit_elsewhere, cancel_elsewhere, test_event, test_pass, test_show,
    test_ticket, test_user,
};

fn booking(store: &MockStore) -> BookTicketUseCase<MockStore, MockStore, MockStore> {
    BookTicketUseCase {
        tickets: store.clone(),
        events: store.clone(),
        passes: store.clone(),
    }
}

fn input(event_id: uuid::Uuid, head_count: i32) -> BookTicketInput {
    BookTicketInput {
        event_id,
        show_id: None,
        head_count,
        attendees: vec![],
        use_entry_pass: false,
    }
}

// ── BookTicketUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_book_pending_ticket_priced_per_head() {
    let user = test_user(UserRole::Customer);
    let event = test_event(25_000, 10);
    let store = MockStore::new().with(|s| s.events.push(event.clone()));

    let issued = booking(&store)
        .execute(&user, input(event.id, 3))
        .await
        .unwrap();

    assert_eq!(issued.ticket.total_amount, 75_000);
    assert_eq!(issued.ticket.payment_status, TicketPaymentStatus::Pending);
    assert_eq!(issued.ticket.status, TicketStatus::Active);
    assert!(issued.ticket.qr_code.is_none());
    assert!(issued.qr_payload.is_none());
    assert!(issued.ticket.ticket_number.starts_with("TIX-"));
    assert_eq!(store.read(|s| s.tickets.len()), 1);
    assert!(store.read(|s| s.outbox.is_empty()));
}

#[tokio::test]
async fn should_reject_booking_past_event_capacity() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 4);
    let mut held = test_ticket(user.id, event.id);
    held.head_count = 3;
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.tickets.push(held);
    });

    let result = booking(&store).execute(&user, input(event.id, 2)).await;
    assert!(matches!(result, Err(ApiError::SoldOut)), "got {result:?}");
}

#[tokio::test]
async fn should_ignore_cancelled_tickets_when_counting_capacity() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 4);
    let mut cancelled = test_ticket(user.id, event.id);
    cancelled.head_count = 4;
    cancelled.status = TicketStatus::Cancelled;
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.tickets.push(cancelled);
    });

    assert!(booking(&store).execute(&user, input(event.id, 4)).await.is_ok());
}

#[tokio::test]
async fn should_reserve_show_seats_and_sell_out() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 100);
    let show = test_show(event.id, 5, 3);
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.shows.push(show.clone());
    });

    let mut two = input(event.id, 2);
    two.show_id = Some(show.id);
    booking(&store).execute(&user, two).await.unwrap();
    assert_eq!(store.read(|s| s.shows[0].seats_booked), 5);

    let mut one = input(event.id, 1);
    one.show_id = Some(show.id);
    let result = booking(&store).execute(&user, one).await;
    assert!(matches!(result, Err(ApiError::SoldOut)), "got {result:?}");
}

#[tokio::test]
async fn should_reject_show_of_another_event() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let other = test_event(1_000, 10);
    let show = test_show(other.id, 5, 0);
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.events.push(other);
        s.shows.push(show.clone());
    });

    let mut req = input(event.id, 1);
    req.show_id = Some(show.id);
    let result = booking(&store).execute(&user, req).await;
    assert!(
        matches!(result, Err(ApiError::ShowNotFound)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unpublished_event() {
    let user = test_user(UserRole::Customer);
    let mut event = test_event(1_000, 10);
    event.status = EventStatus::Draft;
    let store = MockStore::new().with(|s| s.events.push(event.clone()));

    let result = booking(&store).execute(&user, input(event.id, 1)).await;
    assert!(
        matches!(result, Err(ApiError::EventNotBookable)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_require_one_attendee_per_head() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let store = MockStore::new().with(|s| s.events.push(event.clone()));

    let mut req = input(event.id, 2);
    req.attendees = vec![Attendee {
        name: "Ada".to_owned(),
        email: None,
        phone_number: None,
        age: None,
    }];
    let result = booking(&store).execute(&user, req).await;
    assert!(
        matches!(result, Err(ApiError::Validation(_))),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_book_with_entry_pass_and_issue_qr_immediately() {
    let user = test_user(UserRole::Customer);
    let event = test_event(25_000, 10);
    let pass = test_pass(user.id, 5, Utc::now() + Duration::days(10));
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.passes.push(pass.clone());
    });

    let mut req = input(event.id, 2);
    req.use_entry_pass = true;
    let issued = booking(&store).execute(&user, req).await.unwrap();

    assert_eq!(issued.ticket.total_amount, 0);
    assert_eq!(issued.ticket.payment_status, TicketPaymentStatus::Completed);
    assert_eq!(issued.ticket.entry_pass_id, Some(pass.id));
    let payload = issued.qr_payload.expect("qr payload");
    assert_eq!(
        issued.ticket.qr_code.as_deref(),
        Some(payload.qr_code.as_str())
    );
    assert_eq!(payload.qr_code.len(), 64);
    assert_eq!(store.read(|s| s.passes[0].head_count), 3);
    assert_eq!(
        store.read(|s| s.outbox.iter().map(|e| e.kind.clone()).collect::<Vec<_>>()),
        vec![outbox_kind::TICKET_CONFIRMED.to_owned()]
    );
}

#[tokio::test]
async fn should_reject_pass_booking_without_enough_credit() {
    let user = test_user(UserRole::Customer);
    let event = test_event(25_000, 10);
    let expired = test_pass(user.id, 10, Utc::now() - Duration::days(1));
    let small = test_pass(user.id, 1, Utc::now() + Duration::days(1));
    let store = MockStore::new().with(|s| {
        s.events.push(event.clone());
        s.passes.push(expired);
        s.passes.push(small);
    });

    let mut req = input(event.id, 2);
    req.use_entry_pass = true;
    let result = booking(&store).execute(&user, req).await;
    assert!(
        matches!(result, Err(ApiError::InsufficientPassCredit)),
        "got {result:?}"
    );
    assert!(store.read(|s| s.tickets.is_empty()));
}

// ── VerifyTicketUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_unpaid_ticket_as_unusable() {
    let user = test_user(UserRole::Customer);
    let mut ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    ticket.qr_code = Some("a".repeat(64));
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));

    let usecase = VerifyTicketUseCase {
        tickets: store.clone(),
    };
    let verification = usecase.execute(&"a".repeat(64)).await.unwrap();

    assert!(!verification.can_be_used);
    assert_eq!(verification.status_message, "Payment status: pending");
    assert_eq!(verification.ticket.id, ticket.id);
}

#[tokio::test]
async fn should_accept_json_payload_for_paid_ticket() {
    let user = test_user(UserRole::Customer);
    let mut ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    ticket.qr_code = Some("b".repeat(64));
    ticket.payment_status = TicketPaymentStatus::Completed;
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));

    let qr_data = serde_json::json!({
        "ticketId": ticket.id.to_string(),
        "ticketNumber": ticket.ticket_number,
        "qrCode": "b".repeat(64),
        "timestamp": 1,
    })
    .to_string();
    let usecase = VerifyTicketUseCase {
        tickets: store.clone(),
    };
    let verification = usecase.execute(&qr_data).await.unwrap();

    assert!(verification.can_be_used);
    assert_eq!(verification.status_message, "Ticket is valid");
    assert_eq!(store.read(|s| s.tickets[0].status), TicketStatus::Active);
}

#[tokio::test]
async fn should_not_verify_payload_without_code() {
    let user = test_user(UserRole::Customer);
    let mut ticket = test_ticket(user.id, Uuid::now_v7());
    ticket.qr_code = Some("c".repeat(64));
    ticket.payment_status = TicketPaymentStatus::Completed;
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));

    let qr_data = serde_json::json!({ "ticketId": ticket.id.to_string() }).to_string();
    let usecase = VerifyTicketUseCase { tickets: store };
    let result = usecase.execute(&qr_data).await;

    assert!(matches!(result, Err(ApiError::InvalidQr)), "got {result:?}");
}

#[tokio::test]
async fn should_reject_unknown_qr_data() {
    let usecase = VerifyTicketUseCase {
        tickets: MockStore::new(),
    };
    let result = usecase.execute("no-such-code").await;
    assert!(matches!(result, Err(ApiError::InvalidQr)), "got {result:?}");
}

// ── MarkAttendedUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_mark_paid_ticket_attended_once() {
    let user = test_user(UserRole::Customer);
    let staff = test_user(UserRole::Staff);
    let mut ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    ticket.payment_status = TicketPaymentStatus::Completed;
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));
    let usecase = MarkAttendedUseCase {
        tickets: store.clone(),
    };

    let attended = usecase.execute(staff.id, ticket.id).await.unwrap();
    assert_eq!(attended.status, TicketStatus::Used);
    assert_eq!(attended.verified_by, Some(staff.id));
    assert!(attended.verified_at.is_some());
    assert!(attended.attended_at.is_some());

    let again = usecase.execute(staff.id, ticket.id).await;
    assert!(
        matches!(again, Err(ApiError::TicketNotUsable(ref m)) if m == "Ticket status: used"),
        "got {again:?}"
    );
}

#[tokio::test]
async fn should_admit_ticket_only_once_under_concurrent_scans() {
    let user = test_user(UserRole::Customer);
    let staff = test_user(UserRole::Staff);
    let mut ticket = test_ticket(user.id, Uuid::now_v7());
    ticket.payment_status = TicketPaymentStatus::Completed;
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));
    let usecase = MarkAttendedUseCase {
        tickets: Interleaved {
            store: store.clone(),
            meanwhile: admit_elsewhere,
        },
    };

    let result = usecase.execute(staff.id, ticket.id).await;

    assert!(
        matches!(result, Err(ApiError::TicketNotUsable(ref m)) if m == "Ticket status: used"),
        "got {result:?}"
    );
    // The losing scan left the winner's row alone.
    assert_eq!(store.read(|s| s.tickets[0].verified_by), None);
}

// ── CancelTicketUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_release_show_seats_on_cancel() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let show = test_show(event.id, 10, 3);
    let mut ticket = test_ticket(user.id, event.id);
    ticket.show_id = Some(show.id);
    ticket.head_count = 3;
    let store = MockStore::new().with(|s| {
        s.shows.push(show);
        s.tickets.push(ticket.clone());
    });
    let usecase = CancelTicketUseCase {
        tickets: store.clone(),
    };

    let cancelled = usecase.execute(ticket.id).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);
    assert_eq!(store.read(|s| s.shows[0].seats_booked), 0);

    let again = usecase.execute(ticket.id).await;
    assert!(
        matches!(again, Err(ApiError::InvalidTransition(_))),
        "got {again:?}"
    );
    assert_eq!(store.read(|s| s.shows[0].seats_booked), 0);
}

#[tokio::test]
async fn should_release_seats_once_when_cancels_race() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let show = test_show(event.id, 10, 5);
    let mut ticket = test_ticket(user.id, event.id);
    ticket.show_id = Some(show.id);
    ticket.head_count = 2;
    let store = MockStore::new().with(|s| {
        s.shows.push(show);
        s.tickets.push(ticket.clone());
    });
    let usecase = CancelTicketUseCase {
        tickets: Interleaved {
            store: store.clone(),
            meanwhile: cancel_elsewhere,
        },
    };

    let result = usecase.execute(ticket.id).await;

    assert!(
        matches!(result, Err(ApiError::InvalidTransition(_))),
        "got {result:?}"
    );
    assert_eq!(store.read(|s| s.shows[0].seats_booked), 3);
}
