use marquee_api::domain::types::outbox_kind;
use marquee_api::error::ApiError;
use marquee_api::infra::gateway::MockPaymentGateway;
use marquee_api::usecase::payment::{
    CreateOrderUseCase, RefundUseCase, VerifyPaymentInput, VerifyPaymentUseCase,
};
use marquee_domain::payment::{PaymentMethod, PaymentStatus};
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};
use marquee_domain::user::UserRole;

use crate::helpers::{
    Interleaved, MockStore, TEST_PAYMENT_SECRET, cancel_elsewhere, pay_elsewhere, test_show,
    test_ticket, test_user,
};

fn gateway() -> MockPaymentGateway {
    MockPaymentGateway::new(TEST_PAYMENT_SECRET)
}

fn create_order(store: &MockStore) -> CreateOrderUseCase<MockStore, MockStore, MockPaymentGateway> {
    CreateOrderUseCase {
        tickets: store.clone(),
        payments: store.clone(),
        gateway: gateway(),
    }
}

fn verify(store: &MockStore) -> VerifyPaymentUseCase<MockStore, MockStore, MockPaymentGateway> {
    VerifyPaymentUseCase {
        tickets: store.clone(),
        payments: store.clone(),
        gateway: gateway(),
    }
}

#[tokio::test]
async fn should_complete_payment_with_mock_credentials() {
    let user = test_user(UserRole::Customer);
    let ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    let store = MockStore::new().with(|s| {
        s.users.push(user.clone());
        s.tickets.push(ticket.clone());
    });

    let order = create_order(&store)
        .execute(&user, ticket.id, Some(PaymentMethod::Upi))
        .await
        .unwrap();
    assert!(order.order.order_id.starts_with("mock_order_"));
    assert_eq!(order.payment.amount, ticket.total_amount);
    assert_eq!(order.payment.status, PaymentStatus::Initiated);

    let issued = verify(&store)
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id.clone(),
                payment_id: order.order.payment_id.clone(),
                signature: order.order.signature.clone(),
                ticket_id: ticket.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(issued.ticket.payment_status, TicketPaymentStatus::Completed);
    assert_eq!(issued.ticket.status, TicketStatus::Active);
    let payload = issued.qr_payload.expect("qr payload");
    assert_eq!(payload.ticket_id, ticket.id.to_string());
    store.read(|s| {
        assert_eq!(s.payments[0].status, PaymentStatus::Completed);
        assert_eq!(
            s.payments[0].gateway_payment_id.as_deref(),
            Some(order.order.payment_id.as_str())
        );
        assert_eq!(
            s.tickets[0].qr_code.as_deref(),
            Some(payload.qr_code.as_str())
        );
        assert_eq!(s.outbox[0].kind, outbox_kind::TICKET_CONFIRMED);
    });

    let again = create_order(&store).execute(&user, ticket.id, None).await;
    assert!(matches!(again, Err(ApiError::AlreadyPaid)), "got {again:?}");
}

#[tokio::test]
async fn should_record_failure_on_bad_signature() {
    let user = test_user(UserRole::Customer);
    let ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));

    let order = create_order(&store)
        .execute(&user, ticket.id, None)
        .await
        .unwrap();
    let result = verify(&store)
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id.clone(),
                payment_id: order.order.payment_id.clone(),
                signature: "00".repeat(32),
                ticket_id: ticket.id,
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::InvalidSignature)),
        "got {result:?}"
    );
    store.read(|s| {
        assert_eq!(s.payments[0].status, PaymentStatus::Failed);
        assert_eq!(s.tickets[0].payment_status, TicketPaymentStatus::Failed);
        assert!(s.tickets[0].qr_code.is_none());
    });

    // A failed ticket may be paid again.
    assert!(create_order(&store).execute(&user, ticket.id, None).await.is_ok());
}

#[tokio::test]
async fn should_forbid_paying_someone_elses_ticket() {
    let owner = test_user(UserRole::Customer);
    let other = test_user(UserRole::Customer);
    let ticket = test_ticket(owner.id, uuid::Uuid::now_v7());
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));

    let result = create_order(&store).execute(&other, ticket.id, None).await;
    assert!(matches!(result, Err(ApiError::Forbidden)), "got {result:?}");
}

#[tokio::test]
async fn should_reject_order_of_another_ticket() {
    let user = test_user(UserRole::Customer);
    let first = test_ticket(user.id, uuid::Uuid::now_v7());
    let second = test_ticket(user.id, uuid::Uuid::now_v7());
    let store = MockStore::new().with(|s| {
        s.tickets.push(first.clone());
        s.tickets.push(second.clone());
    });

    let order = create_order(&store)
        .execute(&user, first.id, None)
        .await
        .unwrap();
    let result = verify(&store)
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id,
                payment_id: order.order.payment_id,
                signature: order.order.signature,
                ticket_id: second.id,
            },
        )
        .await;
    assert!(
        matches!(result, Err(ApiError::PaymentNotFound)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_keep_first_confirmation_when_verifications_race() {
    let user = test_user(UserRole::Customer);
    let ticket = test_ticket(user.id, uuid::Uuid::now_v7());
    let store = MockStore::new().with(|s| s.tickets.push(ticket.clone()));
    let order = create_order(&store)
        .execute(&user, ticket.id, None)
        .await
        .unwrap();

    let racing = VerifyPaymentUseCase {
        tickets: Interleaved {
            store: store.clone(),
            meanwhile: pay_elsewhere,
        },
        payments: store.clone(),
        gateway: gateway(),
    };
    let result = racing
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id,
                payment_id: order.order.payment_id,
                signature: order.order.signature,
                ticket_id: ticket.id,
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::AlreadyPaid)),
        "got {result:?}"
    );
    store.read(|s| {
        assert_eq!(
            s.tickets[0].qr_code.as_deref(),
            Some("issued-by-first-verifier")
        );
        assert_eq!(s.payments[0].status, PaymentStatus::Initiated);
        assert!(s.outbox.is_empty());
    });
}

// ── RefundUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refund_paid_ticket_and_release_seats() {
    let user = test_user(UserRole::Customer);
    let event_id = uuid::Uuid::now_v7();
    let show = test_show(event_id, 10, 2);
    let mut ticket = test_ticket(user.id, event_id);
    ticket.show_id = Some(show.id);
    ticket.head_count = 2;
    let store = MockStore::new().with(|s| {
        s.shows.push(show);
        s.tickets.push(ticket.clone());
    });

    let order = create_order(&store)
        .execute(&user, ticket.id, None)
        .await
        .unwrap();
    verify(&store)
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id,
                payment_id: order.order.payment_id,
                signature: order.order.signature,
                ticket_id: ticket.id,
            },
        )
        .await
        .unwrap();

    let refund = RefundUseCase {
        tickets: store.clone(),
        payments: store.clone(),
        gateway: gateway(),
    };
    let too_much = refund.execute(ticket.id, ticket.total_amount + 1).await;
    assert!(
        matches!(too_much, Err(ApiError::Validation(_))),
        "got {too_much:?}"
    );

    let output = refund.execute(ticket.id, 20_000).await.unwrap();
    assert!(output.refund_id.starts_with("mock_refund_"));
    assert_eq!(output.amount, 20_000);
    store.read(|s| {
        assert_eq!(s.tickets[0].status, TicketStatus::Refunded);
        assert_eq!(s.tickets[0].payment_status, TicketPaymentStatus::Refunded);
        assert_eq!(s.payments[0].status, PaymentStatus::Refunded);
        assert_eq!(s.payments[0].refund_amount, Some(20_000));
        assert_eq!(s.shows[0].seats_booked, 0);
        assert!(s.outbox.iter().any(|e| e.kind == outbox_kind::REFUND_PROCESSED));
    });

    let twice = refund.execute(ticket.id, 1).await;
    assert!(
        matches!(twice, Err(ApiError::PaymentNotFound)),
        "got {twice:?}"
    );
}

#[tokio::test]
async fn should_not_release_seats_twice_when_refund_races_cancel() {
    let user = test_user(UserRole::Customer);
    let event_id = uuid::Uuid::now_v7();
    // Three seats belong to other tickets.
    let show = test_show(event_id, 10, 5);
    let mut ticket = test_ticket(user.id, event_id);
    ticket.show_id = Some(show.id);
    ticket.head_count = 2;
    let store = MockStore::new().with(|s| {
        s.shows.push(show);
        s.tickets.push(ticket.clone());
    });
    let order = create_order(&store)
        .execute(&user, ticket.id, None)
        .await
        .unwrap();
    verify(&store)
        .execute(
            &user,
            VerifyPaymentInput {
                order_id: order.order.order_id,
                payment_id: order.order.payment_id,
                signature: order.order.signature,
                ticket_id: ticket.id,
            },
        )
        .await
        .unwrap();

    let racing = RefundUseCase {
        tickets: Interleaved {
            store: store.clone(),
            meanwhile: cancel_elsewhere,
        },
        payments: store.clone(),
        gateway: gateway(),
    };
    let result = racing.execute(ticket.id, 10_000).await;

    assert!(
        matches!(result, Err(ApiError::TicketChanged)),
        "got {result:?}"
    );
    store.read(|s| {
        assert_eq!(s.tickets[0].status, TicketStatus::Cancelled);
        assert_eq!(s.shows[0].seats_booked, 3);
        assert_eq!(s.payments[0].status, PaymentStatus::Completed);
        assert!(!s.outbox.iter().any(|e| e.kind == outbox_kind::REFUND_PROCESSED));
    });

    // A retry sees the cancellation and leaves the seats alone.
    let refund = RefundUseCase {
        tickets: store.clone(),
        payments: store.clone(),
        gateway: gateway(),
    };
    refund.execute(ticket.id, 10_000).await.unwrap();
    store.read(|s| {
        assert_eq!(s.tickets[0].status, TicketStatus::Refunded);
        assert_eq!(s.shows[0].seats_booked, 3);
    });
}
