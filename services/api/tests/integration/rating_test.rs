use chrono::Utc;

use marquee_api::error::ApiError;
use marquee_api::usecase::rating::{CreateRatingUseCase, DeleteRatingUseCase, UpdateRatingUseCase};
use marquee_domain::ticket::{TicketPaymentStatus, TicketStatus};
use marquee_domain::user::UserRole;

use crate::helpers::{MockStore, test_event, test_ticket, test_user};

fn create(store: &MockStore) -> CreateRatingUseCase<MockStore, MockStore> {
    CreateRatingUseCase {
        ratings: store.clone(),
        events: store.clone(),
    }
}

/// A store with one event the user attended.
fn attended_setup() -> (MockStore, marquee_api::domain::types::User, uuid::Uuid) {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let mut ticket = test_ticket(user.id, event.id);
    ticket.payment_status = TicketPaymentStatus::Completed;
    ticket.status = TicketStatus::Used;
    ticket.verified_at = Some(Utc::now());
    let event_id = event.id;
    let store = MockStore::new().with(|s| {
        s.events.push(event);
        s.tickets.push(ticket);
    });
    (store, user, event_id)
}

#[tokio::test]
async fn should_rate_attended_event_and_refresh_average() {
    let (store, user, event_id) = attended_setup();

    let rating = create(&store)
        .execute(&user, event_id, 4, Some("Great".to_owned()))
        .await
        .unwrap();
    assert_eq!(rating.rating, 4);

    let admin = test_user(UserRole::Admin);
    create(&store)
        .execute(&admin, event_id, 5, None)
        .await
        .unwrap();
    assert_eq!(store.read(|s| s.events[0].average_rating), 4.5);
}

#[tokio::test]
async fn should_require_attendance_for_customers() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let unverified = test_ticket(user.id, event.id);
    let event_id = event.id;
    let store = MockStore::new().with(|s| {
        s.events.push(event);
        s.tickets.push(unverified);
    });

    let result = create(&store).execute(&user, event_id, 5, None).await;
    assert!(
        matches!(result, Err(ApiError::NotAttended)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_second_rating_and_out_of_range_values() {
    let (store, user, event_id) = attended_setup();
    create(&store)
        .execute(&user, event_id, 3, None)
        .await
        .unwrap();

    let duplicate = create(&store).execute(&user, event_id, 2, None).await;
    assert!(
        matches!(duplicate, Err(ApiError::AlreadyRated)),
        "got {duplicate:?}"
    );

    let zero = create(&store).execute(&user, event_id, 0, None).await;
    assert!(matches!(zero, Err(ApiError::Validation(_))), "got {zero:?}");
}

#[tokio::test]
async fn should_404_for_unknown_event() {
    let user = test_user(UserRole::Admin);
    let result = create(&MockStore::new())
        .execute(&user, uuid::Uuid::now_v7(), 3, None)
        .await;
    assert!(
        matches!(result, Err(ApiError::EventNotFound)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_let_only_owner_or_admin_edit() {
    let (store, user, event_id) = attended_setup();
    let rating = create(&store)
        .execute(&user, event_id, 2, None)
        .await
        .unwrap();
    let update = UpdateRatingUseCase {
        ratings: store.clone(),
    };

    let stranger = test_user(UserRole::Customer);
    let result = update.execute(&stranger, rating.id, Some(5), None).await;
    assert!(matches!(result, Err(ApiError::Forbidden)), "got {result:?}");

    let empty = update.execute(&user, rating.id, None, None).await;
    assert!(matches!(empty, Err(ApiError::MissingData)), "got {empty:?}");

    let admin = test_user(UserRole::Admin);
    let updated = update
        .execute(&admin, rating.id, Some(5), None)
        .await
        .unwrap();
    assert_eq!(updated.rating, 5);
    assert_eq!(store.read(|s| s.events[0].average_rating), 5.0);
}

#[tokio::test]
async fn should_reset_average_when_last_rating_is_deleted() {
    let (store, user, event_id) = attended_setup();
    let rating = create(&store)
        .execute(&user, event_id, 4, None)
        .await
        .unwrap();

    DeleteRatingUseCase {
        ratings: store.clone(),
    }
    .execute(&user, rating.id)
    .await
    .unwrap();

    store.read(|s| {
        assert!(s.ratings.is_empty());
        assert_eq!(s.events[0].average_rating, 0.0);
    });
}
