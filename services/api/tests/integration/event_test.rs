use chrono::Duration;

use marquee_api::error::ApiError;
use marquee_api::usecase::event::{DeleteEventUseCase, UpdateEventInput, UpdateEventUseCase};
use marquee_api::usecase::exhibition::{
    CreateExhibitionInput, CreateExhibitionUseCase, UpdateExhibitionInput,
    UpdateExhibitionUseCase,
};
use marquee_domain::ticket::TicketStatus;
use marquee_domain::user::UserRole;

use crate::helpers::{MockStore, test_event, test_exhibition, test_ticket, test_user, test_venue};

fn validation_errors(result: Result<impl std::fmt::Debug, ApiError>) -> Vec<String> {
    match result {
        Err(ApiError::Validation(errors)) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ── UpdateEvent ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_shrink_capacity_below_booked_seats() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let mut booked = test_ticket(user.id, event.id);
    booked.head_count = 4;
    let mut cancelled = test_ticket(user.id, event.id);
    cancelled.head_count = 5;
    cancelled.status = TicketStatus::Cancelled;
    let event_id = event.id;
    let store = MockStore::new().with(|s| {
        s.events.push(event);
        s.tickets.push(booked);
        s.tickets.push(cancelled);
    });
    let usecase = UpdateEventUseCase {
        repo: store.clone(),
    };

    let shrink = |capacity| UpdateEventInput {
        capacity: Some(capacity),
        ..Default::default()
    };
    let errors = validation_errors(usecase.execute(event_id, shrink(3)).await);
    assert_eq!(
        errors,
        vec!["capacity cannot be less than the 4 seats already booked".to_owned()]
    );
    assert_eq!(store.read(|s| s.events[0].capacity), 10);

    // Cancelled seats do not count.
    let event = usecase.execute(event_id, shrink(4)).await.unwrap();
    assert_eq!(event.capacity, 4);
    assert_eq!(store.read(|s| s.events[0].capacity), 4);
}

#[tokio::test]
async fn should_reject_end_before_start_on_update() {
    let event = test_event(1_000, 10);
    let input = UpdateEventInput {
        end_date: Some(event.start_date - Duration::hours(1)),
        ..Default::default()
    };
    let event_id = event.id;
    let store = MockStore::new().with(|s| s.events.push(event));

    let result = UpdateEventUseCase { repo: store }
        .execute(event_id, input)
        .await;
    assert_eq!(
        validation_errors(result),
        vec!["end_date must not be before start_date".to_owned()]
    );
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_to_delete_event_with_tickets() {
    let user = test_user(UserRole::Customer);
    let event = test_event(1_000, 10);
    let mut ticket = test_ticket(user.id, event.id);
    ticket.status = TicketStatus::Cancelled;
    let event_id = event.id;
    let store = MockStore::new().with(|s| {
        s.events.push(event);
        s.tickets.push(ticket);
    });

    let result = DeleteEventUseCase {
        repo: store.clone(),
    }
    .execute(event_id)
    .await;
    assert!(
        matches!(result, Err(ApiError::EventHasTickets)),
        "got {result:?}"
    );
    assert_eq!(store.read(|s| s.events.len()), 1);
}

#[tokio::test]
async fn should_delete_event_without_tickets() {
    let event = test_event(1_000, 10);
    let event_id = event.id;
    let store = MockStore::new().with(|s| s.events.push(event));
    let usecase = DeleteEventUseCase {
        repo: store.clone(),
    };

    usecase.execute(event_id).await.unwrap();
    assert!(store.read(|s| s.events.is_empty()));

    let again = usecase.execute(event_id).await;
    assert!(
        matches!(again, Err(ApiError::EventNotFound)),
        "got {again:?}"
    );
}

// ── Exhibitions ──────────────────────────────────────────────────────────────

fn exhibition_input() -> CreateExhibitionInput {
    let template = test_exhibition();
    CreateExhibitionInput {
        name: template.name,
        description: template.description,
        start_date: template.start_date,
        end_date: template.end_date,
        venue: test_venue(),
        map_layout: None,
        status: None,
    }
}

#[tokio::test]
async fn should_create_exhibition_for_organizer() {
    let admin = test_user(UserRole::Admin);
    let store = MockStore::new();

    let exhibition = CreateExhibitionUseCase {
        repo: store.clone(),
    }
    .execute(admin.id, exhibition_input())
    .await
    .unwrap();
    assert_eq!(exhibition.organizer_id, Some(admin.id));
    assert_eq!(store.read(|s| s.exhibitions.len()), 1);
}

#[tokio::test]
async fn should_reject_exhibition_ending_before_it_starts() {
    let mut input = exhibition_input();
    input.end_date = input.start_date - Duration::days(1);
    let store = MockStore::new();

    let result = CreateExhibitionUseCase {
        repo: store.clone(),
    }
    .execute(uuid::Uuid::now_v7(), input)
    .await;
    assert_eq!(
        validation_errors(result),
        vec!["end_date must not be before start_date".to_owned()]
    );
    assert!(store.read(|s| s.exhibitions.is_empty()));
}

#[tokio::test]
async fn should_list_every_bad_venue_field() {
    let mut input = exhibition_input();
    input.venue.city = "  ".to_owned();
    input.venue.pincode = String::new();
    input.venue.latitude = Some(91.0);
    input.venue.longitude = Some(-181.0);

    let result = CreateExhibitionUseCase {
        repo: MockStore::new(),
    }
    .execute(uuid::Uuid::now_v7(), input)
    .await;
    assert_eq!(
        validation_errors(result),
        vec![
            "venue.city is required".to_owned(),
            "venue.pincode is required".to_owned(),
            "venue.latitude must be between -90 and 90".to_owned(),
            "venue.longitude must be between -180 and 180".to_owned(),
        ]
    );
}

#[tokio::test]
async fn should_validate_replaced_venue_on_update() {
    let exhibition = test_exhibition();
    let id = exhibition.id;
    let store = MockStore::new().with(|s| s.exhibitions.push(exhibition));
    let usecase = UpdateExhibitionUseCase {
        repo: store.clone(),
    };

    let mut venue = test_venue();
    venue.name = String::new();
    let result = usecase
        .execute(
            id,
            UpdateExhibitionInput {
                venue: Some(venue),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(
        validation_errors(result),
        vec!["venue.name is required".to_owned()]
    );
    assert_eq!(
        store.read(|s| s.exhibitions[0].venue.name.clone()),
        "Expo Centre"
    );

    let missing = usecase
        .execute(uuid::Uuid::now_v7(), UpdateExhibitionInput::default())
        .await;
    assert!(
        matches!(missing, Err(ApiError::ExhibitionNotFound)),
        "got {missing:?}"
    );
}
