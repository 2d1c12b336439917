use marquee_api::error::ApiError;
use marquee_api::usecase::user::{
    DeleteUserUseCase, NewUser, SetupAdminUseCase, UpdateUserInput, UpdateUserUseCase,
};
use marquee_domain::user::{UserRole, UserStatus};

use crate::helpers::{MockStore, test_event, test_ticket, test_user};

fn new_admin(email: &str) -> NewUser {
    NewUser {
        name: "Root".to_owned(),
        email: email.to_owned(),
        password: "secret123".to_owned(),
        phone_number: None,
    }
}

// ── SetupAdmin ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_first_admin_only_once() {
    let store = MockStore::new();
    let usecase = SetupAdminUseCase {
        repo: store.clone(),
    };

    let admin = usecase
        .execute(new_admin("Root@Example.com"))
        .await
        .unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(admin.email, "root@example.com");
    assert!(admin.email_verified);

    let second = usecase.execute(new_admin("other@example.com")).await;
    assert!(
        matches!(second, Err(ApiError::AdminAlreadyExists)),
        "got {second:?}"
    );
    assert_eq!(store.read(|s| s.users.len()), 1);
}

#[tokio::test]
async fn should_refuse_setup_when_seeded_admin_exists() {
    let store = MockStore::new().with(|s| s.users.push(test_user(UserRole::Admin)));

    let result = SetupAdminUseCase { repo: store }
        .execute(new_admin("root@example.com"))
        .await;
    assert!(
        matches!(result, Err(ApiError::AdminAlreadyExists)),
        "got {result:?}"
    );
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_let_admin_deactivate_self() {
    let admin = test_user(UserRole::Admin);
    let admin_id = admin.id;
    let store = MockStore::new().with(|s| s.users.push(admin));
    let usecase = UpdateUserUseCase {
        repo: store.clone(),
    };

    let result = usecase
        .execute(
            admin_id,
            admin_id,
            UpdateUserInput {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await;
    assert!(
        matches!(result, Err(ApiError::CannotDeactivateSelf)),
        "got {result:?}"
    );
    assert_eq!(store.read(|s| s.users[0].status), UserStatus::Active);

    // Editing other fields of one's own account is fine.
    let renamed = usecase
        .execute(
            admin_id,
            admin_id,
            UpdateUserInput {
                name: Some(" Root ".to_owned()),
                status: Some(UserStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Root");
}

#[tokio::test]
async fn should_deactivate_another_user() {
    let admin = test_user(UserRole::Admin);
    let customer = test_user(UserRole::Customer);
    let customer_id = customer.id;
    let store = MockStore::new().with(|s| s.users.push(customer));

    let user = UpdateUserUseCase {
        repo: store.clone(),
    }
    .execute(
        admin.id,
        customer_id,
        UpdateUserInput {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(user.status, UserStatus::Inactive);
    assert_eq!(store.read(|s| s.users[0].status), UserStatus::Inactive);
}

#[tokio::test]
async fn should_reject_empty_user_update() {
    let admin = test_user(UserRole::Admin);
    let result = UpdateUserUseCase {
        repo: MockStore::new(),
    }
    .execute(admin.id, uuid::Uuid::now_v7(), UpdateUserInput::default())
    .await;
    assert!(
        matches!(result, Err(ApiError::MissingData)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_email_taken_by_another_user() {
    let admin = test_user(UserRole::Admin);
    let first = test_user(UserRole::Customer);
    let second = test_user(UserRole::Customer);
    let (taken, second_id) = (first.email.clone(), second.id);
    let store = MockStore::new().with(|s| {
        s.users.push(first);
        s.users.push(second);
    });

    let result = UpdateUserUseCase { repo: store }
        .execute(
            admin.id,
            second_id,
            UpdateUserInput {
                email: Some(taken),
                ..Default::default()
            },
        )
        .await;
    assert!(
        matches!(result, Err(ApiError::UserAlreadyExists)),
        "got {result:?}"
    );
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_to_delete_user_with_tickets() {
    let customer = test_user(UserRole::Customer);
    let ticket = test_ticket(customer.id, uuid::Uuid::now_v7());
    let customer_id = customer.id;
    let store = MockStore::new().with(|s| {
        s.users.push(customer);
        s.tickets.push(ticket);
    });

    let result = DeleteUserUseCase {
        repo: store.clone(),
    }
    .execute(customer_id)
    .await;
    assert!(
        matches!(result, Err(ApiError::UserHasRecords)),
        "got {result:?}"
    );
    assert_eq!(
        result.unwrap_err().status(),
        axum::http::StatusCode::CONFLICT
    );
    assert_eq!(store.read(|s| s.users.len()), 1);
}

#[tokio::test]
async fn should_refuse_to_delete_event_organizer() {
    let organizer = test_user(UserRole::Admin);
    let mut event = test_event(1_000, 10);
    event.organizer_id = organizer.id;
    let organizer_id = organizer.id;
    let store = MockStore::new().with(|s| {
        s.users.push(organizer);
        s.events.push(event);
    });

    let result = DeleteUserUseCase { repo: store }
        .execute(organizer_id)
        .await;
    assert!(
        matches!(result, Err(ApiError::UserHasRecords)),
        "got {result:?}"
    );
}

#[tokio::test]
async fn should_delete_user_without_records() {
    let customer = test_user(UserRole::Customer);
    let customer_id = customer.id;
    let store = MockStore::new().with(|s| s.users.push(customer));
    let usecase = DeleteUserUseCase {
        repo: store.clone(),
    };

    usecase.execute(customer_id).await.unwrap();
    assert!(store.read(|s| s.users.is_empty()));

    let again = usecase.execute(customer_id).await;
    assert!(
        matches!(again, Err(ApiError::UserNotFound)),
        "got {again:?}"
    );
}
