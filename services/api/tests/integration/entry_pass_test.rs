use chrono::{Duration, Utc};

use marquee_api::domain::types::Settings;
use marquee_api::error::ApiError;
use marquee_api::usecase::entry_pass::{
    GetMyEntryPassUseCase, PurchaseEntryPassInput, PurchaseEntryPassUseCase,
};
use marquee_domain::user::UserRole;

use crate::helpers::{MockStore, test_pass, test_user};

fn purchase(store: &MockStore) -> PurchaseEntryPassUseCase<MockStore, MockStore> {
    PurchaseEntryPassUseCase {
        passes: store.clone(),
        settings: store.clone(),
    }
}

fn input(head_count: i32, amount: i64, payment_id: &str) -> PurchaseEntryPassInput {
    PurchaseEntryPassInput {
        head_count,
        amount,
        payment_id: payment_id.to_owned(),
        transaction_info: serde_json::json!({ "gateway": "mock" }),
    }
}

#[tokio::test]
async fn should_open_new_pass_with_configured_expiry() {
    let user = test_user(UserRole::Customer);
    let store = MockStore::new().with(|s| {
        s.settings = Some(Settings {
            entry_pass_expiration_days: 7,
            ..Settings::default()
        })
    });

    let before = Utc::now();
    let pass = purchase(&store)
        .execute(user.id, input(4, 40_000, "pay_1"))
        .await
        .unwrap();

    assert_eq!(pass.head_count, 4);
    assert_eq!(pass.amount, 40_000);
    assert!(pass.expires_at >= before + Duration::days(7));
    assert!(pass.expires_at <= Utc::now() + Duration::days(7));
    assert_eq!(store.read(|s| s.passes.len()), 1);
}

#[tokio::test]
async fn should_top_up_usable_pass_and_keep_later_expiry() {
    let user = test_user(UserRole::Customer);
    let far = Utc::now() + Duration::days(90);
    let existing = test_pass(user.id, 2, far);
    let store = MockStore::new().with(|s| s.passes.push(existing.clone()));

    let pass = purchase(&store)
        .execute(user.id, input(3, 5_000, "pay_2"))
        .await
        .unwrap();

    assert_eq!(pass.id, existing.id);
    assert_eq!(pass.head_count, 5);
    assert_eq!(pass.amount, existing.amount + 5_000);
    assert_eq!(pass.payment_id, "pay_2");
    assert_eq!(pass.expires_at, far);
    assert_eq!(store.read(|s| s.passes.len()), 1);
}

#[tokio::test]
async fn should_ignore_expired_pass_when_purchasing() {
    let user = test_user(UserRole::Customer);
    let expired = test_pass(user.id, 9, Utc::now() - Duration::days(1));
    let store = MockStore::new().with(|s| s.passes.push(expired.clone()));

    let pass = purchase(&store)
        .execute(user.id, input(1, 1_000, "pay_3"))
        .await
        .unwrap();

    assert_ne!(pass.id, expired.id);
    assert_eq!(store.read(|s| s.passes.len()), 2);
    let mine = GetMyEntryPassUseCase {
        passes: store.clone(),
    }
    .execute(user.id)
    .await
    .unwrap();
    assert_eq!(mine.map(|p| p.id), Some(pass.id));
}

#[tokio::test]
async fn should_validate_purchase_input() {
    let user = test_user(UserRole::Customer);
    let store = MockStore::new();

    for bad in [input(0, 1_000, "pay"), input(1, 0, "pay"), input(1, 1_000, "")] {
        let result = purchase(&store).execute(user.id, bad).await;
        assert!(
            matches!(result, Err(ApiError::Validation(_))),
            "got {result:?}"
        );
    }
    assert!(store.read(|s| s.passes.is_empty()));
}

#[tokio::test]
async fn should_report_no_pass_for_new_user() {
    let user = test_user(UserRole::Customer);
    let mine = GetMyEntryPassUseCase {
        passes: MockStore::new(),
    }
    .execute(user.id)
    .await
    .unwrap();
    assert!(mine.is_none());
}
