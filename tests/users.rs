use std::sync::Arc;

use rideshare::controllers::{Caller, ControllerError, UserController};
use rideshare::models::{User, UserStatus};
use rideshare::requests::ProfileForm;
use rideshare_orm::{MemoryStore, Store};

fn user() -> User {
    User {
        id: Some(1),
        email: "rahim@example.com".to_string(),
        email_verified: true,
        full_name: "Rahim".to_string(),
        cnic: None,
        address: Some("Dhanmondi".to_string()),
        image: None,
        status: UserStatus::Active,
        is_root: false,
        is_active: true,
        role_id: None,
        password: "$argon2id$hash".to_string(),
        country: "Bangladesh".to_string(),
        country_code: "BD".to_string(),
        currency_code: "BDT".to_string(),
        currency_symbol: "৳".to_string(),
        phone: Some("+8801711111111".to_string()),
        unverified_phone: None,
        verified: true,
        created_at: None,
        updated_at: None,
    }
}

fn controller() -> (UserController<MemoryStore<User>>, Arc<MemoryStore<User>>) {
    let store = Arc::new(MemoryStore::with_rows(vec![user()]));
    (UserController::new(store.clone()), store)
}

#[tokio::test]
async fn test_profile_update_keeps_untouched_fields() {
    let (controller, store) = controller();
    let form = ProfileForm {
        full_name: Some("Rahim Uddin".to_string()),
        address: Some("".to_string()),
        ..ProfileForm::default()
    };

    let read = controller.update_profile(&Caller::user(1), form).await.unwrap();

    assert_eq!(read.full_name, "Rahim Uddin");
    assert_eq!(read.address, None);
    assert_eq!(read.email, "rahim@example.com");
    assert!(read.verified);
    assert!(read.email_verified);

    let stored = store.find(1).await.unwrap().unwrap();
    assert_eq!(stored.password, "$argon2id$hash");
    assert!(stored.updated_at.is_some());
}

#[tokio::test]
async fn test_new_phone_waits_for_verification() {
    let (controller, store) = controller();
    let form = ProfileForm {
        phone: Some("+8801722222222".to_string()),
        ..ProfileForm::default()
    };

    let read = controller.update_profile(&Caller::user(1), form).await.unwrap();

    assert_eq!(read.phone.as_deref(), Some("+8801711111111"));
    assert_eq!(read.unverified_phone.as_deref(), Some("+8801722222222"));
    assert!(!read.verified);
    assert!(!store.find(1).await.unwrap().unwrap().verified);
}

#[tokio::test]
async fn test_same_phone_keeps_verification() {
    let (controller, _) = controller();
    let form = ProfileForm {
        phone: Some("+8801711111111".to_string()),
        ..ProfileForm::default()
    };

    let read = controller.update_profile(&Caller::user(1), form).await.unwrap();
    assert!(read.verified);
    assert_eq!(read.unverified_phone, None);
}

#[tokio::test]
async fn test_new_email_resets_email_verification() {
    let (controller, _) = controller();
    let form = ProfileForm {
        email: Some("rahim@new.example.com".to_string()),
        ..ProfileForm::default()
    };

    let read = controller.update_profile(&Caller::user(1), form).await.unwrap();
    assert_eq!(read.email, "rahim@new.example.com");
    assert!(!read.email_verified);
    assert!(read.verified);
}

#[tokio::test]
async fn test_blank_required_field_is_rejected() {
    let (controller, store) = controller();
    let form = ProfileForm {
        full_name: Some(" ".to_string()),
        ..ProfileForm::default()
    };

    let err = controller.update_profile(&Caller::user(1), form).await.unwrap_err();
    assert_eq!(err.validation().unwrap().field, "full_name");
    assert_eq!(store.find(1).await.unwrap().unwrap().full_name, "Rahim");
}

#[tokio::test]
async fn test_find() {
    let (controller, _) = controller();

    let read = controller.find(1).await.unwrap();
    assert_eq!(read.id, 1);

    let err = controller.find(2).await.unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));
}
