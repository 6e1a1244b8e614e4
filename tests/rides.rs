use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rideshare::controllers::{Caller, ControllerError, RideController};
use rideshare::models::{CarType, Location, MediaRef, Ride, RideOwner};
use rideshare::requests::RideForm;
use rideshare_core::config::AppConfig;
use rideshare_orm::{ListParams, MemoryStore, Store};
use rideshare_validation::codes;
use serde_json::json;

fn image(name: &str) -> MediaRef {
    MediaRef {
        id: None,
        filename: name.to_string(),
        original: format!("/media/{}", name),
        media_type: "image".to_string(),
    }
}

fn ride(owner: i64, verified: bool, from: &str, to: &str, car_type: CarType, price: f64) -> Ride {
    Ride {
        id: None,
        user_id: owner,
        from_location: Location::point(90.41, 23.81),
        to_location: Location::point(91.87, 24.89),
        from_address: from.to_string(),
        to_address: to.to_string(),
        arrival_time: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
        car_number: format!("DHA-{}", owner),
        car_pic: Some(image("car.webp")),
        other_images: Some(vec![image("a.webp"), image("b.webp")]),
        seats_available: 3,
        price_per_seat: Some(price),
        total_price: None,
        negotiable: Some(false),
        notes: None,
        car_type,
        car_name: "Toyota".to_string(),
        car_model: Some("Axio".to_string()),
        active: true,
        created_at: None,
        updated_at: None,
        user: Some(RideOwner {
            id: owner,
            full_name: format!("Driver {}", owner),
            email: None,
            phone: Some("+8801700000000".to_string()),
            verified,
        }),
    }
}

fn controller() -> (RideController<MemoryStore<Ride>>, Arc<MemoryStore<Ride>>) {
    let store = Arc::new(MemoryStore::with_rows(vec![
        ride(1, true, "Dhaka", "Sylhet", CarType::Sedan, 10.0),
        ride(1, true, "Dhaka", "Chittagong", CarType::Suv, 20.0),
        ride(2, false, "Khulna", "Dhaka", CarType::Minivan, 15.0),
    ]));
    let controller = RideController::new(store.clone(), Arc::new(AppConfig::testing()));
    (controller, store)
}

fn form() -> RideForm {
    RideForm {
        from: Some(r#"{"longitude": "90.41", "latitude": "23.81"}"#.to_string()),
        to: Some(r#"{"longitude": 88.6, "latitude": 24.37}"#.to_string()),
        from_address: Some("Dhaka".to_string()),
        to_address: Some("Rajshahi".to_string()),
        arrival_time: Some("2024-04-01 10:00".to_string()),
        car_number: Some("DHA-99".to_string()),
        car_type: Some("Sedan".to_string()),
        car_name: Some("Honda".to_string()),
        seats_available: Some("2".to_string()),
        price_per_seat: Some("12.5".to_string()),
        ..RideForm::default()
    }
}

#[tokio::test]
async fn test_list_searches_addresses() {
    let (controller, _) = controller();

    let page = controller.list(&ListParams::new().search("dhaka")).await.unwrap();
    assert_eq!(page.total, 3);

    let page = controller.list(&ListParams::new().search("sylhet")).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].to_address, "Sylhet");
}

#[tokio::test]
async fn test_list_price_range_and_car_type() {
    let (controller, _) = controller();

    let params = ListParams::new().number_range("price_per_seat", Some(12.0), Some(25.0));
    let page = controller.list(&params).await.unwrap();
    assert_eq!(page.total, 2);

    let params = params.column_filter("car_type", "suv");
    let page = controller.list(&params).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].car_type, CarType::Suv);
}

#[tokio::test]
async fn test_list_rejects_large_limit() {
    let (controller, _) = controller();

    let err = controller.list(&ListParams::new().limit(500)).await.unwrap_err();
    assert_eq!(err.validation().unwrap().code, codes::LIMIT_OUT_OF_BOUNDS);
    assert_eq!(err.status_code(), 422);
}

#[tokio::test]
async fn test_list_by_user_is_scoped() {
    let (controller, _) = controller();

    let page = controller
        .list_by_user(&Caller::user(2), &ListParams::new())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.data.iter().all(|ride| ride.user_id == 2));

    let page = controller
        .list_by_user(&Caller::user(1), &ListParams::new().search("khulna"))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_create_converts_form() {
    let (controller, store) = controller();
    let mut form = form();
    form.car_pic = Some(image("new.webp"));

    let ride = controller.create(&Caller::user(5), form).await.unwrap();

    assert_eq!(ride.id, Some(4));
    assert_eq!(ride.user_id, 5);
    assert!(ride.active);
    assert_eq!(ride.car_type, CarType::Sedan);
    assert_eq!(ride.seats_available, 2);
    assert_eq!(ride.price_per_seat, Some(12.5));
    assert_eq!(ride.from_location, Location::point(90.41, 23.81));
    assert_eq!(ride.to_location, Location::point(88.6, 24.37));
    assert_eq!(ride.arrival_time, Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap());
    assert_eq!(ride.car_pic, Some(image("new.webp")));
    assert_eq!(ride.other_images, None);
    assert!(ride.created_at.is_some());
    assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn test_create_requires_fields() {
    let (controller, store) = controller();
    let mut form = form();
    form.car_name = None;

    let err = controller.create(&Caller::user(5), form).await.unwrap_err();
    assert_eq!(err.validation().unwrap().field, "car_name");
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_create_rejects_unknown_car_type() {
    let (controller, _) = controller();
    let mut form = form();
    form.car_type = Some("spaceship".to_string());

    let err = controller.create(&Caller::user(5), form).await.unwrap_err();
    assert_eq!(err.validation().unwrap().code, codes::INVALID_CHOICE);
}

#[tokio::test]
async fn test_update_applies_only_submitted_fields() {
    let (controller, store) = controller();
    let form = RideForm {
        to_address: Some("Cox's Bazar".to_string()),
        notes: Some("AC".to_string()),
        ..RideForm::default()
    };

    let ride = controller.update(&Caller::user(1), 1, form).await.unwrap();

    assert_eq!(ride.to_address, "Cox's Bazar");
    assert_eq!(ride.notes.as_deref(), Some("AC"));
    assert_eq!(ride.from_address, "Dhaka");
    assert_eq!(ride.price_per_seat, Some(10.0));
    assert_eq!(ride.car_pic, Some(image("car.webp")));
    assert_eq!(ride.other_images.as_ref().map(Vec::len), Some(2));
    assert!(ride.updated_at.is_some());
    assert_eq!(store.find(1).await.unwrap().unwrap(), ride);
}

#[tokio::test]
async fn test_update_blank_clears_nullable_field() {
    let (controller, _) = controller();
    let form = RideForm {
        price_per_seat: Some("".to_string()),
        ..RideForm::default()
    };

    let ride = controller.update(&Caller::user(1), 2, form).await.unwrap();
    assert_eq!(ride.price_per_seat, None);
}

#[tokio::test]
async fn test_update_blank_required_field_is_rejected() {
    let (controller, store) = controller();
    let form = RideForm {
        car_name: Some("  ".to_string()),
        ..RideForm::default()
    };

    let err = controller.update(&Caller::user(1), 1, form).await.unwrap_err();
    assert_eq!(err.validation().unwrap().code, codes::NOT_NULLABLE);
    assert_eq!(store.find(1).await.unwrap().unwrap().car_name, "Toyota");
}

#[tokio::test]
async fn test_update_deletes_listed_images() {
    let (controller, _) = controller();
    let form = RideForm {
        delete_images: Some(json!("car.webp, a.webp")),
        ..RideForm::default()
    };

    let ride = controller.update(&Caller::user(1), 1, form).await.unwrap();
    assert_eq!(ride.car_pic, None);
    assert_eq!(ride.other_images, Some(vec![image("b.webp")]));
}

#[tokio::test]
async fn test_update_by_other_user_is_forbidden() {
    let (controller, _) = controller();

    let err = controller
        .update(&Caller::user(2), 1, RideForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::Forbidden(_)));

    let err = controller
        .update(&Caller::user(1), 99, RideForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));
}

#[tokio::test]
async fn test_find_requires_verified_owner() {
    let (controller, _) = controller();

    let ride = controller.find(1).await.unwrap();
    assert_eq!(ride.id, Some(1));

    let err = controller.find(3).await.unwrap_err();
    assert!(matches!(err, ControllerError::Rejected(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_delete() {
    let (controller, store) = controller();

    let err = controller.delete(&Caller::user(2), 1).await.unwrap_err();
    assert!(matches!(err, ControllerError::Forbidden(_)));

    controller.delete(&Caller::admin(9), 1).await.unwrap();
    assert!(store.find(1).await.unwrap().is_none());

    let err = controller.delete(&Caller::user(1), 1).await.unwrap_err();
    assert!(matches!(err, ControllerError::NotFound(_)));
}
