use chrono::{DateTime, TimeZone, Utc};
use rideshare_core::config::ListingConfig;
use rideshare_orm::{
    compile, list, EntitySchema, FieldDef, FilterSpec, ListParams, MemoryStore, Model, ModelError,
    OrderDirection, Page, Pager, PredicateHook, RawParam, Reconciler, Relation, SearchFields, Store,
    UpdateField, UpdatePayload,
};
use rideshare_validation::codes;
use serde::{Deserialize, Serialize};

const DRIVER_FIELDS: &[FieldDef] = &[FieldDef::integer("id"), FieldDef::text("full_name")];

static TRIPS: EntitySchema = EntitySchema {
    table: "trips",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::text("name"),
        FieldDef::float("price").nullable(),
        FieldDef::datetime("departs_at").nullable(),
        FieldDef::integer("driver_id").read_only(),
    ],
    relations: &[Relation {
        name: "driver",
        table: "users",
        local_key: "driver_id",
        foreign_key: "id",
        fields: DRIVER_FIELDS,
    }],
    search_fields: &["name", "driver.full_name"],
    default_order: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Driver {
    id: i64,
    full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Trip {
    id: Option<i64>,
    name: String,
    price: Option<f64>,
    departs_at: Option<DateTime<Utc>>,
    driver_id: i64,
    #[serde(default)]
    driver: Option<Driver>,
}

impl Model for Trip {
    fn schema() -> &'static EntitySchema {
        &TRIPS
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

fn trip(name: &str, price: Option<f64>, day: u32, driver: (i64, &str)) -> Trip {
    Trip {
        id: None,
        name: name.to_string(),
        price,
        departs_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap()),
        driver_id: driver.0,
        driver: Some(Driver {
            id: driver.0,
            full_name: driver.1.to_string(),
        }),
    }
}

fn store() -> MemoryStore<Trip> {
    MemoryStore::with_rows(vec![
        trip("Dhaka to Sylhet", Some(10.0), 1, (1, "Rahim Uddin")),
        trip("Dhaka to Chittagong", Some(20.0), 2, (2, "Karim Ahmed")),
        trip("Sylhet to Dhaka", Some(35.0), 3, (1, "Rahim Uddin")),
        trip("Khulna to Dhaka", None, 4, (3, "Nusrat Jahan")),
        trip("Rajshahi to Bogura", Some(15.0), 5, (2, "Karim Ahmed")),
    ])
}

async fn run(store: &MemoryStore<Trip>, params: ListParams) -> Result<Page<Trip>, ModelError> {
    list(
        store,
        &params,
        &ListingConfig::default(),
        |spec| spec,
        &SearchFields::of::<Trip>(),
        &[],
        &(),
    )
    .await
}

fn names(page: &Page<Trip>) -> Vec<&str> {
    page.data.iter().map(|trip| trip.name.as_str()).collect()
}

#[tokio::test]
async fn test_number_range_selects_matching_rows() {
    let store = MemoryStore::with_rows(vec![
        trip("A", Some(10.0), 1, (1, "Rahim Uddin")),
        trip("B", Some(20.0), 2, (1, "Rahim Uddin")),
    ]);
    let page = run(&store, ListParams::new().number_range("price", Some(15.0), Some(25.0)))
        .await
        .unwrap();

    assert_eq!(names(&page), ["B"]);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_limit_out_of_bounds_is_rejected() {
    let err = run(&store(), ListParams::new().limit(500)).await.unwrap_err();
    let err = err.validation().cloned().unwrap();
    assert_eq!(err.message, "limit out of bounds");
    assert_eq!(err.code, codes::LIMIT_OUT_OF_BOUNDS);
}

#[tokio::test]
async fn test_unknown_filter_field_is_rejected() {
    let err = run(&store(), ListParams::new().column_filter("nonexistent", "x"))
        .await
        .unwrap_err();
    let err = err.validation().cloned().unwrap();
    assert_eq!(err.message, "unknown filter field");
    assert_eq!(err.field, "nonexistent");
}

#[tokio::test]
async fn test_unknown_field_is_rejected_on_empty_store() {
    let empty = MemoryStore::<Trip>::new();
    let err = run(&empty, ListParams::new().column_filter("nonexistent", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.validation().map(|e| e.code.as_str()), Some(codes::UNKNOWN_FILTER_FIELD));
}

#[tokio::test]
async fn test_empty_request_is_full_scan() {
    let store = store();
    let page = run(&store, ListParams::new().limit(200)).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.data, store.all().await);
}

#[tokio::test]
async fn test_pages_concatenate_to_full_scan() {
    let store = store();
    let full = run(&store, ListParams::new().limit(200)).await.unwrap();

    let mut collected = Vec::new();
    for page in 1..=3 {
        let result = run(&store, ListParams::new().page(page).limit(2)).await.unwrap();
        assert_eq!(result.total, 5);
        assert!(result.len() <= 2);
        collected.extend(result.data);
    }
    assert_eq!(collected, full.data);
}

#[tokio::test]
async fn test_page_past_the_end_keeps_total() {
    let page = run(&store(), ListParams::new().skip(50)).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_huge_page_is_empty_not_overflow() {
    let page = run(&store(), ListParams::new().page(i64::MAX).limit(200)).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_search_matches_own_and_related_fields() {
    let page = run(&store(), ListParams::new().search("SYLHET")).await.unwrap();
    assert_eq!(names(&page), ["Dhaka to Sylhet", "Sylhet to Dhaka"]);

    let page = run(&store(), ListParams::new().search("karim")).await.unwrap();
    assert_eq!(names(&page), ["Dhaka to Chittagong", "Rajshahi to Bogura"]);
}

#[tokio::test]
async fn test_filters_are_conjunctive() {
    let params = ListParams::new()
        .search("dhaka")
        .column_filter("driver.full_name", "rahim")
        .number_range("price", Some(20.0), None);
    let page = run(&store(), params).await.unwrap();
    assert_eq!(names(&page), ["Sylhet to Dhaka"]);
}

#[tokio::test]
async fn test_date_range_is_inclusive() {
    let params = ListParams::new().date_range("departs_at", Some("02-03-2024"), Some("2024-03-04T08:00:00Z"));
    let page = run(&store(), params).await.unwrap();
    assert_eq!(
        names(&page),
        ["Dhaka to Chittagong", "Sylhet to Dhaka", "Khulna to Dhaka"]
    );
}

#[tokio::test]
async fn test_encoded_query_string_parameters() {
    let params = ListParams {
        column_filters: Some(RawParam::Encoded(r#"[["name","to dhaka"]]"#.to_string())),
        number_range: Some(RawParam::Encoded(r#"["price", null, 40]"#.to_string())),
        ..ListParams::default()
    };
    let page = run(&store(), params).await.unwrap();
    assert_eq!(names(&page), ["Sylhet to Dhaka"]);
}

#[tokio::test]
async fn test_malformed_encoded_filters_survive_builder_additions() {
    let params = ListParams {
        column_filters: Some(RawParam::Encoded("not json".to_string())),
        ..ListParams::default()
    }
    .column_filter("name", "dhaka");

    let err = run(&store(), params).await.unwrap_err();
    let err = err.validation().cloned().unwrap();
    assert_eq!(err.code, codes::MALFORMED_FILTER);
    assert_eq!(err.field, "columnFilters");
}

#[tokio::test]
async fn test_scope_and_hooks_narrow_results() {
    let store = store();
    let hooks = vec![PredicateHook::<Trip, f64>::new("cheaper than", |query, max| {
        query.where_lt("price", *max)
    })];
    let page = list(
        &store,
        &ListParams::new(),
        &ListingConfig::default(),
        |spec| spec.scoped_to("driver_id", 2),
        &SearchFields::none(),
        &hooks,
        &18.0,
    )
    .await
    .unwrap();
    assert_eq!(names(&page), ["Rajshahi to Bogura"]);
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_ordering_puts_nulls_last_ascending() {
    let spec = FilterSpec {
        limit: 200,
        ..FilterSpec::default()
    };
    let hooks = vec![PredicateHook::<Trip>::new("by price", |query, _| query.order_by("price"))];
    let compiled = compile(&spec, &SearchFields::none(), &hooks, &()).unwrap();
    let page = Pager::fetch(&store(), &compiled).await.unwrap();
    assert_eq!(page.data.last().map(|trip| trip.name.as_str()), Some("Khulna to Dhaka"));
    assert_eq!(page.data[0].price, Some(10.0));

    let hooks = vec![PredicateHook::<Trip>::new("by price", |query, _| {
        query.order_by_direction("price", OrderDirection::Desc)
    })];
    let compiled = compile(&spec, &SearchFields::none(), &hooks, &()).unwrap();
    let page = Pager::fetch(&store(), &compiled).await.unwrap();
    assert_eq!(page.data[0].name, "Khulna to Dhaka");
    assert_eq!(page.data[1].price, Some(35.0));
}

#[tokio::test]
async fn test_reconcile_then_save() {
    let store = store();
    let mut entity = store.find_or_fail(1).await.unwrap();
    let payload = UpdatePayload::new()
        .with("name", UpdateField::of("new"))
        .with("price", UpdateField::Absent);

    let outcome = Reconciler::reconcile(&mut entity, &payload).unwrap();
    assert_eq!(outcome.changed, vec!["name".to_string()]);
    store.save(&entity).await.unwrap();

    let stored = store.find_or_fail(1).await.unwrap();
    assert_eq!(stored.name, "new");
    assert_eq!(stored.price, Some(10.0));
}

#[tokio::test]
async fn test_store_writes() {
    let store = MemoryStore::<Trip>::new();
    let created = store.insert(trip("A", None, 1, (1, "Rahim Uddin"))).await.unwrap();
    assert_eq!(created.id, Some(1));

    let duplicate = store.insert(created.clone()).await.unwrap_err();
    assert!(matches!(duplicate, ModelError::Database(_)));

    let mut missing = created.clone();
    missing.id = Some(99);
    assert!(store.save(&missing).await.unwrap_err().is_not_found());

    assert!(store.delete(1).await.unwrap());
    assert!(!store.delete(1).await.unwrap());
    assert!(store.is_empty().await);
}
