//! Integration tests for the plot service layer.
//!
//! Exercises list/get/create/update/delete against a real PostgreSQL
//! database. Each test creates an isolated temporary database.

use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use plotkeeper_core::plot::service::{
    BLOCK_NOT_FOUND, CUSTOMER_NOT_FOUND, DELETE_TARGET_MISSING, DUPLICATE_PLOT_NUMBER,
    NO_PLOT_FOUND, PLOT_ID_REQUIRED, UPDATE_TARGET_MISSING,
};
use plotkeeper_core::plot::{self, PlotError, PlotInput, input};
use plotkeeper_db::models::{AreaUnit, PlotCategory, PlotType};
use plotkeeper_db::queries::plots as plot_queries;
use plotkeeper_test_utils::{create_test_db, drop_test_db, seed_block, seed_customer};

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn body(value: Value) -> PlotInput {
    serde_json::from_value(value).expect("body should deserialize")
}

fn plot_body(block_id: Uuid, plot_number: &str) -> Value {
    json!({
        "blockId": block_id.to_string(),
        "plot_number": plot_number,
        "plot_type": "house",
        "area_unit": "marla",
        "area": 5,
        "category": "residential",
    })
}

async fn plot_count(pool: &PgPool) -> usize {
    plot_queries::list_plots(pool).await.unwrap().len()
}

fn assert_bad_request(err: PlotError, expected: &str) {
    match err {
        PlotError::BadRequest(msg) => assert_eq!(msg, expected),
        other => panic!("expected BadRequest({expected:?}), got {other:?}"),
    }
}

fn assert_conflict(err: PlotError, expected: &str) {
    match err {
        PlotError::Conflict(msg) => assert_eq!(msg, expected),
        other => panic!("expected Conflict({expected:?}), got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_then_list_populates_block() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let created = plot::create(&pool, &body(plot_body(block.id, "P-100")))
        .await
        .expect("create should succeed");
    assert_eq!(created.message, "New Plot with P-100 created");
    let data = created.data.expect("created plot should be returned");
    assert_eq!(data.plot_number, "P-100");
    assert_eq!(data.block_id, block.id);
    assert_eq!(data.plot_type, PlotType::House);
    assert_eq!(data.area_unit, AreaUnit::Marla);
    assert_eq!(data.category, PlotCategory::Residential);

    let listed = plot::list_all(&pool).await.expect("list should succeed");
    assert_eq!(listed.message, "List of found plots");
    let plots = listed.data.unwrap();
    assert_eq!(plots.len(), 1);
    assert_eq!(plots[0].plot_number, "P-100");
    assert_eq!(plots[0].block.as_ref(), Some(&block));
    assert!(plots[0].customer.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn list_all_empty_is_not_found() {
    let (pool, db_name) = create_test_db().await;

    let err = plot::list_all(&pool).await.unwrap_err();
    assert!(matches!(err, PlotError::NotFound(ref msg) if msg == NO_PLOT_FOUND));

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_by_id_found_and_missing() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;
    let customer = seed_customer(&pool, "Hina").await;

    let mut value = plot_body(block.id, "P-1");
    value["customerId"] = json!(customer.id.to_string());
    let created = plot::create(&pool, &body(value)).await.unwrap().data.unwrap();

    let found = plot::get_by_id(&pool, &created.id.to_string())
        .await
        .expect("get should succeed");
    assert_eq!(found.message, "Found plot");
    let found = found.data.unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.block.map(|b| b.name).as_deref(), Some("B1"));
    assert_eq!(found.customer.map(|c| c.name).as_deref(), Some("Hina"));

    let err = plot::get_by_id(&pool, &Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, PlotError::NotFound(_)));

    let err = plot::get_by_id(&pool, "").await.unwrap_err();
    assert_bad_request(err, "Please provide plot id");

    let err = plot::get_by_id(&pool, "not-a-uuid").await.unwrap_err();
    assert_bad_request(err, input::INVALID_PLOT_ID);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn create_missing_field_persists_nothing() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    for field in ["blockId", "plot_number", "plot_type", "area", "area_unit", "category"] {
        let mut value = plot_body(block.id, "P-1");
        value.as_object_mut().unwrap().remove(field);
        let err = plot::create(&pool, &body(value)).await.unwrap_err();
        assert_bad_request(err, input::ALL_FIELDS_REQUIRED);
    }
    assert_eq!(plot_count(&pool).await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn create_invalid_unit_persists_nothing() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let mut value = plot_body(block.id, "P-1");
    value["area_unit"] = json!("acre");
    let err = plot::create(&pool, &body(value)).await.unwrap_err();
    assert_bad_request(err, input::INVALID_AREA_UNIT);
    assert_eq!(plot_count(&pool).await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn create_unknown_block_or_customer_conflicts() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let err = plot::create(&pool, &body(plot_body(Uuid::new_v4(), "P-1")))
        .await
        .unwrap_err();
    assert_conflict(err, BLOCK_NOT_FOUND);

    let mut value = plot_body(block.id, "P-1");
    value["customerId"] = json!(Uuid::new_v4().to_string());
    let err = plot::create(&pool, &body(value)).await.unwrap_err();
    assert_conflict(err, CUSTOMER_NOT_FOUND);

    assert_eq!(plot_count(&pool).await, 0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn create_duplicate_plot_number_conflicts() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    plot::create(&pool, &body(plot_body(block.id, "P-1")))
        .await
        .expect("first create should succeed");

    let err = plot::create(&pool, &body(plot_body(block.id, "P-1")))
        .await
        .unwrap_err();
    assert_conflict(err, DUPLICATE_PLOT_NUMBER);
    assert_eq!(plot_count(&pool).await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn numeric_plot_number_spellings_collide() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let mut first = plot_body(block.id, "");
    first["plot_number"] = json!(100);
    plot::create(&pool, &body(first))
        .await
        .expect("first create should succeed");

    for raw in ["100.0", "1e2", "\"100\""] {
        let mut again = plot_body(block.id, "");
        again["plot_number"] = serde_json::from_str(raw).unwrap();
        let err = plot::create(&pool, &body(again)).await.unwrap_err();
        assert_conflict(err, DUPLICATE_PLOT_NUMBER);
    }
    assert_eq!(plot_count(&pool).await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn concurrent_creates_leave_one_plot_number() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let first = body(plot_body(block.id, "P-RACE"));
    let second = first.clone();
    let (a, b) = tokio::join!(plot::create(&pool, &first), plot::create(&pool, &second));

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results {
        if let Err(err) = result {
            assert_conflict(err, DUPLICATE_PLOT_NUMBER);
        }
    }
    assert_eq!(plot_count(&pool).await, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_replaces_fields() {
    let (pool, db_name) = create_test_db().await;
    let block_a = seed_block(&pool, "A").await;
    let block_b = seed_block(&pool, "B").await;

    let mut value = plot_body(block_a.id, "P-1");
    value["is_cornered"] = json!(true);
    let created = plot::create(&pool, &body(value)).await.unwrap().data.unwrap();

    let updated = plot::update(
        &pool,
        &body(json!({
            "_id": created.id.to_string(),
            "blockId": block_b.id.to_string(),
            "plot_number": "P-1A",
            "plot_type": "shop",
            "area_unit": "kanal",
            "area": "1.25",
            "category": "commercial",
        })),
    )
    .await
    .expect("update should succeed");

    assert_eq!(updated.message, "P-1A updated!");
    let data = updated.data.unwrap();
    assert_eq!(data.id, created.id);
    assert_eq!(data.block_id, block_b.id);
    assert_eq!(data.plot_number, "P-1A");
    assert_eq!(data.plot_type, PlotType::Shop);
    assert_eq!(data.area_unit, AreaUnit::Kanal);
    assert_eq!(data.area, 1.25);
    assert_eq!(data.category, PlotCategory::Commercial);
    assert_eq!(data.is_cornered, None, "omitted flag is cleared");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_keeping_own_plot_number_succeeds() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    let created = plot::create(&pool, &body(plot_body(block.id, "P-1")))
        .await
        .unwrap()
        .data
        .unwrap();

    let mut value = plot_body(block.id, "P-1");
    value["_id"] = json!(created.id.to_string());
    value["area"] = json!(7);
    let updated = plot::update(&pool, &body(value))
        .await
        .expect("self-duplicate is not a conflict");
    assert_eq!(updated.data.unwrap().area, 7.0);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_to_taken_plot_number_conflicts() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;

    plot::create(&pool, &body(plot_body(block.id, "P-1"))).await.unwrap();
    let second = plot::create(&pool, &body(plot_body(block.id, "P-2")))
        .await
        .unwrap()
        .data
        .unwrap();

    let mut value = plot_body(block.id, "P-1");
    value["_id"] = json!(second.id.to_string());
    let err = plot::update(&pool, &body(value)).await.unwrap_err();
    assert_conflict(err, DUPLICATE_PLOT_NUMBER);

    let unchanged = plot_queries::get_plot(&pool, second.id).await.unwrap().unwrap();
    assert_eq!(unchanged.plot_number, "P-2");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn update_rejections() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;
    let created = plot::create(&pool, &body(plot_body(block.id, "P-1")))
        .await
        .unwrap()
        .data
        .unwrap();

    // No `_id`.
    let err = plot::update(&pool, &body(plot_body(block.id, "P-1")))
        .await
        .unwrap_err();
    assert_bad_request(err, input::ALL_FIELDS_REQUIRED);

    // Unknown `_id`.
    let mut value = plot_body(block.id, "P-1");
    value["_id"] = json!(Uuid::new_v4().to_string());
    let err = plot::update(&pool, &body(value)).await.unwrap_err();
    assert_bad_request(err, UPDATE_TARGET_MISSING);

    // Bad enums are all reported.
    let mut value = plot_body(block.id, "P-1");
    value["_id"] = json!(created.id.to_string());
    value["category"] = json!("farm");
    value["plot_type"] = json!("villa");
    let err = plot::update(&pool, &body(value)).await.unwrap_err();
    assert_bad_request(err, "Invalid plot category! Invalid plot type!");

    // Unknown block.
    let mut value = plot_body(Uuid::new_v4(), "P-1");
    value["_id"] = json!(created.id.to_string());
    let err = plot::update(&pool, &body(value)).await.unwrap_err();
    assert_conflict(err, BLOCK_NOT_FOUND);

    let unchanged = plot_queries::get_plot(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(unchanged, created);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn delete_removes_plot() {
    let (pool, db_name) = create_test_db().await;
    let block = seed_block(&pool, "B1").await;
    let created = plot::create(&pool, &body(plot_body(block.id, "P-9")))
        .await
        .unwrap()
        .data
        .unwrap();

    let id = json!(created.id.to_string());
    let deleted = plot::delete(&pool, Some(&id)).await.expect("delete should succeed");
    assert_eq!(
        deleted.message,
        format!("Plot P-9 with ID {} deleted", created.id)
    );
    assert!(deleted.data.is_none());

    let err = plot::get_by_id(&pool, &created.id.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, PlotError::NotFound(_)));

    let err = plot::delete(&pool, Some(&id)).await.unwrap_err();
    assert_bad_request(err, DELETE_TARGET_MISSING);

    let err = plot::delete(&pool, None).await.unwrap_err();
    assert_bad_request(err, PLOT_ID_REQUIRED);

    pool.close().await;
    drop_test_db(&db_name).await;
}
