use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use erha_ops::db::Database;
use erha_ops::patch::{AssembledStatement, Placeholder, SqlValue};
use erha_ops::services::web::{AppState, router};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    app_with_db().0
}

fn app_with_db() -> (Router, Database) {
    let db = Database::open_in_memory().expect("in-memory database");
    (router(AppState { db: db.clone() }), db)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(body).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(body) => {
            send_raw(
                app,
                method,
                uri,
                Some("application/json"),
                Body::from(body.to_string()),
            )
            .await
        }
        None => send_raw(app, method, uri, None, Body::empty()).await,
    }
}

/// Insert a quote row directly so `created_at` is under test control
async fn seed_quote(
    db: &Database,
    id: &str,
    quote_number: &str,
    title: &str,
    description: Option<&str>,
    created_at: i64,
) {
    let stmt = AssembledStatement::checked(
        "INSERT INTO quotes (id, quote_number, title, description, total_amount, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            .to_string(),
        vec![
            id.into(),
            quote_number.into(),
            title.into(),
            description.into(),
            SqlValue::Real(1000.0),
            created_at.into(),
            created_at.into(),
        ],
        Placeholder::Numbered,
    )
    .unwrap();
    let inserted = db.call(move |c| c.execute(&stmt)).await.unwrap();
    assert_eq!(inserted, 1);
}

fn ids(body: &Value, key: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[key].as_str().unwrap().to_string())
        .collect()
}

async fn seed_job(app: &Router, job_no: &str, description: &str, value: f64, status: &str) {
    let (code, _) = send(
        app,
        Method::POST,
        "/api/jobs",
        Some(json!({
            "jobNo": job_no,
            "description": description,
            "estimatedValue": value,
            "status": status,
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn create_applies_defaults() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({"jobNo": "J-1", "description": "Gearbox rebuild"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["data"],
        json!({
            "jobNo": "J-1",
            "description": "Gearbox rebuild",
            "estimatedValue": 0.0,
            "status": "PENDING",
        })
    );
}

#[tokio::test]
async fn create_requires_job_no_and_description() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({"description": "No number"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: jobNo");
}

#[tokio::test]
async fn duplicate_job_is_conflict() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "PENDING").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({"jobNo": "J-1", "description": "Again"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Job number already exists");
}

#[tokio::test]
async fn update_status_only_leaves_other_columns() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        Some(json!({"status": "approved"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "jobNo": "J-1",
            "description": "Gearbox rebuild",
            "estimatedValue": 1500.0,
            "status": "APPROVED",
        })
    );
}

#[tokio::test]
async fn update_two_fields() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/jobs/J-1",
        Some(json!({"description": "Gearbox and shaft", "status": "APPROVED"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Gearbox and shaft");
    assert_eq!(body["data"]["status"], "APPROVED");
    assert_eq!(body["data"]["estimatedValue"], 1500.0);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, body) = send(&app, Method::PUT, "/api/jobs/J-1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No fields to update");
}

#[tokio::test]
async fn unknown_field_is_rejected_and_nothing_changes() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        Some(json!({"status": "APPROVED", "bogusField": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown field: bogusField");

    let (_, body) = send(&app, Method::GET, "/api/jobs/J-1", None).await;
    assert_eq!(body["data"]["status"], "PENDING");
}

#[tokio::test]
async fn job_no_cannot_be_patched() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        Some(json!({"jobNo": "J-2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown field: jobNo");
}

#[tokio::test]
async fn update_rejects_unlisted_status() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 1500.0, "PENDING").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        Some(json!({"status": "SHIPPED"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_missing_job_is_404() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/jobs/NOPE",
        Some(json!({"status": "APPROVED"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found");
}

#[tokio::test]
async fn non_object_body_is_rejected() {
    let app = app();
    let (status, _) = send(&app, Method::PUT, "/api/jobs/J-1", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_filter_normalises_case() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "APPROVED").await;
    seed_job(&app, "J-2", "Pump service", 200.0, "PENDING").await;

    let (status, body) = send(&app, Method::GET, "/api/jobs/status/approved", None).await;
    assert_eq!(status, StatusCode::OK);
    let jobs = body["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["jobNo"], "J-1");

    let (status, body) = send(&app, Method::GET, "/api/jobs/status/shipped", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown status: shipped");
}

#[tokio::test]
async fn search_matches_substring_literally() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "PENDING").await;
    seed_job(&app, "J-2", "Pump 100% overhaul", 200.0, "PENDING").await;

    let (_, body) = send(&app, Method::GET, "/api/jobs/search/box", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["jobNo"], "J-1");

    let (_, body) = send(&app, Method::GET, "/api/jobs/search/100%25", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["jobNo"], "J-2");
}

#[tokio::test]
async fn stats_summarise_jobs() {
    let app = app();
    let (_, body) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(body["data"]["totalJobs"], 0);

    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "APPROVED").await;
    seed_job(&app, "J-2", "Pump service", 300.0, "PENDING").await;

    let (status, body) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "totalJobs": 2,
            "approvedJobs": 1,
            "pendingJobs": 1,
            "totalValue": 400.0,
            "averageValue": 200.0,
            "maxValue": 300.0,
            "minValue": 100.0,
        })
    );
}

#[tokio::test]
async fn delete_job() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "PENDING").await;

    let (status, _) = send(&app, Method::DELETE, "/api/jobs/J-1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/jobs/J-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/jobs/J-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_lifecycle() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/quotes",
        Some(json!({
            "quote_number": "Q-2024-001",
            "title": "Conveyor refurbishment",
            "total_amount": 11500,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let quote = &body["data"];
    assert_eq!(quote["status"], "draft");
    assert_eq!(quote["priority"], "medium");
    assert_eq!(quote["currency"], "ZAR");
    assert_eq!(quote["description"], Value::Null);
    let id = quote["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/quotes/{}", id),
        Some(json!({"status": "SENT", "description": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");
    assert_eq!(body["data"]["title"], "Conveyor refurbishment");
    assert!(body["data"]["updated_at"].as_i64() >= quote["updated_at"].as_i64());

    let (status, body) = send(&app, Method::GET, "/api/quotes/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_quotes"], 1);
    assert_eq!(body["data"]["by_status"]["sent"], 1);
    assert_eq!(body["data"]["by_status"]["draft"], 0);

    let (status, body) = send(&app, Method::GET, "/api/quotes/status/Sent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quote_update_cannot_touch_managed_columns() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/quotes/some-id",
        Some(json!({"created_at": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown field: created_at");
}

#[tokio::test]
async fn duplicate_quote_number_is_conflict() {
    let app = app();
    let quote = json!({"quote_number": "Q-1", "title": "Pumps", "total_amount": 10});
    let (status, _) = send(&app, Method::POST, "/api/quotes", Some(quote.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/api/quotes", Some(quote)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Quote number already exists");
}

#[tokio::test]
async fn api_info_lists_endpoints() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["jobs"], "/api/jobs");
    assert_eq!(body["endpoints"]["quotes"], "/api/quotes");
}

#[tokio::test]
async fn malformed_body_uses_error_envelope() {
    let app = app();
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "PENDING").await;

    let (status, body) = send_raw(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        Some("application/json"),
        Body::from("{bad"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("JSON"));

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/api/quotes",
        Some("application/json"),
        Body::from("{\"title\": "),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_content_type_keeps_status_and_envelope() {
    let app = app();
    let (status, body) = send_raw(
        &app,
        Method::PUT,
        "/api/jobs/J-1",
        None,
        Body::from(json!({"status": "APPROVED"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn jobs_list_in_job_no_order() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    seed_job(&app, "J-3", "Valve seats", 300.0, "PENDING").await;
    seed_job(&app, "J-1", "Gearbox rebuild", 100.0, "APPROVED").await;
    seed_job(&app, "J-2", "Pump service", 200.0, "PENDING").await;

    let (_, body) = send(&app, Method::GET, "/api/jobs", None).await;
    assert_eq!(ids(&body, "jobNo"), ["J-1", "J-2", "J-3"]);
}

#[tokio::test]
async fn quotes_list_newest_first() {
    let (app, db) = app_with_db();
    seed_quote(&db, "a", "Q-A", "Old", None, 100).await;
    seed_quote(&db, "b", "Q-B", "Newest", None, 300).await;
    seed_quote(&db, "c", "Q-C", "Middle", None, 200).await;

    let (status, body) = send(&app, Method::GET, "/api/quotes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "quote_number"), ["Q-B", "Q-C", "Q-A"]);
}

#[tokio::test]
async fn quote_search_covers_number_title_and_description() {
    let (app, db) = app_with_db();
    seed_quote(&db, "1", "VALVE-7", "Spares", None, 500).await;
    seed_quote(&db, "2", "Q-2", "Valve overhaul", None, 400).await;
    seed_quote(&db, "3", "Q-3", "Conveyor", Some("replace valve seats"), 300).await;
    seed_quote(&db, "4", "Q-4", "Valve kit", Some("valve kit"), 200).await;
    seed_quote(&db, "5", "Q-5", "Pump", Some("impeller"), 100).await;

    let (status, body) = send(&app, Method::GET, "/api/quotes/search/valve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "quote_number"), ["VALVE-7", "Q-2", "Q-3", "Q-4"]);

    let (_, body) = send(&app, Method::GET, "/api/quotes/search/nothing", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn quote_not_found_paths() {
    let (app, db) = app_with_db();

    let (status, body) = send(&app, Method::GET, "/api/quotes/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Quote not found");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/quotes/missing",
        Some(json!({"title": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    seed_quote(&db, "q1", "Q-1", "Pumps", None, 100).await;
    let (status, body) = send(&app, Method::DELETE, "/api/quotes/q1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "q1");

    let (status, _) = send(&app, Method::GET, "/api/quotes/q1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/api/quotes/q1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_metadata_round_trips_as_json() {
    let app = app();
    let metadata = json!({"site": "Plant 3", "shifts": [1, 2]});
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/quotes",
        Some(json!({
            "quote_number": "Q-9",
            "title": "Crusher liners",
            "total_amount": 5000,
            "metadata": metadata,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["metadata"], metadata);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/quotes/{}", id),
        Some(json!({"metadata": null})),
    )
    .await;
    assert_eq!(body["data"]["metadata"], Value::Null);
}
