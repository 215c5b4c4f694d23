use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use event_checkin_backend::router;
use event_checkin_database::stub::StubExecutor;
use event_checkin_database::{Queries, QueryError};
use http_body_util::BodyExt as _;
use hyper::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt as _;

fn app(stub: StubExecutor) -> (Arc<StubExecutor>, Router) {
    let stub = Arc::new(stub);
    (Arc::clone(&stub), router(Queries::new(stub)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn unknown_person_is_404() {
    let (_stub, app) = app(StubExecutor::new().rows(json!([])));

    let (status, body) = send(app, get("/persons/p1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found: no person with id p1");
}

#[tokio::test]
async fn person_is_found_by_card() {
    let (stub, app) = app(StubExecutor::new().rows(json!([{
        "id": "p1",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "company_id": "c1",
        "card_id": "0042",
    }])));

    let (status, body) = send(app, get("/persons/card/0042")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(stub.statements()[0].name, "fetch-person-by-card-id");
}

#[tokio::test]
async fn incomplete_person_is_400_without_storage_access() {
    let (stub, app) = app(StubExecutor::new());

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/persons",
            &json!({ "first_name": "Ada", "last_name": "Lovelace", "company_id": "c1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request: card_id is required");
    assert!(stub.statements().is_empty());
}

#[tokio::test]
async fn wrongly_typed_field_is_400_with_json_error() {
    let (stub, app) = app(StubExecutor::new());

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/persons",
            &json!({
                "first_name": 5,
                "last_name": "Lovelace",
                "company_id": "c1",
                "card_id": "0042",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request"), "{body}");
    assert!(stub.statements().is_empty());
}

#[tokio::test]
async fn body_without_content_type_is_400_with_json_error() {
    let (stub, app) = app(StubExecutor::new());
    let request = Request::post("/participation")
        .body(Body::from(json!({ "person_id": "p1", "event_id": "e1" }).to_string()))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request"), "{body}");
    assert!(stub.statements().is_empty());
}

#[tokio::test]
async fn unparsable_update_body_is_400() {
    let (stub, app) = app(StubExecutor::new());
    let request = Request::put("/persons/p1")
        .header("content-type", "application/json")
        .body(Body::from("{\"first_name\": "))
        .unwrap();

    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(stub.statements().is_empty());
}

#[tokio::test]
async fn created_person_is_acknowledged() {
    let (_stub, app) = app(StubExecutor::new().affected(1));

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/persons",
            &json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "company_id": "c1",
                "card_id": "0042",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "rows_affected": 1 }));
}

#[tokio::test]
async fn person_update_goes_to_the_path_id() {
    let (stub, app) = app(StubExecutor::new().affected(1));

    let (status, _body) = send(
        app,
        json_request(
            "PUT",
            "/persons/p7",
            &json!({ "first_name": "Grace", "last_name": "Hopper", "company_id": "c2" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.statements()[0].params, vec!["Grace", "Hopper", "c2", "p7"]);
}

#[tokio::test]
async fn duplicate_participation_is_400() {
    let (stub, app) = app(
        StubExecutor::new().rows(json!([{ "person_id": "p1", "event_id": "e1" }])),
    );

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/participation",
            &json!({ "person_id": "p1", "event_id": "e1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("conflict"));
    assert_eq!(stub.statements().len(), 1);
}

#[tokio::test]
async fn missing_participation_is_null() {
    let (_stub, app) = app(StubExecutor::new().rows(json!([])));

    let (status, body) = send(app, get("/participation?person_id=p1&event_id=e1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn participation_lookup_needs_both_ids() {
    let (stub, app) = app(StubExecutor::new());

    let (status, _body) = send(app, get("/participation?person_id=p1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(stub.statements().is_empty());
}

#[tokio::test]
async fn event_attendance_is_reported_per_company_and_in_total() {
    let (_stub, app) = app(
        StubExecutor::new()
            .rows(json!([
                { "company_id": "c1", "company_name": "Acme", "attendee_count": 2 },
                { "company_id": "c2", "company_name": "Globex", "attendee_count": 1 },
            ]))
            .rows(json!([{ "attendee_count": 3 }])),
    );

    let (status, per_company) = send(app.clone(), get("/events/e1/attendance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(per_company.as_array().unwrap().len(), 2);

    let (status, total) = send(app, get("/events/e1/attendance/total")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(total, json!({ "attendee_count": 3 }));
}

#[tokio::test]
async fn storage_errors_are_500_without_details() {
    let (_stub, app) = app(
        StubExecutor::new().fail(QueryError::UniqueViolation("secret constraint".to_owned())),
    );

    let (status, body) = send(app, get("/companies")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}
