//! End-to-end API tests
//!
//! Each test boots a fresh server state over a temporary work dir (own
//! SQLite file + uploads dir) and drives the real router in-process.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use encore_server::core::build_router;
use encore_server::{Config, ServerState};

struct TestServer {
    app: Router,
    state: ServerState,
    // Keeps the work dir alive for the test's duration
    _work_dir: TempDir,
}

async fn setup() -> TestServer {
    let work_dir = tempfile::tempdir().expect("create temp work dir");
    let config = Config::with_overrides(work_dir.path().to_str().unwrap(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("initialize state");
    TestServer {
        app: build_router(state.clone()),
        state,
        _work_dir: work_dir,
    }
}

fn token(server: &TestServer, role: &str) -> String {
    server
        .state
        .jwt_service
        .generate_token("tester", "Tester", role)
        .expect("generate token")
}

async fn send(
    server: &TestServer,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = server.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_multipart(
    server: &TestServer,
    uri: &str,
    token: &str,
    parts: &[(&str, Option<(&str, &str)>, &[u8])],
) -> (StatusCode, Value) {
    const BOUNDARY: &str = "EncoreTestBoundary";
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_member(server: &TestServer, token: &str, body: Value) -> Value {
    let (status, v) = send(server, "POST", "/api/members", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "member create failed: {v}");
    v["data"].clone()
}

async fn create_onboarding(server: &TestServer, token: &str, body: Value) -> Value {
    let (status, v) = send(server, "POST", "/api/onboarding", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "onboarding create failed: {v}");
    v["data"].clone()
}

#[tokio::test]
async fn health_is_public() {
    let server = setup().await;
    let (status, v) = send(&server, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], json!(true));
    assert_eq!(v["data"]["status"], json!("ok"));
}

#[tokio::test]
async fn api_routes_require_bearer_token() {
    let server = setup().await;
    let (status, v) = send(&server, "GET", "/api/members", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(v["success"], json!(false));

    let (status, _) = send(
        &server,
        "GET",
        "/api/members",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_crud_and_sequential_numbers() {
    let server = setup().await;
    let token = token(&server, "staff");

    let m1 = create_member(&server, &token, json!({"name": "Asha Rao"})).await;
    let m2 = create_member(&server, &token, json!({"name": "Vikram Shetty"})).await;
    assert_eq!(m1["memberNumber"], json!(1));
    assert_eq!(m2["memberNumber"], json!(2));
    assert_eq!(m1["status"], json!("pending"));

    let id = m1["id"].as_i64().unwrap();
    let (status, v) = send(
        &server,
        "PUT",
        &format!("/api/members/{id}"),
        Some(&token),
        Some(json!({"tier": "Tier 2", "status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["tier"], json!("Tier 2"));
    assert_eq!(v["data"]["status"], json!("active"));
    // Untouched fields keep their value
    assert_eq!(v["data"]["name"], json!("Asha Rao"));

    let (status, _) = send(
        &server,
        "DELETE",
        &format!("/api/members/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, v) = send(
        &server,
        "GET",
        &format!("/api/members/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["success"], json!(false));

    // Numbering continues, never reuses
    let m3 = create_member(&server, &token, json!({"name": "Neha K"})).await;
    assert_eq!(m3["memberNumber"], json!(3));
}

#[tokio::test]
async fn email_uniqueness_is_sparse() {
    let server = setup().await;
    let token = token(&server, "staff");

    create_member(
        &server,
        &token,
        json!({"name": "A", "email": "a@example.com"}),
    )
    .await;

    let (status, v) = send(
        &server,
        "POST",
        "/api/members",
        Some(&token),
        Some(json!({"name": "B", "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], json!(false));
    assert!(v["error"].as_str().unwrap().contains("email"));

    // Any number of members without an email
    create_member(&server, &token, json!({"name": "C"})).await;
    create_member(&server, &token, json!({"name": "D"})).await;
}

#[tokio::test]
async fn onboarding_requires_existing_member() {
    let server = setup().await;
    let token = token(&server, "staff");

    let (status, v) = send(
        &server,
        "POST",
        "/api/onboarding",
        Some(&token),
        Some(json!({"memberId": 424242})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], json!(false));
}

#[tokio::test]
async fn onboarding_stage_progression() {
    let server = setup().await;
    let token = token(&server, "staff");

    let member = create_member(&server, &token, json!({"name": "Asha Rao"})).await;
    let member_id = member["id"].as_i64().unwrap();

    let ob = create_onboarding(
        &server,
        &token,
        json!({"memberId": member_id, "spoc": "Ravi"}),
    )
    .await;
    assert_eq!(ob["status"], json!("contact-established"));
    assert_eq!(ob["taskNumber"], json!(1));
    assert_eq!(ob["artistName"], json!("Asha Rao"));
    assert_eq!(ob["createdBy"], json!("Tester"));
    let id = ob["id"].as_i64().unwrap();

    // Step 1 forces spoc-assigned
    let (status, v) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/step1"),
        Some(&token),
        Some(json!({"source": "instagram", "contactStatus": "responded"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["status"], json!("spoc-assigned"));
    assert_eq!(v["data"]["step1Data"]["source"], json!("instagram"));

    // L1 questionnaire forces review-l2 and cascades KYC onto the member
    let (status, v) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/l1-questionnaire"),
        Some(&token),
        Some(json!({"bankName": "X", "accountNumber": "1234", "agreementAccepted": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["status"], json!("review-l2"));

    let (_, v) = send(
        &server,
        "GET",
        &format!("/api/members/{member_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(v["data"]["bankName"], json!("X"));
    assert_eq!(v["data"]["accountNumber"], json!("1234"));

    // L2 review defaults to review-l2, then closes with a caller status
    let (status, v) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/l2-review"),
        Some(&token),
        Some(json!({"profileVerified": true, "membershipType": "premium"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["status"], json!("review-l2"));
    assert_eq!(v["data"]["l2ReviewData"]["profileVerified"], json!(true));

    let (status, v) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/l2-review"),
        Some(&token),
        Some(json!({"status": "closed-won", "profileVerified": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["status"], json!("closed-won"));
}

#[tokio::test]
async fn legacy_heat_token_in_status_field_becomes_heat() {
    let server = setup().await;
    let token = token(&server, "staff");

    let member = create_member(&server, &token, json!({"name": "A"})).await;
    let ob = create_onboarding(
        &server,
        &token,
        json!({"memberId": member["id"], "status": "hot"}),
    )
    .await;
    // The formal status stays canonical; the heat word lands in heat
    assert_eq!(ob["status"], json!("contact-established"));
    assert_eq!(ob["heat"], json!("hot"));

    let (status, v) = send(
        &server,
        "GET",
        "/api/onboarding?status=contact-established",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"].as_array().unwrap().len(), 1);

    // The list filter accepts the same legacy vocabulary and matches heat
    let other = create_member(&server, &token, json!({"name": "B"})).await;
    create_onboarding(&server, &token, json!({"memberId": other["id"]})).await;

    let (status, v) = send(&server, "GET", "/api/onboarding?status=hot", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = v["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["heat"], json!("hot"));

    let (status, _) = send(
        &server,
        "GET",
        "/api/onboarding?status=lukewarm",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn documents_survive_l2_updates_and_index_is_bounds_checked() {
    let server = setup().await;
    let token = token(&server, "staff");

    let member = create_member(&server, &token, json!({"name": "A"})).await;
    let ob = create_onboarding(&server, &token, json!({"memberId": member["id"]})).await;
    let id = ob["id"].as_i64().unwrap();

    let (status, v) = send_multipart(
        &server,
        &format!("/api/onboarding/{id}/l2-review/documents"),
        &token,
        &[
            ("title", None, b"Signed contract"),
            (
                "file",
                Some(("contract.pdf", "application/pdf")),
                b"%PDF-1.4 fake",
            ),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {v}");
    let docs = v["data"]["l2ReviewData"]["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["title"], json!("Signed contract"));
    let locator = docs[0]["path"].as_str().unwrap().to_string();
    assert!(locator.starts_with("documents/"));

    // An l2-review update without documents must not erase them
    let (_, v) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/l2-review"),
        Some(&token),
        Some(json!({"meetingMode": "video"})),
    )
    .await;
    assert_eq!(
        v["data"]["l2ReviewData"]["documents"].as_array().unwrap().len(),
        1
    );
    assert_eq!(v["data"]["l2ReviewData"]["meetingMode"], json!("video"));

    // Out-of-range index: 400, distinct from a missing onboarding, no mutation
    let (status, v) = send(
        &server,
        "DELETE",
        &format!("/api/onboarding/{id}/l2-review/documents/5"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], json!(false));

    let (status, _) = send(
        &server,
        "DELETE",
        "/api/onboarding/424242/l2-review/documents/0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, v) = send(
        &server,
        "GET",
        &format!("/api/onboarding/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(
        v["data"]["l2ReviewData"]["documents"].as_array().unwrap().len(),
        1
    );

    // Valid removal deletes metadata and blob
    let (status, v) = send(
        &server,
        "DELETE",
        &format!("/api/onboarding/{id}/l2-review/documents/0"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        v["data"]["l2ReviewData"]["documents"]
            .as_array()
            .unwrap()
            .is_empty()
    );
    assert!(
        !server
            .state
            .documents
            .uploads_dir()
            .join(&locator)
            .exists()
    );
}

#[tokio::test]
async fn picklist_duplicates_and_soft_delete() {
    let server = setup().await;
    let staff = token(&server, "staff");
    let admin = token(&server, "admin");

    let (status, _) = send(
        &server,
        "POST",
        "/api/picklists",
        Some(&staff),
        Some(json!({"name": "source", "label": "Lead Source"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Duplicate picklist name
    let (status, _) = send(
        &server,
        "POST",
        "/api/picklists",
        Some(&staff),
        Some(json!({"name": "source", "label": "Again"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, v) = send(
        &server,
        "POST",
        "/api/picklists/source/items",
        Some(&staff),
        Some(json!({"value": "Instagram"})),
    )
    .await;
    let item_id = v["data"]["items"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(v["data"]["items"][0]["order"], json!(1));

    // Case-insensitive duplicate among active items
    let (status, v) = send(
        &server,
        "POST",
        "/api/picklists/source/items",
        Some(&staff),
        Some(json!({"value": "instagram"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], json!(false));

    // Soft delete needs the admin role
    let (status, _) = send(
        &server,
        "DELETE",
        &format!("/api/picklists/source/items/{item_id}"),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, v) = send(
        &server,
        "DELETE",
        &format!("/api/picklists/source/items/{item_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Retained, flagged inactive, never removed
    assert_eq!(v["data"]["items"][0]["isActive"], json!(false));

    // A retired value may be re-added; order keeps counting upward
    let (status, v) = send(
        &server,
        "POST",
        "/api/picklists/source/items",
        Some(&staff),
        Some(json!({"value": "instagram"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["data"]["items"][1]["order"], json!(2));
}

#[tokio::test]
async fn onboarding_status_report_rows() {
    const DAY: i64 = 86_400_000;
    let server = setup().await;
    let token = token(&server, "staff");
    let now = chrono::Utc::now().timestamp_millis();

    let member = create_member(
        &server,
        &token,
        json!({"name": "Asha", "tier": "Tier 2"}),
    )
    .await;

    let overdue = create_onboarding(
        &server,
        &token,
        json!({"memberId": member["id"], "etaClosure": now - 10 * DAY}),
    )
    .await;
    let no_eta = create_onboarding(&server, &token, json!({"memberId": member["id"]})).await;

    let (status, v) = send(
        &server,
        "GET",
        "/api/onboarding/reports/onboarding-status",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = v["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let row = rows
        .iter()
        .find(|r| r["id"] == overdue["id"])
        .expect("overdue row");
    assert_eq!(row["daysFromEta"], json!(10));
    assert_eq!(row["tier"], json!("tier2"));

    let row = rows
        .iter()
        .find(|r| r["id"] == no_eta["id"])
        .expect("no-eta row");
    assert_eq!(row["daysFromEta"], json!("N/A"));
}

#[tokio::test]
async fn closure_checklist_feed_filters_empty_checklists() {
    let server = setup().await;
    let token = token(&server, "staff");

    let member = create_member(&server, &token, json!({"name": "A"})).await;
    let with_rows = create_onboarding(&server, &token, json!({"memberId": member["id"]})).await;
    let without_rows = create_onboarding(&server, &token, json!({"memberId": member["id"]})).await;

    let id = with_rows["id"].as_i64().unwrap();
    let (status, _) = send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id}/l2-review"),
        Some(&token),
        Some(json!({
            "closureChecklist": [
                {"status": "agreement pending", "spoc": "Ravi", "eta": "2026-09-01"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The second record gets l2 data but an empty checklist
    let id2 = without_rows["id"].as_i64().unwrap();
    send(
        &server,
        "PATCH",
        &format!("/api/onboarding/{id2}/l2-review"),
        Some(&token),
        Some(json!({"meetingMode": "call"})),
    )
    .await;

    let (status, v) = send(
        &server,
        "GET",
        "/api/onboarding/reports/closure-checklist",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = v["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], with_rows["id"]);
}

#[tokio::test]
async fn concurrent_creates_allocate_unique_task_numbers() {
    let server = setup().await;
    let token = token(&server, "staff");
    let member = create_member(&server, &token, json!({"name": "A"})).await;
    let member_id = member["id"].as_i64().unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = server.app.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/api/onboarding")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"memberId": member_id}).to_string()))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let v: Value = serde_json::from_slice(&bytes).unwrap();
            v["data"]["taskNumber"].as_i64().unwrap()
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), 8, "task numbers must be unique");
}

#[tokio::test]
async fn concurrent_uploads_keep_every_document() {
    const BOUNDARY: &str = "EncoreTestBoundary";
    let server = setup().await;
    let token = token(&server, "staff");
    let member = create_member(&server, &token, json!({"name": "A"})).await;
    let ob = create_onboarding(&server, &token, json!({"memberId": member["id"]})).await;
    let id = ob["id"].as_i64().unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = server.app.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let mut body = Vec::new();
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"doc-{i}.txt\"\r\nContent-Type: text/plain\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("payload {i}\r\n--{BOUNDARY}--\r\n").as_bytes());

            let request = Request::builder()
                .method("POST")
                .uri(format!("/api/onboarding/{id}/l2-review/documents"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let (_, v) = send(
        &server,
        "GET",
        &format!("/api/onboarding/{id}"),
        Some(&token),
        None,
    )
    .await;
    let docs = v["data"]["l2ReviewData"]["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 16, "no attached document may be lost");
}

#[tokio::test]
async fn concurrent_item_appends_keep_every_value() {
    let server = setup().await;
    let token = token(&server, "staff");
    send(
        &server,
        "POST",
        "/api/picklists",
        Some(&token),
        Some(json!({"name": "genre", "label": "Genre"})),
    )
    .await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = server.app.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/api/picklists/genre/items")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"value": format!("genre-{i}")}).to_string()))
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let (_, v) = send(&server, "GET", "/api/picklists/genre", Some(&token), None).await;
    let items = v["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 8, "no appended item may be lost");
    let mut orders: Vec<i64> = items.iter().map(|i| i["order"].as_i64().unwrap()).collect();
    orders.sort_unstable();
    assert_eq!(orders, (1..=8).collect::<Vec<_>>());
}
