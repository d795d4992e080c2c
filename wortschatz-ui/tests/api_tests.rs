//! Integration tests for the wortschatz-ui API
//!
//! Drives the real router against an in-memory database. Covers auth
//! (signup/login/reset, 401 vs 403), vocabulary CRUD round-trips, the review
//! flow with aggregate progress and badges, and bulk import.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use wortschatz_common::auth::{sign_with_expiry, Identity};
use wortschatz_common::db::{init, seed};
use wortschatz_ui::{build_router, AppState};

const TEST_SECRET: i64 = 987_654_321;

/// Test helper: in-memory database with schema, settings and stock badges
async fn setup_state() -> AppState {
    let pool = init::init_memory().await.expect("in-memory database");
    seed::seed_badges(&pool).await.expect("seed badges");
    AppState::new(pool, TEST_SECRET)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn auth_json_request(method: &str, uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn auth_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Sign up a user through the API and return their token
async fn signup(state: &AppState, email: &str) -> String {
    let app = build_router(state.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": email, "password": "geheim123", "name": "Anna" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    body["token"].as_str().expect("token").to_string()
}

/// Sign up, flip the admin flag, and log in again for an admin credential
async fn signup_admin(state: &AppState, email: &str) -> String {
    signup(state, email).await;

    sqlx::query("UPDATE users SET is_admin = 1 WHERE email = ?")
        .bind(email)
        .execute(&state.db)
        .await
        .expect("promote to admin");

    let app = build_router(state.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": "geheim123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["user"]["is_admin"], true);
    body["token"].as_str().expect("token").to_string()
}

/// Create a vocabulary entry as admin, returning its id
async fn create_entry(state: &AppState, admin_token: &str, word: &str, category: &str) -> String {
    let app = build_router(state.clone());
    let response = app
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary",
            admin_token,
            &json!({ "word": word, "meaning": "meaning", "category": category }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    body["id"].as_str().expect("id").to_string()
}

/// Submit a review event
async fn review(state: &AppState, token: &str, vocabulary_id: &str, status: &str) -> StatusCode {
    let app = build_router(state.clone());
    let response = app
        .oneshot(auth_json_request(
            "POST",
            "/api/flashcards/progress",
            token,
            &json!({ "vocabulary_id": vocabulary_id, "status": status }),
        ))
        .await
        .unwrap();
    response.status()
}

async fn fetch_progress(state: &AppState, token: &str) -> Value {
    let app = build_router(state.clone());
    let response = app.oneshot(auth_get("/api/progress", token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let state = setup_state().await;
    let app = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "wortschatz-ui");
    assert!(body["version"].is_string());
}

// =============================================================================
// Auth: signup / login
// =============================================================================

#[tokio::test]
async fn test_signup_returns_token_and_profile() {
    let state = setup_state().await;
    let app = build_router(state.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": "anna@example.com", "password": "geheim123", "name": "Anna" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "anna@example.com");
    assert_eq!(body["user"]["name"], "Anna");
    assert_eq!(body["user"]["is_admin"], false);
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let state = setup_state().await;
    signup(&state, "anna@example.com").await;

    let app = build_router(state);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": "anna@example.com", "password": "geheim123", "name": "Anna" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_short_password_rejected() {
    let state = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": "anna@example.com", "password": "abc", "name": "Anna" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_missing_fields_rejected() {
    let state = setup_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/signup",
            &json!({ "email": "anna@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_identical() {
    let state = setup_state().await;
    signup(&state, "anna@example.com").await;

    let wrong_password = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "anna@example.com", "password": "falsch123" }),
        ))
        .await
        .unwrap();
    let unknown_email = build_router(state)
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "nobody@example.com", "password": "geheim123" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    // Generic message, no account-existence leak
    let a = extract_json(wrong_password.into_body()).await;
    let b = extract_json(unknown_email.into_body()).await;
    assert_eq!(a["error"]["message"], b["error"]["message"]);
}

#[tokio::test]
async fn test_current_user_requires_credential() {
    let state = setup_state().await;
    let token = signup(&state, "anna@example.com").await;

    let with_token = build_router(state.clone())
        .oneshot(auth_get("/api/auth/user", &token))
        .await
        .unwrap();
    assert_eq!(with_token.status(), StatusCode::OK);
    let profile = extract_json(with_token.into_body()).await;
    assert_eq!(profile["email"], "anna@example.com");

    let without_token = build_router(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(without_token.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_credential_rejected() {
    let state = setup_state().await;

    // A well-formed credential whose expiry is in the past
    let identity = Identity {
        user_id: uuid::Uuid::new_v4(),
        email: "anna@example.com".to_string(),
        is_admin: false,
    };
    let expired = sign_with_expiry(&identity, TEST_SECRET, chrono::Utc::now().timestamp() - 60);

    let response = build_router(state)
        .oneshot(auth_get("/api/auth/user", &expired))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Auth: password reset flow
// =============================================================================

#[tokio::test]
async fn test_forgot_password_never_reveals_account_existence() {
    let state = setup_state().await;
    signup(&state, "anna@example.com").await;

    let known = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            &json!({ "email": "anna@example.com" }),
        ))
        .await
        .unwrap();
    let unknown = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            &json!({ "email": "nobody@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);

    let a = extract_json(known.into_body()).await;
    let b = extract_json(unknown.into_body()).await;
    assert_eq!(a["message"], b["message"]);

    // The known account got a code stored; the unknown one has no row at all
    let code: Option<String> =
        sqlx::query_scalar("SELECT reset_code FROM users WHERE email = 'anna@example.com'")
            .fetch_one(&state.db)
            .await
            .unwrap();
    assert!(code.is_some());
}

#[tokio::test]
async fn test_reset_password_full_flow() {
    let state = setup_state().await;
    signup(&state, "anna@example.com").await;

    build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            &json!({ "email": "anna@example.com" }),
        ))
        .await
        .unwrap();

    let code: String =
        sqlx::query_scalar("SELECT reset_code FROM users WHERE email = 'anna@example.com'")
            .fetch_one(&state.db)
            .await
            .unwrap();

    // Too-short replacement is rejected before the code is consumed
    let short = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            &json!({ "email": "anna@example.com", "reset_code": code, "new_password": "abc" }),
        ))
        .await
        .unwrap();
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    // Wrong code is rejected
    let wrong = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            &json!({ "email": "anna@example.com", "reset_code": "000000", "new_password": "neu-geheim" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

    // Correct code succeeds
    let ok = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            &json!({ "email": "anna@example.com", "reset_code": code, "new_password": "neu-geheim" }),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    // New password logs in; the code is single-use
    let login = build_router(state.clone())
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "anna@example.com", "password": "neu-geheim" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let reuse = build_router(state)
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            &json!({ "email": "anna@example.com", "reset_code": code, "new_password": "noch-neuer" }),
        ))
        .await
        .unwrap();
    assert_eq!(reuse.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Vocabulary catalog
// =============================================================================

#[tokio::test]
async fn test_vocabulary_mutation_forbidden_for_non_admin() {
    let state = setup_state().await;
    let token = signup(&state, "anna@example.com").await;

    let body = json!({ "word": "Hallo", "meaning": "Hello", "category": "Greetings" });

    // Valid non-admin credential: 403, distinct from unauthenticated 401
    let forbidden = build_router(state.clone())
        .oneshot(auth_json_request("POST", "/api/vocabulary", &token, &body))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let unauthorized = build_router(state)
        .oneshot(json_request("POST", "/api/vocabulary", &body))
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vocabulary_create_list_delete_round_trip() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;

    let id = create_entry(&state, &admin, "Hallo", "Greetings").await;

    // Category-filtered listing contains the entry exactly once
    let listed = build_router(state.clone())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/vocabulary?category=Greetings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let entries = extract_json(listed.into_body()).await;
    let matches: Vec<_> = entries
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["id"] == json!(id))
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["word"], "Hallo");

    // Delete removes it from subsequent listings
    let deleted = build_router(state.clone())
        .oneshot(auth_json_request(
            "DELETE",
            &format!("/api/vocabulary/{}", id),
            &admin,
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let relisted = build_router(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/vocabulary?category=Greetings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let entries = extract_json(relisted.into_body()).await;
    assert!(entries.as_array().unwrap().iter().all(|e| e["id"] != json!(id)));
}

#[tokio::test]
async fn test_vocabulary_create_rejects_unknown_category() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;

    let response = build_router(state)
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary",
            &admin,
            &json!({ "word": "X", "meaning": "Y", "category": "NotACategory" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vocabulary_partial_update() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;
    let id = create_entry(&state, &admin, "Hallo", "Greetings").await;

    let response = build_router(state)
        .oneshot(auth_json_request(
            "PUT",
            &format!("/api/vocabulary/{}", id),
            &admin,
            &json!({ "meaning": "Hello there" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entry = extract_json(response.into_body()).await;
    assert_eq!(entry["meaning"], "Hello there");
    assert_eq!(entry["word"], "Hallo", "unspecified fields stay unchanged");
    assert_eq!(entry["category"], "Greetings");
}

// =============================================================================
// Flashcards and the review flow
// =============================================================================

#[tokio::test]
async fn test_flashcards_merge_per_word_state() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;
    let token = signup(&state, "anna@example.com").await;
    let id = create_entry(&state, &admin, "Hallo", "Greetings").await;

    // Before any review the word shows as new
    let before = build_router(state.clone())
        .oneshot(auth_get("/api/flashcards", &token))
        .await
        .unwrap();
    let cards = extract_json(before.into_body()).await;
    let card = cards
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == json!(id))
        .expect("card present")
        .clone();
    assert_eq!(card["user_status"], "new");
    assert_eq!(card["times_reviewed"], 0);

    // One "learning" review updates only the per-word state
    assert_eq!(review(&state, &token, &id, "learning").await, StatusCode::OK);

    let after = build_router(state.clone())
        .oneshot(auth_get("/api/flashcards", &token))
        .await
        .unwrap();
    let cards = extract_json(after.into_body()).await;
    let card = cards
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == json!(id))
        .expect("card present")
        .clone();
    assert_eq!(card["user_status"], "learning");
    assert_eq!(card["times_reviewed"], 1);

    // A "learning" outcome grants nothing
    let progress = fetch_progress(&state, &token).await;
    assert_eq!(progress["progress"]["words_learned"], 0);
    assert_eq!(progress["progress"]["total_xp"], 0);
}

#[tokio::test]
async fn test_known_reviews_grant_xp_and_keep_counting() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;
    let token = signup(&state, "anna@example.com").await;
    let id = create_entry(&state, &admin, "Hallo", "Greetings").await;

    assert_eq!(review(&state, &token, &id, "known").await, StatusCode::OK);

    let progress = fetch_progress(&state, &token).await;
    assert_eq!(progress["progress"]["words_learned"], 1);
    assert_eq!(progress["progress"]["total_xp"], 10);

    // Repeat "known" on the same word keeps incrementing
    assert_eq!(review(&state, &token, &id, "known").await, StatusCode::OK);

    let progress = fetch_progress(&state, &token).await;
    assert_eq!(progress["progress"]["words_learned"], 2);
    assert_eq!(progress["progress"]["total_xp"], 20);

    // The per-word row stays unique: two reviews, one row
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_vocabulary_progress WHERE vocabulary_id = ?",
    )
    .bind(&id)
    .fetch_one(&state.db)
    .await
    .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_review_validation() {
    let state = setup_state().await;
    let token = signup(&state, "anna@example.com").await;

    let missing = build_router(state.clone())
        .oneshot(auth_json_request(
            "POST",
            "/api/flashcards/progress",
            &token,
            &json!({ "status": "known" }),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bad_status = build_router(state.clone())
        .oneshot(auth_json_request(
            "POST",
            "/api/flashcards/progress",
            &token,
            &json!({ "vocabulary_id": uuid::Uuid::new_v4(), "status": "mastered" }),
        ))
        .await
        .unwrap();
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);

    // A vocabulary id that is not in the catalog
    let unknown = build_router(state)
        .oneshot(auth_json_request(
            "POST",
            "/api/flashcards/progress",
            &token,
            &json!({ "vocabulary_id": uuid::Uuid::new_v4(), "status": "known" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_badges_awarded_once() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;
    let token = signup(&state, "anna@example.com").await;
    let id = create_entry(&state, &admin, "Hallo", "Greetings").await;

    // First "known" review crosses the words_learned >= 1 threshold
    review(&state, &token, &id, "known").await;

    let progress = fetch_progress(&state, &token).await;
    let badges = progress["badges"].as_array().unwrap().clone();
    assert!(badges.iter().any(|b| b["name"] == "First Steps"));
    let count_after_first = badges.len();

    // A second review re-evaluates badges; the earned set must not grow
    // duplicates (words_learned = 2 unlocks nothing new)
    review(&state, &token, &id, "known").await;

    let progress = fetch_progress(&state, &token).await;
    assert_eq!(progress["badges"].as_array().unwrap().len(), count_after_first);
}

// =============================================================================
// Bulk import
// =============================================================================

#[tokio::test]
async fn test_bulk_import_requires_admin() {
    let state = setup_state().await;
    let token = signup(&state, "anna@example.com").await;

    let response = build_router(state)
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary/import",
            &token,
            &json!({ "format": "pipe", "text": "Hallo | Hello | Greetings" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_import_pipe_success() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;

    let text = "Hallo | Hello | Greetings\nWasser | Water | Ein Glas Wasser | Drinks";
    let response = build_router(state.clone())
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary/import",
            &admin,
            &json!({ "format": "pipe", "text": text }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["imported"], 2);
    assert_eq!(body["attempted"], 2);
    assert_eq!(body["status"], "Imported 2 of 2 entries");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_bulk_import_pipe_rejects_whole_batch_on_any_error() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;

    let text = "Hallo | Hello | Greetings\nX | Y | NotACategory";
    let response = build_router(state.clone())
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary/import",
            &admin,
            &json!({ "format": "pipe", "text": text }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["imported"], 0);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    // Nothing landed, including the valid first line
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_bulk_import_csv_accepts_valid_subset() {
    let state = setup_state().await;
    let admin = signup_admin(&state, "admin@example.com").await;

    let text = "word,meaning,example,category\n\
                Hallo,Hello,Hallo!,Greetings\n\
                Danke,Thank you,Danke schön!,Greetings\n\
                broken line\n\
                Wasser,Water,Ein Glas Wasser,Drinks\n\
                Zug,Train,Der Zug kommt,Travel";
    let response = build_router(state.clone())
        .oneshot(auth_json_request(
            "POST",
            "/api/vocabulary/import",
            &admin,
            &json!({ "format": "csv", "text": text }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["imported"], 4);
    assert_eq!(body["attempted"], 4);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary")
        .fetch_one(&state.db)
        .await
        .unwrap();
    assert_eq!(count, 4);
}
