//! End-to-end HTTP scenarios from `SPEC_FULL.md` §8, driven directly
//! against the `axum` router via `tower::ServiceExt::oneshot` (no real
//! socket needed).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use commchain_core::LedgerConfig;
use commchain_rpc::config::ServerConfigBuilder;
use commchain_rpc::state::AppState;
use commchain_rpc::build_router;

const TOKEN: &str = "test-token";

fn new_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = LedgerConfig {
        block_log_path: dir.path().join("blockchain.json"),
        transactions_log_path: dir.path().join("transactions.tsv"),
        difficulty: 0,
    };
    let config = ServerConfigBuilder::new(TOKEN).ledger(ledger).finish();
    let blocklog = commchain_core::BlockLog::new(
        &config.ledger.block_log_path,
        &config.ledger.transactions_log_path,
    )
    .unwrap();
    let state = AppState::new(blocklog, config);
    (build_router(state), dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn post_json(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn fresh_init_has_no_last_block_but_a_valid_genesis_chain() {
    let (app, _dir) = new_app();

    let response = app.clone().oneshot(get("/get_last_block")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/validate_chain")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "The blockchain is valid.");
}

#[tokio::test]
async fn add_simple_block_links_to_genesis_and_updates_chain_length() {
    let (app, _dir) = new_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": ["hello"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["block"]["index"], 1);
    assert_eq!(body["block"]["data"], json!(["hello"]));

    let response = app.oneshot(get("/get_chain")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["length"], 2);
}

#[tokio::test]
async fn add_transaction_and_query_balances() {
    let (app, _dir) = new_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 5, "method": "transfer"}}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/get_balance?user=a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["balance"], -5);

    let response = app.clone().oneshot(get("/get_balance?user=b")).await.unwrap();
    assert_eq!(body_json(response).await["balance"], 5);

    let response = app.oneshot(get("/get_balance?user=c")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reaction_is_excluded_from_sender_balance() {
    let (app, _dir) = new_app();

    app.clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 5, "method": "transfer"}}]}),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 1, "method": "reaction"}}]}),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/get_balance?user=a")).await.unwrap();
    assert_eq!(body_json(response).await["balance"], -5);

    let response = app.oneshot(get("/get_balance?user=b")).await.unwrap();
    assert_eq!(body_json(response).await["balance"], 6);
}

#[tokio::test]
async fn rejections_return_400() {
    let (app, _dir) = new_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 0, "method": "transfer"}}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("amount"));

    let response = app
        .clone()
        .oneshot(post_json("/add_block", None, json!({"data": ["hello"]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 1, "method": "t", "foo": 1}}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repair_rebuilds_a_truncated_transactions_file() {
    let (app, dir) = new_app();

    app.clone()
        .oneshot(post_json(
            "/add_block",
            Some(TOKEN),
            json!({"data": [{"transaction": {"sender": "a", "receiver": "b", "amount": 5, "method": "transfer"}}]}),
        ))
        .await
        .unwrap();

    let tx_path = dir.path().join("transactions.tsv");
    std::fs::write(&tx_path, "Time\tSender\tReceiver\tAmount\tMethod\n").unwrap();

    let response = app
        .clone()
        .oneshot(get("/validate_transactions?repair=true&force=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/validate_transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn download_chain_404_then_200() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = LedgerConfig {
        block_log_path: dir.path().join("blockchain.json"),
        transactions_log_path: dir.path().join("transactions.tsv"),
        difficulty: 0,
    };
    let config = ServerConfigBuilder::new(TOKEN).ledger(ledger).finish();
    let blocklog = commchain_core::BlockLog::new(
        &config.ledger.block_log_path,
        &config.ledger.transactions_log_path,
    )
    .unwrap();
    let state = AppState::new(blocklog, config);
    let app = build_router(state);

    let response = app.oneshot(get("/download_chain")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn shutdown_requires_token_and_notifies() {
    let (app, _dir) = new_app();

    let response = app
        .clone()
        .oneshot(post_json("/shutdown", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/shutdown", Some(TOKEN), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
