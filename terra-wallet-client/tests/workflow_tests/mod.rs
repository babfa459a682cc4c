//! End-to-end workflow runs against a mock wallet service
//!
//! Each test starts its own mock, runs the workflow once and checks which
//! requests reached the service, in which order and with which bodies.

use std::sync::Once;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use terra_wallet_client::{
    client::WalletClient,
    config::Config,
    error::WalletError,
    models::tx::ResponseBody,
    workflow::{Step, Workflow, WorkflowReport},
};

#[path = "../api_tests/helpers.rs"]
mod helpers;
use helpers::{closed_port_url, spawn_mock_wallet};

static INIT: Once = Once::new();

/// Initializes the global logger (only once).
pub fn init_logger() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("terra_wallet_client=debug".parse().unwrap())
            .add_directive("actix_web=error".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

async fn run_against(base_url: &str, encode: bool) -> WorkflowReport {
    let mut config = Config::default();
    config.service.base_url = base_url.to_string();
    config.workflow.encode = encode;

    let client = WalletClient::new(base_url).expect("Failed to build client");
    Workflow::new(client, config).run().await
}

#[actix_web::test]
async fn test_send_sign_broadcast_happy_path() {
    init_logger();

    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 200, r#"{"tx":"unsigned"}"#),
        ("/tx/sign", 200, r#"{"tx":"signed"}"#),
        ("/tx/broadcast", 200, r#"{"result":"ok"}"#),
    ]);

    let report = run_against(&mock.base_url, false).await;

    assert!(report.is_success(), "failure: {:?}", report.failure);
    assert_eq!(report.broadcast, Some(ResponseBody::from(r#"{"result":"ok"}"#)));
    assert_eq!(report.completed, vec![Step::BankSend, Step::Sign, Step::Broadcast]);
    assert_eq!(mock.paths(), vec!["/tx/bank/send", "/tx/sign", "/tx/broadcast"]);

    mock.stop().await;
}

#[actix_web::test]
async fn test_bodies_flow_verbatim_between_steps() {
    init_logger();

    let unsigned = r#"{"type":"core/StdTx","value":{"msg":[],"memo":"937767194"}}"#;
    let signed = r#"{"type":"core/StdTx","value":{"signatures":[{"signature":"c2ln"}]}}"#;
    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 200, unsigned),
        ("/tx/sign", 200, signed),
        ("/tx/broadcast", 200, r#"{"height":"0","txhash":"ABCD"}"#),
    ]);

    let report = run_against(&mock.base_url, false).await;
    assert!(report.is_success());

    let requests = mock.requests();

    // The unsigned tx is embedded byte for byte under "tx".
    let sign_body = &requests[1].body;
    assert!(sign_body.starts_with(&format!(r#"{{"tx":{unsigned},"#)), "sign body: {sign_body}");
    let sign_json: Value = serde_json::from_str(sign_body).unwrap();
    assert_eq!(sign_json["name"], "tmp");
    assert_eq!(sign_json["passphrase"], "12345678");
    assert_eq!(sign_json["chain_id"], "columbus-2");
    assert_eq!(sign_json["account_number"], "93");
    assert_eq!(sign_json["sequence"], "64");

    // The signed tx is the whole broadcast body.
    assert_eq!(requests[2].body, signed);

    mock.stop().await;
}

#[actix_web::test]
async fn test_send_failure_stops_the_run() {
    init_logger();

    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 500, r#"{"error":"simulation failed"}"#),
        ("/tx/sign", 200, r#"{"tx":"signed"}"#),
        ("/tx/broadcast", 200, r#"{"result":"ok"}"#),
    ]);

    let report = run_against(&mock.base_url, false).await;

    let failure = report.failure.expect("send should fail");
    assert_eq!(failure.step, Step::BankSend);
    assert_eq!(failure.error.status(), Some(500));
    assert!(report.broadcast.is_none());
    assert_eq!(mock.paths(), vec!["/tx/bank/send"]);

    mock.stop().await;
}

#[actix_web::test]
async fn test_sign_failure_skips_broadcast() {
    init_logger();

    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 200, r#"{"tx":"unsigned"}"#),
        ("/tx/sign", 401, r#"{"error":"invalid passphrase"}"#),
        ("/tx/broadcast", 200, r#"{"result":"ok"}"#),
    ]);

    let report = run_against(&mock.base_url, false).await;

    let failure = report.failure.expect("sign should fail");
    assert_eq!(failure.step, Step::Sign);
    assert_eq!(failure.error.service_message().as_deref(), Some("invalid passphrase"));
    assert_eq!(mock.paths(), vec!["/tx/bank/send", "/tx/sign"]);

    mock.stop().await;
}

#[actix_web::test]
async fn test_encode_variant_adds_one_request() {
    init_logger();

    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 200, r#"{"tx":"unsigned"}"#),
        ("/tx/sign", 200, r#"{"tx":"signed"}"#),
        ("/tx/encode", 200, r#"{"tx":"AQIDBA=="}"#),
        ("/tx/broadcast", 200, r#"{"result":"ok"}"#),
    ]);

    let report = run_against(&mock.base_url, true).await;

    assert!(report.is_success());
    assert_eq!(report.encoded_tx, Some(ResponseBody::from(r#"{"tx":"AQIDBA=="}"#)));
    assert_eq!(
        mock.paths(),
        vec!["/tx/bank/send", "/tx/sign", "/tx/encode", "/tx/broadcast"]
    );

    let requests = mock.requests();
    let encode_body: Value = serde_json::from_str(&requests[2].body).unwrap();
    assert_eq!(encode_body, json!({ "tx": { "tx": "signed" } }));
    // Broadcast still gets the signed tx, not the encoded one.
    assert_eq!(requests[3].body, r#"{"tx":"signed"}"#);

    mock.stop().await;
}

#[actix_web::test]
async fn test_encode_failure_skips_broadcast() {
    init_logger();

    let mock = spawn_mock_wallet(&[
        ("/tx/bank/send", 200, r#"{"tx":"unsigned"}"#),
        ("/tx/sign", 200, r#"{"tx":"signed"}"#),
        ("/tx/encode", 400, r#"{"error":"bad tx"}"#),
        ("/tx/broadcast", 200, r#"{"result":"ok"}"#),
    ]);

    let report = run_against(&mock.base_url, true).await;

    assert_eq!(report.failure.map(|f| f.step), Some(Step::Encode));
    assert_eq!(mock.paths(), vec!["/tx/bank/send", "/tx/sign", "/tx/encode"]);

    mock.stop().await;
}

#[actix_web::test]
async fn test_unreachable_service_fails_first_step() {
    init_logger();

    let report = run_against(&closed_port_url(), false).await;

    let failure = report.failure.expect("transport should fail");
    assert_eq!(failure.step, Step::BankSend);
    assert!(matches!(failure.error, WalletError::Transport(_)), "got {:?}", failure.error);
    assert!(report.completed.is_empty());
}
