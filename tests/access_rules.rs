//! Integration tests for the gateway routes, driven against fake clients

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use teo_gateway::teo::{
    DescribeL7AccRulesRequest, DescribeL7AccRulesResponse, ModifyL7AccRuleRequest,
    ModifyL7AccRuleResponse,
};
use teo_gateway::{router, AccessRuleApi, AppState, ClientFactory, TeoError};
use tower::ServiceExt;

/// What the fake remote saw
#[derive(Default)]
struct Recorded {
    describe: Vec<DescribeL7AccRulesRequest>,
    modify: Vec<ModifyL7AccRuleRequest>,
    clients_built: usize,
}

/// Canned answers for the fake remote
#[derive(Clone)]
enum Remote {
    Answer { list: Value, modify: Value },
    Fail { code: &'static str, message: &'static str },
}

struct FakeFactory {
    remote: Remote,
    recorded: Arc<Mutex<Recorded>>,
}

struct FakeClient {
    remote: Remote,
    recorded: Arc<Mutex<Recorded>>,
}

impl ClientFactory for FakeFactory {
    fn client(&self) -> Result<Box<dyn AccessRuleApi>, TeoError> {
        self.recorded.lock().unwrap().clients_built += 1;
        Ok(Box::new(FakeClient {
            remote: self.remote.clone(),
            recorded: self.recorded.clone(),
        }))
    }
}

fn remote_error(code: &str, message: &str) -> TeoError {
    TeoError::Api {
        code: code.to_string(),
        message: message.to_string(),
        request_id: "fake-request-id".to_string(),
    }
}

#[async_trait]
impl AccessRuleApi for FakeClient {
    async fn describe_rules(
        &self,
        request: DescribeL7AccRulesRequest,
    ) -> Result<DescribeL7AccRulesResponse, TeoError> {
        self.recorded.lock().unwrap().describe.push(request);
        match &self.remote {
            Remote::Answer { list, .. } => Ok(serde_json::from_value(list.clone()).unwrap()),
            Remote::Fail { code, message } => Err(remote_error(code, message)),
        }
    }

    async fn modify_rule(
        &self,
        request: ModifyL7AccRuleRequest,
    ) -> Result<ModifyL7AccRuleResponse, TeoError> {
        self.recorded.lock().unwrap().modify.push(request);
        match &self.remote {
            Remote::Answer { modify, .. } => Ok(serde_json::from_value(modify.clone()).unwrap()),
            Remote::Fail { code, message } => Err(remote_error(code, message)),
        }
    }
}

/// Factory that cannot build a client, like a missing `TEO_SECRET_KEY`
struct NoCredentials;

impl ClientFactory for NoCredentials {
    fn client(&self) -> Result<Box<dyn AccessRuleApi>, TeoError> {
        Err(TeoError::MissingCredential("TEO_SECRET_KEY"))
    }
}

fn list_response() -> Value {
    json!({
        "TotalCount": 2,
        "Rules": [
            {
                "RuleId": "rule-39pkyc9i5jk1",
                "RuleName": "block-scanners",
                "Status": "enable",
                "Branches": [{"Condition": "${http.request.ua} like ['*sqlmap*']"}]
            },
            {
                "RuleId": "rule-2qa7w0y4ne1p",
                "RuleName": "allow-office",
                "Status": "disable",
                "Branches": []
            }
        ],
        "RequestId": "a6f1b7d2-7c1e-4a4c-9e55-0d3b4f2e9c11"
    })
}

fn modify_response() -> Value {
    json!({"RequestId": "0c9e4b7a-3d2f-4e61-8b1a-7f6d5c4b3a29"})
}

fn setup(remote: Remote) -> (Router, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let factory = FakeFactory {
        remote,
        recorded: recorded.clone(),
    };
    (router(AppState::new(Arc::new(factory))), recorded)
}

fn answering() -> Remote {
    Remote::Answer {
        list: list_response(),
        modify: modify_response(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

/// Like `send`, but keeps the body as the exact text the gateway wrote
async fn send_raw(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, String::from_utf8(bytes.to_vec()).expect("body is utf-8"))
}

/// Remote that answers both actions with the given raw JSON text
fn answering_raw(list: &str, modify: &str) -> Remote {
    Remote::Answer {
        list: serde_json::from_str(list).unwrap(),
        modify: serde_json::from_str(modify).unwrap(),
    }
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================
// GET /access_rules/get_rules/:zone_id
// ============================================================

#[tokio::test]
async fn test_get_rules_returns_remote_response_verbatim() {
    let (app, recorded) = setup(answering());

    let (status, body) = send(
        app,
        Request::get("/access_rules/get_rules/zone-2o0i41pv2h8c")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, list_response());

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.describe.len(), 1);
    assert_eq!(
        recorded.describe[0],
        DescribeL7AccRulesRequest::for_zone("zone-2o0i41pv2h8c")
    );
}

#[tokio::test]
async fn test_get_rules_forwards_paging() {
    let (app, recorded) = setup(answering());

    let (status, _) = send(
        app,
        Request::get("/access_rules/get_rules/zone-abc?limit=50&offset=100")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.describe[0].zone_id, "zone-abc");
    assert_eq!(recorded.describe[0].limit, Some(50));
    assert_eq!(recorded.describe[0].offset, Some(100));
}

#[tokio::test]
async fn test_each_request_builds_its_own_client() {
    let (app, recorded) = setup(answering());

    for _ in 0..3 {
        let (status, _) = send(
            app.clone(),
            Request::get("/access_rules/get_rules/zone-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(recorded.lock().unwrap().clients_built, 3);
}

#[tokio::test]
async fn test_get_rules_relays_null_and_odd_fields_byte_for_byte() {
    let cases = [
        r#"{"TotalCount":0,"Rules":null,"Limit":null,"RequestId":"r1"}"#,
        r#"{"Foo":1}"#,
        r#"{"TotalCount":"3","Rules":{"not":"a list"},"RequestId":42}"#,
    ];

    for raw in cases {
        let (app, _) = setup(answering_raw(raw, "{}"));

        let (status, body) = send_raw(
            app,
            Request::get("/access_rules/get_rules/zone-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{raw}");
        assert_eq!(body, raw);
    }
}

// ============================================================
// PUT /access_rules/update_source
// ============================================================

#[tokio::test]
async fn test_update_forwards_body_unchanged() {
    let (app, recorded) = setup(answering());

    let payload = json!({
        "ZoneId": "zone-2o0i41pv2h8c",
        "Rule": {
            "RuleId": "rule-39pkyc9i5jk1",
            "RuleName": "block-scanners",
            "Status": "enable",
            "RulePriority": 10,
            "Branches": [{
                "Condition": "${http.request.ip} in ['203.0.113.7']",
                "Actions": [{"Name": "Deny"}]
            }]
        },
        "ExtraFieldFromNewerApi": true
    });

    let (status, body) = send(app, put_json("/access_rules/update_source", &payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, modify_response());

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.modify.len(), 1);
    assert_eq!(serde_json::to_value(&recorded.modify[0]).unwrap(), payload);
}

#[tokio::test]
async fn test_update_relays_nulls_both_ways() {
    let inbound = r#"{"ZoneId":null,"Rule":{"RuleId":"x","Branches":null}}"#;
    let remote = r#"{"Foo":1,"RequestId":null}"#;
    let (app, recorded) = setup(answering_raw("{}", remote));

    let (status, body) = send_raw(
        app,
        Request::builder()
            .method("PUT")
            .uri("/access_rules/update_source")
            .header("content-type", "application/json")
            .body(Body::from(inbound))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, remote);

    let recorded = recorded.lock().unwrap();
    assert_eq!(serde_json::to_string(&recorded.modify[0]).unwrap(), inbound);
}

#[tokio::test]
async fn test_update_does_not_validate_locally() {
    let (app, recorded) = setup(answering());

    let (status, _) = send(app, put_json("/access_rules/update_source", &json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recorded.lock().unwrap().modify.len(), 1);
}

// ============================================================
// Error propagation
// ============================================================

#[tokio::test]
async fn test_remote_error_propagates_unchanged() {
    let (app, _) = setup(Remote::Fail {
        code: "AuthFailure.SignatureFailure",
        message: "The provided credentials could not be validated.",
    });

    let (status, body) = send(
        app,
        Request::get("/access_rules/get_rules/zone-abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({
            "Error": {
                "Code": "AuthFailure.SignatureFailure",
                "Message": "The provided credentials could not be validated."
            },
            "RequestId": "fake-request-id"
        })
    );
}

#[tokio::test]
async fn test_update_remote_error_propagates() {
    let (app, _) = setup(Remote::Fail {
        code: "InvalidParameter.RuleNotFound",
        message: "Rule does not exist.",
    });

    let (status, body) = send(
        app,
        put_json("/access_rules/update_source", &json!({"ZoneId": "zone-abc"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["Error"]["Code"], "InvalidParameter.RuleNotFound");
}

#[tokio::test]
async fn test_missing_credentials_fail_the_call() {
    let app = router(AppState::new(Arc::new(NoCredentials)));

    let (status, body) = send(
        app,
        Request::get("/access_rules/get_rules/zone-abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["Error"]["Code"], "AuthFailure.MissingCredential");
    assert_eq!(body["Error"]["Message"], "TEO_SECRET_KEY is not set");
}

// ============================================================
// GET / and /health
// ============================================================

#[tokio::test]
async fn test_root_echoes_request_headers() {
    let (app, recorded) = setup(answering());

    let (status, body) = send(
        app,
        Request::get("/")
            .header("x-forwarded-for", "203.0.113.7")
            .header("User-Agent", "curl/8.5.0")
            .header("accept", "text/html")
            .header("accept", "application/json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "x-forwarded-for": "203.0.113.7",
            "user-agent": "curl/8.5.0",
            "accept": "text/html, application/json"
        })
    );
    assert_eq!(recorded.lock().unwrap().clients_built, 0);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup(answering());

    let (status, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
