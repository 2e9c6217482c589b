//! Drives the real router over TCP against mocked Aplos and Virtuous APIs.

use std::{net::SocketAddr, sync::LazyLock};

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    rsa::{
        Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey,
        pkcs8::{EncodePrivateKey, LineEnding},
        rand_core::OsRng,
    },
    secrecy::Secret,
    serde_json::{Value, json},
    steward_config::{
        AplosAuth, AplosCredentials, HttpSettings, ResolvedConfig, VirtuousCredentials,
    },
    steward_gateway::{GatewayState, build_gateway_app},
    wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    },
};

static KEY: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::new(&mut OsRng, 1024).unwrap());

const LONG_TOKEN: &str = "aplos-token-0123456789-abcdefghijklmnop";

fn escaped_pem() -> String {
    KEY.to_pkcs8_pem(LineEnding::LF)
        .unwrap()
        .replace('\n', "\\n")
}

fn encrypt_b64(plaintext: &str) -> String {
    let public = RsaPublicKey::from(&*KEY);
    STANDARD.encode(
        public
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext.as_bytes())
            .unwrap(),
    )
}

fn config(server: &MockServer) -> ResolvedConfig {
    ResolvedConfig {
        aplos: Some(AplosCredentials {
            client_id: "client-42".into(),
            auth: AplosAuth::PrivateKey(Secret::new(escaped_pem())),
            token_url: None,
            // No trailing slash on purpose.
            base_url: Some(format!("{}/hermes/api/v1", server.uri())),
            fetch_accounts: true,
        }),
        virtuous: Some(VirtuousCredentials {
            username: "ops@example.org".into(),
            password: Secret::new("pw".into()),
            token_url: format!("{}/Token", server.uri()),
        }),
        http: HttpSettings::default(),
    }
}

async fn mount_aplos_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/hermes/api/v1/auth/client-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"token": encrypt_b64(LONG_TOKEN)}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hermes/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"resource_count": 3},
            "data": {"accounts": [{"account_number": 1000, "name": "Checking"}]}
        })))
        .mount(server)
        .await;
}

async fn mount_virtuous(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/Token"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn spawn_gateway(config: &ResolvedConfig) -> SocketAddr {
    let state = GatewayState::from_config(config).unwrap();
    let app = build_gateway_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn get_report(addr: SocketAddr) -> Value {
    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn both_providers_succeed() {
    let server = MockServer::start().await;
    mount_aplos_ok(&server).await;
    mount_virtuous(&server, 200, json!({"access_token": "xyz", "token_type": "bearer"})).await;

    let addr = spawn_gateway(&config(&server)).await;
    let report = get_report(addr).await;

    assert_eq!(
        report,
        json!({
            "aplos": {
                "status": "success",
                "token_preview": "aplos-token-01234567...",
                "sample_account": {"account_number": 1000, "name": "Checking"},
                "resource_count": 3
            },
            "virtuous": {"status": "success", "token_preview": "xyz..."}
        })
    );

    let body = report.to_string();
    assert!(!body.contains(LONG_TOKEN), "full token leaked: {body}");
}

#[tokio::test]
async fn aplos_runs_before_virtuous() {
    let server = MockServer::start().await;
    mount_aplos_ok(&server).await;
    mount_virtuous(&server, 200, json!({"access_token": "xyz"})).await;

    let addr = spawn_gateway(&config(&server)).await;
    get_report(addr).await;

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, vec![
        "/hermes/api/v1/auth/client-42",
        "/hermes/api/v1/accounts",
        "/Token",
    ]);
}

#[tokio::test]
async fn each_request_reacquires_tokens() {
    let server = MockServer::start().await;
    mount_aplos_ok(&server).await;
    mount_virtuous(&server, 200, json!({"access_token": "xyz"})).await;

    let addr = spawn_gateway(&config(&server)).await;
    get_report(addr).await;
    get_report(addr).await;

    let token_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/Token")
        .count();
    assert_eq!(token_calls, 2);
}

#[tokio::test]
async fn providers_fail_independently() {
    for status in [401u16, 403, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hermes/api/v1/auth/client-42"))
            .respond_with(ResponseTemplate::new(status).set_body_string("denied"))
            .mount(&server)
            .await;
        mount_virtuous(&server, 200, json!({"access_token": "xyz"})).await;

        let addr = spawn_gateway(&config(&server)).await;
        let report = get_report(addr).await;

        assert_eq!(report["aplos"]["status"], "error", "{status}");
        assert_eq!(report["aplos"]["kind"], "auth");
        assert!(
            report["aplos"]["message"]
                .as_str()
                .unwrap()
                .contains(&status.to_string())
        );
        assert_eq!(report["virtuous"]["status"], "success");
        assert_eq!(report["virtuous"]["token_preview"], "xyz...");
    }
}

#[tokio::test]
async fn virtuous_failure_keeps_aplos_success() {
    let server = MockServer::start().await;
    mount_aplos_ok(&server).await;
    mount_virtuous(&server, 401, json!({"error": "invalid_grant"})).await;

    let addr = spawn_gateway(&config(&server)).await;
    let report = get_report(addr).await;

    assert_eq!(report["aplos"]["status"], "success");
    assert_eq!(report["virtuous"]["status"], "error");
    assert_eq!(report["virtuous"]["kind"], "auth");
}

#[tokio::test]
async fn both_failing_still_returns_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hermes/api/v1/auth/client-42"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_virtuous(&server, 200, json!({"unexpected": true})).await;

    let addr = spawn_gateway(&config(&server)).await;
    let report = get_report(addr).await;

    assert_eq!(report["aplos"]["kind"], "empty_response");
    assert_eq!(report["virtuous"]["kind"], "protocol");
}

#[tokio::test]
async fn account_fetch_failure_is_aplos_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hermes/api/v1/auth/client-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"token": encrypt_b64("abc123")}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hermes/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mount_virtuous(&server, 200, json!({"access_token": "xyz"})).await;

    let addr = spawn_gateway(&config(&server)).await;
    let report = get_report(addr).await;

    assert_eq!(report["aplos"]["status"], "error");
    assert_eq!(report["aplos"]["kind"], "fetch");
    assert_eq!(report["virtuous"]["status"], "success");
}

#[tokio::test]
async fn fetch_disabled_omits_sample() {
    let server = MockServer::start().await;
    mount_aplos_ok(&server).await;
    mount_virtuous(&server, 200, json!({"access_token": "xyz"})).await;

    let mut cfg = config(&server);
    if let Some(aplos) = cfg.aplos.as_mut() {
        aplos.fetch_accounts = false;
    }
    let addr = spawn_gateway(&cfg).await;
    let report = get_report(addr).await;

    assert_eq!(report["aplos"]["status"], "success");
    assert!(report["aplos"].get("sample_account").is_none());
}

#[tokio::test]
async fn health_lists_configured_providers() {
    let server = MockServer::start().await;
    let mut cfg = config(&server);
    cfg.virtuous = None;

    let addr = spawn_gateway(&cfg).await;
    let health: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health["status"], "ok");
    assert_eq!(health["providers"], json!({"aplos": true, "virtuous": false}));
}
