use anyhow::{ensure, Context, Result};
use chatgate::{
    app_lib::{AppConfig, FileStore, KeyValueStore, MemoryStore},
    features::{
        auth::{
            AccountGateway, AuthFailure, AuthOrchestrator, LogoutOutcome, RegistrationPhase,
            SessionPhase, SessionStore,
        },
        profile::ProfileStore,
    },
};
use secrecy::SecretString;
use serde_json::json;
use std::{net::TcpListener, sync::Arc, time::Duration};
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

struct Harness {
    server: MockServer,
    storage: Arc<dyn KeyValueStore>,
    orchestrator: AuthOrchestrator,
}

impl Harness {
    async fn new() -> Result<Self> {
        Self::with_storage(Arc::new(MemoryStore::new())).await
    }

    async fn with_storage(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let server = MockServer::start().await;
        let config = AppConfig::new()
            .with_api_base_url(format!("{}/api/v2", server.uri()))
            .with_timeout_seconds(5)
            .normalize();
        let gateway = AccountGateway::new(&config, storage.clone())?;
        let orchestrator = AuthOrchestrator::new(gateway, SessionStore::new(), ProfileStore::new());

        Ok(Self {
            server,
            storage,
            orchestrator,
        })
    }

    async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).ok().flatten()
    }
}

fn password() -> SecretString {
    SecretString::from("p")
}

#[tokio::test]
async fn sign_in_sets_account_and_tokens() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/signin"))
        .and(body_json(json!({"email": "a@b.com", "password": "p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "x",
            "refreshToken": "y",
            "account": {"accountId": "1", "email": "a@b.com", "role": "customer", "isVerified": true}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let account = h.orchestrator.sign_in("a@b.com", &password()).await?;
    ensure!(account.account_id == "1", "unexpected account {account:?}");

    let state = h.orchestrator.session().snapshot();
    assert_eq!(state.account.map(|a| a.account_id), Some("1".to_string()));
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(h.orchestrator.session().snapshot().phase(), SessionPhase::Authenticated);

    assert_eq!(h.stored("accessToken").as_deref(), Some("x"));
    assert_eq!(h.stored("refreshToken").as_deref(), Some("y"));
    Ok(())
}

#[tokio::test]
async fn failed_sign_in_records_server_reason() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/signin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&h.server)
        .await;

    let result = h.orchestrator.sign_in("a@b.com", &password()).await;
    assert_eq!(
        result,
        Err(AuthFailure::Rejected("Invalid credentials".to_string()))
    );

    let state = h.orchestrator.session().snapshot();
    assert_eq!(state.account, None);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert_eq!(state.phase(), SessionPhase::AuthError);
    assert_eq!(h.stored("accessToken"), None);
    Ok(())
}

#[tokio::test]
async fn register_then_verify_otp() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accountId": "42",
            "accountType": "customer",
            "otpSuccess": true,
            "message": "Code sent"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/verify-otp"))
        .and(body_json(json!({"accountId": "42", "otp": "0719"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&h.server)
        .await;

    let registration = h.orchestrator.register("new@b.com", &password()).await?;
    assert_eq!(registration.account_id, "42");

    let state = h.orchestrator.session().snapshot();
    assert!(state.is_registered);
    assert_eq!(state.account, None);
    assert_eq!(state.registration(), RegistrationPhase::AwaitingOtp);
    assert_eq!(h.stored("pendingAccountId").as_deref(), Some("42"));

    h.orchestrator.verify_otp("0719").await?;

    let state = h.orchestrator.session().snapshot();
    assert!(state.otp_success);
    assert_eq!(state.registration(), RegistrationPhase::Verified);
    assert_eq!(h.stored("pendingAccountId"), None);
    Ok(())
}

#[tokio::test]
async fn malformed_otp_is_rejected_locally() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("pendingAccountId", "42")?;

    let result = h.orchestrator.verify_otp("07k9").await;
    assert_eq!(
        result,
        Err(AuthFailure::Validation("Enter a valid 4-digit code".to_string()))
    );
    assert_eq!(
        h.orchestrator.session().snapshot().error.as_deref(),
        Some("Enter a valid 4-digit code")
    );
    assert_eq!(h.request_count().await, 0);
    assert_eq!(h.stored("pendingAccountId").as_deref(), Some("42"));
    Ok(())
}

#[tokio::test]
async fn verify_otp_without_pending_account() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;

    let result = h.orchestrator.verify_otp("1234").await;
    assert_eq!(
        result,
        Err(AuthFailure::Validation(
            "Missing accountId. Please register again".to_string()
        ))
    );
    assert_eq!(h.request_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn rejected_otp_keeps_pending_account() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("pendingAccountId", "42")?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/verify-otp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Code expired"})))
        .mount(&h.server)
        .await;

    let result = h.orchestrator.verify_otp("1234").await;
    assert_eq!(result, Err(AuthFailure::Rejected("Code expired".to_string())));

    let state = h.orchestrator.session().snapshot();
    assert!(!state.otp_success);
    assert_eq!(state.error.as_deref(), Some("Code expired"));
    assert_eq!(h.stored("pendingAccountId").as_deref(), Some("42"));
    Ok(())
}

#[tokio::test]
async fn logout_rejected_by_server_still_clears_everything() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("accessToken", "x")?;
    h.storage.set("refreshToken", "y")?;
    h.storage.set("pendingAccountId", "42")?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/logout"))
        .and(header("authorization", "Bearer x"))
        .and(body_json(json!({"refreshToken": "y"})))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = h.orchestrator.logout().await;
    assert_eq!(
        outcome,
        LogoutOutcome::LocalOnly {
            warning: "boom".to_string()
        }
    );

    let state = h.orchestrator.session().snapshot();
    assert_eq!(state.account, None);
    assert!(!state.is_registered);
    assert!(!state.otp_success);
    assert_eq!(h.orchestrator.profile().snapshot().account, None);
    for key in ["accessToken", "refreshToken", "pendingAccountId"] {
        assert_eq!(h.stored(key), None, "{key} survived logout");
    }
    Ok(())
}

#[tokio::test]
async fn logout_without_refresh_token_makes_no_request() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("accessToken", "x")?;

    let outcome = h.orchestrator.logout().await;
    assert_eq!(
        outcome,
        LogoutOutcome::LocalOnly {
            warning: "No refresh token found".to_string()
        }
    );
    assert_eq!(h.request_count().await, 0);
    assert_eq!(h.stored("accessToken"), None);
    Ok(())
}

#[tokio::test]
async fn refresh_rejection_forces_account_absent() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "x",
            "refreshToken": "y",
            "account": {"accountId": "1"}
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&h.server)
        .await;

    h.orchestrator.sign_in("a@b.com", &password()).await?;
    assert!(h.orchestrator.session().snapshot().is_authenticated());

    let result = h.orchestrator.refresh().await;
    assert_eq!(
        result,
        Err(AuthFailure::SessionExpired(
            "Session expired, please sign in again".to_string()
        ))
    );

    let state = h.orchestrator.session().snapshot();
    assert_eq!(state.account, None);
    assert_eq!(
        state.error.as_deref(),
        Some("Session expired, please sign in again")
    );
    assert_eq!(h.stored("accessToken"), None);
    assert_eq!(h.stored("refreshToken"), None);
    Ok(())
}

#[tokio::test]
async fn refresh_replaces_access_token() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("accessToken", "old")?;
    h.storage.set("refreshToken", "y")?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/refresh"))
        .and(body_json(json!({"refreshToken": "y"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .mount(&h.server)
        .await;

    h.orchestrator.refresh().await?;
    assert_eq!(h.stored("accessToken").as_deref(), Some("new"));
    assert_eq!(h.stored("refreshToken").as_deref(), Some("y"));
    Ok(())
}

#[tokio::test]
async fn profile_fetch_failure_clears_profile() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    h.storage.set("accessToken", "x")?;
    Mock::given(method("GET"))
        .and(path("/api/v2/account/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {"accountId": "1", "name": "Ada", "email": "a@b.com"}
        })))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/account/me"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;

    let account = h.orchestrator.fetch_profile().await?;
    assert_eq!(account.name.as_deref(), Some("Ada"));
    assert!(h.orchestrator.profile().snapshot().account.is_some());

    let result = h.orchestrator.fetch_profile().await;
    assert_eq!(
        result,
        Err(AuthFailure::Rejected("Failed to fetch profile".to_string()))
    );

    let profile = h.orchestrator.profile().snapshot();
    assert_eq!(profile.account, None);
    assert!(!profile.loading);
    assert_eq!(profile.error.as_deref(), Some("Failed to fetch profile"));
    Ok(())
}

#[tokio::test]
async fn session_survives_restart_through_file_store() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let dir = tempfile::tempdir()?;
    let state_file = dir.path().join("session.json");

    let h = Harness::with_storage(Arc::new(FileStore::open(&state_file)?)).await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "x",
            "refreshToken": "y",
            "account": {"accountId": "1"}
        })))
        .mount(&h.server)
        .await;
    h.orchestrator.sign_in("a@b.com", &password()).await?;

    let reopened = FileStore::open(&state_file).context("reopen state file")?;
    assert_eq!(reopened.get("accessToken")?.as_deref(), Some("x"));
    assert_eq!(reopened.get("refreshToken")?.as_deref(), Some("y"));
    Ok(())
}

// Register and logout are not serialized: a registration that resolves after
// logout cleanup writes its pending id back.
#[tokio::test]
async fn register_resolving_after_logout_leaves_pending_id() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind to localhost");
        return Ok(());
    }

    let h = Harness::new().await?;
    Mock::given(method("POST"))
        .and(path("/api/v2/account/register"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"accountId": "42"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&h.server)
        .await;

    let password = password();
    let (registration, outcome) = tokio::join!(
        h.orchestrator.register("new@b.com", &password),
        h.orchestrator.logout()
    );

    assert!(registration.is_ok());
    assert!(matches!(outcome, LogoutOutcome::LocalOnly { .. }));
    assert_eq!(h.stored("pendingAccountId").as_deref(), Some("42"));
    assert!(h.orchestrator.session().snapshot().is_registered);
    Ok(())
}
