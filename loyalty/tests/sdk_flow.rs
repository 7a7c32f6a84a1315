//! End-to-end flows through the public API, with the process-wide config and HTTP client set
//! the way a host app sets them.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use loyalty::auth::{AuthProvider, AuthUseCase, TokenKind};
use loyalty::campaign::{Campaign, CampaignListCallback, CampaignUseCase};
use loyalty::error::{ApiError, UseCaseError};
use loyalty::history::extractor::{reset_history_extractor_config, set_history_extractor_config};
use loyalty::history::{
    HistoryButtonCatalog, HistoryExtractorConfig, HistoryStatusKind, HistoryUseCase,
};
use loyalty::primitives::{
    init_sdk_config, set_http_client, DeviceKeyValueStore, Environment, HttpError, HttpHeader,
    HttpMethod, KeyValueStoreError, LoyaltyHttpClient, SdkConfig,
};
use serde_json::json;
use serial_test::serial;
use tokio::sync::mpsc;

#[derive(Default)]
struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl DeviceKeyValueStore for MemoryStore {
    fn get(&self, key: String) -> Result<String, KeyValueStoreError> {
        self.values
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(KeyValueStoreError::KeyNotFound)
    }

    fn set(&self, key: String, value: String) -> Result<(), KeyValueStoreError> {
        self.values.lock().unwrap().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: String) -> Result<(), KeyValueStoreError> {
        self.values
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(KeyValueStoreError::KeyNotFound)
    }
}

struct Sent {
    url: String,
    method: HttpMethod,
    headers: Vec<HttpHeader>,
}

impl Sent {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

#[derive(Default)]
struct ScriptedHttp {
    responses: Mutex<VecDeque<Result<Vec<u8>, HttpError>>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedHttp {
    fn reset(&self) {
        self.responses.lock().unwrap().clear();
        self.sent.lock().unwrap().clear();
    }

    fn ok(&self, value: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(value.to_string().into_bytes()));
    }

    fn status(&self, code: u64, value: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(HttpError::BadStatusCode {
                code,
                response_body: value.to_string().into_bytes(),
            }));
    }

    fn take_sent(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

#[async_trait::async_trait]
impl LoyaltyHttpClient for ScriptedHttp {
    async fn fetch(
        &self,
        url: String,
        method: HttpMethod,
        headers: Vec<HttpHeader>,
        _body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, HttpError> {
        self.sent.lock().unwrap().push(Sent {
            url,
            method,
            headers,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpError::Generic {
                    message: "unexpected request".to_string(),
                })
            })
    }
}

static HTTP: OnceLock<Arc<ScriptedHttp>> = OnceLock::new();

/// Configures the SDK once per test binary and returns the shared HTTP script, emptied.
fn setup() -> Arc<ScriptedHttp> {
    let http = HTTP.get_or_init(|| {
        init_sdk_config(SdkConfig {
            environment: Environment::Staging,
            app_id: "app-42".to_string(),
            app_name: "flowtest".to_string(),
            subscription_key: None,
            api_base_url: "https://loyalty.example.com/".to_string(),
            image_base_url: "https://img.example.com".to_string(),
            default_locale: 1033,
            client_version: "ios_app_2.0.0".to_string(),
        })
        .unwrap();
        let http = Arc::new(ScriptedHttp::default());
        assert!(set_http_client(http.clone()));
        http
    });
    http.reset();
    http.clone()
}

fn new_auth() -> Arc<AuthProvider> {
    Arc::new(AuthProvider::new(Arc::new(MemoryStore::default())))
}

#[tokio::test]
#[serial]
async fn test_login_then_authenticated_call_then_logout() {
    let http = setup();
    let auth = new_auth();
    let auth_use_case = AuthUseCase::new(auth.clone());
    let campaigns = CampaignUseCase::new(auth.clone());

    http.ok(json!({ "UserID": "u-1", "Token": "tok-1", "EWalletToken": "ew-1" }));
    http.ok(json!([{ "ID": 1, "Name": "Coffee" }]));
    http.ok(json!({}));

    let login = auth_use_case
        .login("somchai".to_string(), "secret".to_string())
        .await
        .unwrap();
    assert_eq!(login.user_id.as_deref(), Some("u-1"));
    assert_eq!(auth.token(TokenKind::Token).unwrap().as_deref(), Some("tok-1"));
    assert_eq!(auth.locale(), 1033);

    let list = campaigns
        .list("campaign_main".to_string(), None, None, None)
        .await
        .unwrap();
    assert_eq!(list.len(), 1);

    auth_use_case.logout().await.unwrap();
    assert!(!auth.has_token(TokenKind::Token));

    let sent = http.take_sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].url, "https://loyalty.example.com/api/auth/login");
    assert_eq!(sent[0].header("App-Id"), Some("app-42"));
    assert_eq!(sent[0].header("Authorization"), None);
    assert_eq!(sent[1].method, HttpMethod::Get);
    assert_eq!(sent[1].header("Authorization"), Some("token tok-1"));
    assert_eq!(sent[1].header("Accept-Language"), Some("en"));
    assert_eq!(sent[2].url, "https://loyalty.example.com/api/auth/logout");
}

#[tokio::test]
#[serial]
async fn test_calls_without_session_do_not_reach_the_network() {
    let http = setup();
    let campaigns = CampaignUseCase::new(new_auth());

    let result = campaigns.redeem(5).await;

    assert!(matches!(result, Err(UseCaseError::NotAuthenticated { .. })));
    assert!(http.take_sent().is_empty());
}

#[tokio::test]
#[serial]
async fn test_history_display_uses_global_config() {
    let http = setup();
    let auth = new_auth();
    auth.set_token(TokenKind::Token, "tok".to_string()).unwrap();
    let history = HistoryUseCase::new(auth);
    set_history_extractor_config(HistoryExtractorConfig::english());

    http.ok(json!([
        { "ID": 1, "Type": 1, "RedeemKey": "RK-1", "VoucherExpireDate": 0 },
        { "ID": 2, "Type": 0, "HasWinner": true, "IsWinner": true, "RedeemKey": "RK-2" },
        { "ID": 3, "Type": 2, "Delivered": true, "IsShipped": true, "ParcelNo": "TH123" },
        { "ID": 4, "Type": 1, "IsUsed": true, "ExpireIn": -10 }
    ]));

    let entries = history
        .list_display("history_main".to_string(), Some(0), Some(4))
        .await
        .unwrap();
    reset_history_extractor_config();

    let kinds: Vec<_> = entries.iter().map(|e| e.display.status.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HistoryStatusKind::Redeemed,
            HistoryStatusKind::Winner,
            HistoryStatusKind::ShippedWithTracking,
            HistoryStatusKind::Expired,
        ]
    );
    assert_eq!(entries[0].display.button, HistoryButtonCatalog::UseCoupon);
    assert_eq!(entries[1].display.button_label.as_deref(), Some("Claim prize"));
    assert_eq!(
        entries[2].display.status.label,
        "Shipped, tracking no. TH123"
    );
    assert_eq!(entries[3].display.button, HistoryButtonCatalog::None);

    let sent = http.take_sent();
    assert_eq!(
        sent[0].url,
        "https://loyalty.example.com/api/history?config=history_main&skip=0&top=4"
    );
}

struct ChannelCallback(mpsc::UnboundedSender<Result<Vec<Campaign>, ApiError>>);

impl CampaignListCallback for ChannelCallback {
    fn on_success(&self, result: Vec<Campaign>) {
        self.0.send(Ok(result)).unwrap();
    }

    fn on_error(&self, error: ApiError) {
        self.0.send(Err(error)).unwrap();
    }
}

#[tokio::test]
#[serial]
async fn test_callback_delivery() {
    let http = setup();
    let auth = new_auth();
    auth.set_token(TokenKind::Token, "tok".to_string()).unwrap();
    let campaigns = Arc::new(CampaignUseCase::new(auth));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let callback = Arc::new(ChannelCallback(tx));

    http.ok(json!([{ "ID": 9 }]));
    http.status(
        410,
        json!({ "error": { "code": 410, "id": 2001, "message": "Campaign closed" } }),
    );

    campaigns
        .clone()
        .favourites_with_callback(None, None, callback.clone());
    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.unwrap()[0].id, Some(9));

    campaigns.favourites_with_callback(None, None, callback);
    let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let error = second.unwrap_err();
    assert_eq!(error.code, 410);
    assert_eq!(error.id.as_deref(), Some("2001"));
    assert_eq!(error.message, "Campaign closed");
}
