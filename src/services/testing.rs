use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use reqwest::StatusCode;
use serde_json::Value;

struct FakeState {
    login: (StatusCode, String),
    deposit: (StatusCode, String),
    logins: AtomicUsize,
    deposits: AtomicUsize,
    last_login: Mutex<Option<Value>>,
    last_deposit: Mutex<Option<(Option<String>, Value)>>,
}

/// A provider double served on a local port with scripted replies.
pub struct FakeProvider {
    pub url: String,
    state: Arc<FakeState>,
}

impl FakeProvider {
    pub async fn start(login: (u16, &str), deposit: (u16, &str)) -> Self {
        let state = Arc::new(FakeState {
            login: (StatusCode::from_u16(login.0).unwrap(), login.1.to_string()),
            deposit: (StatusCode::from_u16(deposit.0).unwrap(), deposit.1.to_string()),
            logins: AtomicUsize::new(0),
            deposits: AtomicUsize::new(0),
            last_login: Mutex::new(None),
            last_deposit: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/auth/login", post(login_route))
            .route("/api/payments/deposit", post(deposit_route))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, state }
    }

    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    pub fn deposits(&self) -> usize {
        self.state.deposits.load(Ordering::SeqCst)
    }

    pub fn last_login(&self) -> Option<Value> {
        self.state.last_login.lock().unwrap().clone()
    }

    /// Authorization header and JSON body of the latest deposit call.
    pub fn last_deposit(&self) -> Option<(Option<String>, Value)> {
        self.state.last_deposit.lock().unwrap().clone()
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

async fn login_route(
    State(state): State<Arc<FakeState>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.logins.fetch_add(1, Ordering::SeqCst);
    *state.last_login.lock().unwrap() = Some(body);

    state.login.clone()
}

async fn deposit_route(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.deposits.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_deposit.lock().unwrap() = Some((authorization, body));

    state.deposit.clone()
}
