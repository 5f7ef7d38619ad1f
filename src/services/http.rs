use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::{auth::Authenticator, ServiceError};
use crate::models::pix::{DepositRequest, DepositResponse, ProviderDeposit, ProviderError};
use crate::repositories::provider::ProviderApi;
use crate::settings::{Callback, Settings};

/// Sent on every response so browsers on any origin can call the endpoint.
const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
];

#[derive(Clone)]
pub struct AppState {
    authenticator: Arc<Authenticator>,
    provider: Arc<ProviderApi>,
    callback: Arc<Callback>,
}

impl AppState {
    pub fn new(
        authenticator: Arc<Authenticator>,
        provider: Arc<ProviderApi>,
        callback: Callback,
    ) -> Self {
        Self {
            authenticator,
            provider,
            callback: Arc::new(callback),
        }
    }
}

fn respond(status: StatusCode, body: Option<Value>) -> Response {
    let mut response = match body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    };

    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}

async fn create_pix_deposit(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match method {
        Method::OPTIONS => return respond(StatusCode::OK, None),
        Method::POST => {}
        _ => {
            return respond(
                StatusCode::METHOD_NOT_ALLOWED,
                Some(json!({
                    "error": "Method not allowed",
                    "details": format!("{} is not supported, use POST", method)
                })),
            )
        }
    }

    let request_id = Uuid::new_v4();
    match new_deposit(&state, &uri, &headers, &body, request_id).await {
        Ok(deposit) => respond(StatusCode::OK, Some(json!(deposit))),
        Err(e) => error_response(e, request_id),
    }
}

async fn new_deposit(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Uuid,
) -> Result<DepositResponse, ServiceError> {
    let body: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(format!("Invalid JSON body: {}", e)))?;
    let request = DepositRequest::from_json(&body).map_err(ServiceError::Validation)?;
    let callback_url = callback_url(&state.callback, uri, headers)?;

    let token = state.authenticator.authenticate().await?;

    log::info!(
        "[{}] Creating deposit for external id {}.",
        request_id,
        request.external_id
    );
    let reply = state
        .provider
        .create_deposit(
            &token,
            &ProviderDeposit {
                amount: &request.amount,
                external_id: &request.external_id,
                client_callback_url: &callback_url,
                payer: &request.payer,
            },
        )
        .await?;

    if !reply.status.is_success() {
        return Err(ServiceError::Upstream {
            status: reply.status,
            body: reply.body,
        });
    }

    // Derived structs would also accept a JSON array by position.
    if !reply.body.is_object() {
        return Err(ServiceError::Protocol {
            reason: "Deposit response is not a JSON object".to_string(),
            status: reply.status,
            body: reply.body.to_string(),
        });
    }

    DepositResponse::deserialize(&reply.body).map_err(|e| ServiceError::Protocol {
        reason: format!("Unexpected deposit response: {}", e),
        status: reply.status,
        body: reply.body.to_string(),
    })
}

/// `{scheme}://{host}{path}`, where host comes from `X-Forwarded-Host`, then
/// `Host`, then the authority of the request URI (HTTP/2 `:authority`).
fn callback_url(
    callback: &Callback,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<String, ServiceError> {
    let host = ["x-forwarded-host", "host"]
        .into_iter()
        .filter_map(|name| headers.get(name))
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim())
        .chain(uri.authority().map(|authority| authority.as_str()))
        .find(|value| !value.is_empty())
        .ok_or_else(|| ServiceError::Validation("Missing host header".to_string()))?;

    Ok(format!("{}://{}{}", callback.scheme, host, callback.path))
}

fn error_response(error: ServiceError, request_id: Uuid) -> Response {
    match error {
        ServiceError::Validation(message) => {
            log::info!("[{}] Rejected request: {}", request_id, message);
            respond(StatusCode::BAD_REQUEST, Some(json!({ "error": message })))
        }
        ServiceError::Upstream { status, body } => {
            log::warn!("[{}] Provider answered {}: {}", request_id, status, body);
            let provider = if body.is_object() {
                ProviderError::deserialize(&body).unwrap_or_default()
            } else {
                ProviderError::default()
            };

            let mut out = Map::new();
            let error = provider
                .error
                .or_else(|| provider.message.clone())
                .unwrap_or_else(|| json!("Deposit creation failed"));
            out.insert("error".to_string(), error);
            if let Some(message) = provider.message {
                out.insert("message".to_string(), message);
            }
            out.insert("details".to_string(), body);

            respond(status, Some(Value::Object(out)))
        }
        other => {
            log::error!("[{}] Failed to create deposit: {}", request_id, other);
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(json!({
                    "error": "Internal server error",
                    "details": other.to_string()
                })),
            )
        }
    }
}

pub fn router(state: AppState, route: &str) -> Router {
    Router::new()
        .route(route, any(create_pix_deposit))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(
    settings: &Settings,
    authenticator: Arc<Authenticator>,
    provider: Arc<ProviderApi>,
) -> Result<(), anyhow::Error> {
    let state = AppState::new(authenticator, provider, settings.callback.clone());
    let app = router(state, &settings.server.route);

    let listener = tokio::net::TcpListener::bind(&settings.server.listen).await?;
    log::info!(
        "Listening on {}, deposits at {}.",
        listener.local_addr()?,
        settings.server.route
    );

    axum::serve(listener, app).await?;

    Ok(())
}
