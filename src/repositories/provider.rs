use reqwest::StatusCode;
use serde_json::Value;

use crate::models::{
    auth::{LoginRequest, LoginResponse},
    pix::ProviderDeposit,
};
use crate::services::ServiceError;

/// A bearer token as granted by the provider, after normalization.
#[derive(Debug)]
pub struct Grant {
    pub token: String,
    pub expires_in: Option<i64>,
}

/// Raw deposit reply: the provider's status plus its body parsed as JSON.
#[derive(Debug)]
pub struct DepositReply {
    pub status: StatusCode,
    pub body: Value,
}

pub struct ProviderApi {
    url: String,
    client: reqwest::Client,
}

impl ProviderApi {
    pub fn new(url: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn login(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Grant, ServiceError> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.url))
            .json(&LoginRequest {
                client_id,
                client_secret,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::Authentication { status, body });
        }

        let login: LoginResponse = match serde_json::from_str(&body) {
            Ok(login) => login,
            Err(e) => {
                return Err(ServiceError::Protocol {
                    reason: format!("Invalid login response: {}", e),
                    status,
                    body,
                })
            }
        };

        match login.bearer_token() {
            Some(token) => Ok(Grant {
                token: token.to_string(),
                expires_in: login.lifetime_secs(),
            }),
            None => Err(ServiceError::Protocol {
                reason: "Login response carries neither 'token' nor 'access_token'".to_string(),
                status,
                body,
            }),
        }
    }

    /// Any status is returned as-is; only a non-JSON body is an error here.
    pub async fn create_deposit(
        &self,
        token: &str,
        payload: &ProviderDeposit<'_>,
    ) -> Result<DepositReply, ServiceError> {
        let response = self
            .client
            .post(format!("{}/api/payments/deposit", self.url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(body) => Ok(DepositReply { status, body }),
            Err(e) => Err(ServiceError::Protocol {
                reason: format!("Invalid deposit response: {}", e),
                status,
                body,
            }),
        }
    }
}
