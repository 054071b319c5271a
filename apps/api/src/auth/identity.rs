//! Identity provider client (Identity Toolkit REST API).
//!
//! Token verification and the verification / password-reset emails are
//! delegated entirely to the provider; this module only shapes the calls.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Provider error codes that mean the caller's token is unusable.
const TOKEN_ERRORS: [&str; 4] = [
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_NOT_FOUND",
    "USER_DISABLED",
];

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Request rejected by identity provider: {0}")]
    Rejected(String),

    #[error("Identity API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The account behind a verified ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
    async fn send_verification_email(&self, id_token: &str) -> Result<(), IdentityError>;
    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<VerifiedIdentity>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
        }
    }

    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = self
            .client
            .post(format!("{}/accounts:{method}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Identity call accounts:{method} succeeded");
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self.post("lookup", json!({ "idToken": id_token })).await?;
        let lookup: LookupResponse = response.json().await?;
        lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::InvalidToken("no account for token".to_string()))
    }

    async fn send_verification_email(&self, id_token: &str) -> Result<(), IdentityError> {
        self.post(
            "sendOobCode",
            json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token }),
        )
        .await?;
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        self.post(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )
        .await?;
        Ok(())
    }
}

/// Maps an error response to `IdentityError` by the provider's message code.
fn classify_error(status: u16, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    // Codes may carry a suffix, e.g. "TOKEN_EXPIRED : ..."
    let code = message.split_whitespace().next().unwrap_or_default();

    if TOKEN_ERRORS.contains(&code) {
        IdentityError::InvalidToken(message)
    } else if status == 400 {
        IdentityError::Rejected(message)
    } else {
        IdentityError::Api { status, message }
    }
}
