//! Axum route handlers for the Auth API.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{required, AppError, ReportedError};
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct EmailSentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/auth/sync
///
/// Verifies the caller's ID token and mirrors the account into the users table.
pub async fn handle_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SyncResponse>, ReportedError> {
    let expose = state.config.expose_error_details();
    let sync = async {
        let token = bearer_token(&headers)?;
        let identity = state.identity.verify_token(token).await?;
        let user = state.users.upsert(&identity).await?;
        info!("Synced user {}", user.external_id);
        Ok::<_, AppError>(SyncResponse { user })
    };
    sync.await.map(Json).map_err(|e| e.reported(expose))
}

/// POST /api/auth/send-verification-email
pub async fn handle_send_verification_email(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EmailSentResponse>, ReportedError> {
    let expose = state.config.expose_error_details();
    let send = async {
        let token = bearer_token(&headers)?;
        state.identity.send_verification_email(token).await?;
        Ok::<_, AppError>(EmailSentResponse {
            success: true,
            message: "Verification email sent".to_string(),
        })
    };
    send.await.map(Json).map_err(|e| e.reported(expose))
}

/// POST /api/auth/send-password-reset-email
pub async fn handle_send_password_reset_email(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<EmailSentResponse>, ReportedError> {
    let expose = state.config.expose_error_details();
    let send = async {
        let email = required(request.email, "email")?;
        state
            .identity
            .send_password_reset_email(email.trim())
            .await?;
        Ok::<_, AppError>(EmailSentResponse {
            success: true,
            message: "Password reset email sent".to_string(),
        })
    };
    send.await.map(Json).map_err(|e| e.reported(expose))
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{test_state_with, FakeIdentity, MemoryUserStore, VALID_TOKEN};

    fn request(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_err());
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_sync_without_token_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_state_with(dir.path(), FakeIdentity::default(), MemoryUserStore::default());
        let (status, body) = send(app, request("/api/auth/sync", None, json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing bearer token");
    }

    #[tokio::test]
    async fn test_sync_with_bad_token_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_state_with(dir.path(), FakeIdentity::default(), MemoryUserStore::default());
        let (status, _) = send(app, request("/api/auth/sync", Some("forged"), json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sync_upserts_once_per_uid() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryUserStore::default();
        let app = test_state_with(dir.path(), FakeIdentity::default(), store.clone());

        let (status, first) = send(
            app.clone(),
            request("/api/auth/sync", Some(VALID_TOKEN), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["user"]["externalId"], "uid-123");
        assert_eq!(first["user"]["email"], "jane@example.com");

        let (_, second) = send(app, request("/api/auth/sync", Some(VALID_TOKEN), json!({}))).await;
        assert_eq!(second["user"]["id"], first["user"]["id"]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_verification_email_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let identity = FakeIdentity::default();
        let app = test_state_with(dir.path(), identity.clone(), MemoryUserStore::default());

        let (status, _) = send(
            app.clone(),
            request("/api/auth/send-verification-email", None, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            app,
            request(
                "/api/auth/send-verification-email",
                Some(VALID_TOKEN),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(identity.emails_sent(), vec!["verify:uid-123".to_string()]);
    }

    #[tokio::test]
    async fn test_password_reset_requires_email() {
        let dir = tempfile::tempdir().unwrap();
        let identity = FakeIdentity::default();
        let app = test_state_with(dir.path(), identity.clone(), MemoryUserStore::default());

        let (status, _) = send(
            app.clone(),
            request("/api/auth/send-password-reset-email", None, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app,
            request(
                "/api/auth/send-password-reset-email",
                None,
                json!({"email": " jane@example.com "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password reset email sent");
        assert_eq!(
            identity.emails_sent(),
            vec!["reset:jane@example.com".to_string()]
        );
    }
}
