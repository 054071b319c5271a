pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::auth::handlers as auth;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/interview/question", post(interview::handle_question))
        .route("/api/interview/evaluate", post(interview::handle_evaluate))
        // Resume API
        .route(
            "/api/resume/upload",
            post(resume::handle_resume_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/resume/evaluate", post(resume::handle_resume_evaluate))
        // Auth API
        .route("/api/auth/sync", post(auth::handle_sync))
        .route(
            "/api/auth/send-verification-email",
            post(auth::handle_send_verification_email),
        )
        .route(
            "/api/auth/send-password-reset-email",
            post(auth::handle_send_password_reset_email),
        )
        .with_state(state)
}
