//! In-process fakes for router and pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::auth::identity::{IdentityError, IdentityProvider, VerifiedIdentity};
use crate::auth::store::UserStore;
use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::errors::AppError;
use crate::llm_client::{
    GenerationConfig, GenerativeModel, LlmError, ModelPair, RetryPolicy, GEMINI_API_BASE_URL,
};
use crate::models::user::User;
use crate::resume::extractor::{ExtractionError, TextExtractor};
use crate::routes::build_router;
use crate::state::AppState;

pub const BOUNDARY: &str = "interview-test-boundary";
pub const VALID_TOKEN: &str = "valid-id-token";

pub fn overloaded() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "The model is overloaded. Please try again later.".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generative model
// ────────────────────────────────────────────────────────────────────────────

struct Call {
    model: String,
    prompt: String,
    config: GenerationConfig,
    at: Instant,
}

/// Replays scripted results in order; an exhausted script yields `EmptyContent`.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.model.clone()).collect()
    }

    pub fn prompts_seen(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.prompt.clone()).collect()
    }

    pub fn configs_seen(&self) -> Vec<GenerationConfig> {
        self.calls.lock().unwrap().iter().map(|c| c.config).collect()
    }

    /// Time between consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].at - w[0].at).collect()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(Call {
            model: model.to_string(),
            prompt: prompt.to_string(),
            config: *config,
            at: Instant::now(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text extractor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FakeExtractor {
    text: Option<String>,
    calls: Arc<Mutex<usize>>,
    saw_file: Arc<Mutex<bool>>,
}

impl FakeExtractor {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: Arc::default(),
            saw_file: Arc::default(),
        }
    }

    /// Always fails as an unparseable PDF.
    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Arc::default(),
            saw_file: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// Whether the upload existed on disk when extraction ran.
    pub fn saw_existing_file(&self) -> bool {
        *self.saw_file.lock().unwrap()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        *self.calls.lock().unwrap() += 1;
        *self.saw_file.lock().unwrap() = path.exists();
        self.text
            .clone()
            .ok_or_else(|| ExtractionError::Parse("invalid PDF header".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Identity provider & user store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeIdentity {
    emails: Arc<Mutex<Vec<String>>>,
}

impl FakeIdentity {
    pub fn emails_sent(&self) -> Vec<String> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        if id_token != VALID_TOKEN {
            return Err(IdentityError::InvalidToken("INVALID_ID_TOKEN".to_string()));
        }
        Ok(VerifiedIdentity {
            uid: "uid-123".to_string(),
            email: Some("jane@example.com".to_string()),
            email_verified: false,
            display_name: Some("Jane Doe".to_string()),
        })
    }

    async fn send_verification_email(&self, id_token: &str) -> Result<(), IdentityError> {
        let identity = self.verify_token(id_token).await?;
        self.emails
            .lock()
            .unwrap()
            .push(format!("verify:{}", identity.uid));
        Ok(())
    }

    async fn send_password_reset_email(&self, email: &str) -> Result<(), IdentityError> {
        self.emails.lock().unwrap().push(format!("reset:{email}"));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert(&self, identity: &VerifiedIdentity) -> Result<User, AppError> {
        let now = Utc::now();
        let mut users = self.users.lock().unwrap();
        let user = users
            .entry(identity.uid.clone())
            .and_modify(|u| {
                u.email = identity.email.clone();
                u.email_verified = identity.email_verified;
                u.updated_at = now;
            })
            .or_insert_with(|| User {
                id: Uuid::new_v4(),
                external_id: identity.uid.clone(),
                email: identity.email.clone(),
                display_name: identity.display_name.clone(),
                email_verified: identity.email_verified,
                created_at: now,
                updated_at: now,
            });
        Ok(user.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State & request builders
// ────────────────────────────────────────────────────────────────────────────

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "postgres://localhost/interview_test".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_base_url: GEMINI_API_BASE_URL.to_string(),
        primary_model: "primary".to_string(),
        fallback_model: "fallback".to_string(),
        identity_api_key: "identity-key".to_string(),
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        app_env: "development".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

fn build_state(
    upload_dir: &Path,
    llm: ScriptedModel,
    extractor: FakeExtractor,
    identity: FakeIdentity,
    users: MemoryUserStore,
) -> AppState {
    let config = test_config(upload_dir);
    AppState {
        models: ModelPair::new(config.primary_model.clone(), config.fallback_model.clone()),
        config,
        llm: Arc::new(llm),
        retry: RetryPolicy::default(),
        extractor: Arc::new(extractor),
        identity: Arc::new(identity),
        users: Arc::new(users),
    }
}

/// Router wired to the given model and extractor; the extractor is handed back for inspection.
pub fn test_state(
    upload_dir: &Path,
    llm: ScriptedModel,
    extractor: FakeExtractor,
) -> (Router, FakeExtractor) {
    let state = build_state(
        upload_dir,
        llm,
        extractor.clone(),
        FakeIdentity::default(),
        MemoryUserStore::default(),
    );
    (build_router(state), extractor)
}

/// Like `test_state`, with the upload body limit lowered to `max_upload_bytes`.
pub fn test_state_with_limit(
    upload_dir: &Path,
    llm: ScriptedModel,
    extractor: FakeExtractor,
    max_upload_bytes: usize,
) -> (Router, FakeExtractor) {
    let mut state = build_state(
        upload_dir,
        llm,
        extractor.clone(),
        FakeIdentity::default(),
        MemoryUserStore::default(),
    );
    state.config.max_upload_bytes = max_upload_bytes;
    (build_router(state), extractor)
}

/// Router wired to the given identity provider and user store.
pub fn test_state_with(upload_dir: &Path, identity: FakeIdentity, users: MemoryUserStore) -> Router {
    build_router(build_state(
        upload_dir,
        ScriptedModel::default(),
        FakeExtractor::failing(),
        identity,
        users,
    ))
}

/// A multipart/form-data body with one file field, delimited by `BOUNDARY`.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
