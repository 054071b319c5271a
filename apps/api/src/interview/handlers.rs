//! Axum route handlers for the Interview API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::{required, AppError, ReportedError};
use crate::interview::prompts::{build_evaluation_prompt, build_question_prompt};
use crate::llm_client::GenerationConfig;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    /// Raw model output, expected to hold the feedback JSON.
    pub feedback: String,
}

/// POST /api/interview/question
pub async fn handle_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, ReportedError> {
    let expose = state.config.expose_error_details();
    let domain = required(request.domain, "domain").map_err(|e| e.reported(expose))?;

    let question = state
        .llm
        .generate(
            &state.models.primary,
            &build_question_prompt(&domain),
            &GenerationConfig::default(),
        )
        .await
        .map_err(|e| AppError::from(e).reported(expose))?;

    Ok(Json(QuestionResponse {
        question: question.trim().to_string(),
    }))
}

/// POST /api/interview/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ReportedError> {
    let expose = state.config.expose_error_details();
    let question = required(request.question, "question").map_err(|e| e.reported(expose))?;
    let answer = required(request.answer, "answer").map_err(|e| e.reported(expose))?;

    let feedback = state
        .llm
        .generate(
            &state.models.primary,
            &build_evaluation_prompt(&question, &answer),
            &GenerationConfig::default(),
        )
        .await
        .map_err(|e| AppError::from(e).reported(expose))?;

    Ok(Json(EvaluateResponse { feedback }))
}
