//! Axum route handlers for the Resume API.

use std::path::Path;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::{required, AppError, ReportedError};
use crate::resume::extractor::ExtractionError;
use crate::resume::pipeline::{ResumeAnalysisResponse, ResumeEvaluationResponse};
use crate::resume::upload::UploadedFile;
use crate::state::AppState;

/// Multipart field carrying the resume PDF.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeEvaluateRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// POST /api/resume/upload
///
/// Extracts the resume text and asks the model for five tailored questions.
pub async fn handle_resume_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResumeAnalysisResponse>, ReportedError> {
    let expose = state.config.expose_error_details();

    let multipart = multipart.map_err(|e| {
        AppError::Validation(format!("Expected a multipart upload: {}", e.body_text()))
            .reported(expose)
    })?;
    let upload = read_resume_upload(multipart, &state.config.upload_dir)
        .await
        .map_err(|e| e.reported(expose))?;

    state
        .pipeline()
        .analyze_resume(upload)
        .await
        .map(Json)
        .map_err(|e| e.reported(expose))
}

/// POST /api/resume/evaluate
///
/// Scores an answer against the candidate's resume.
pub async fn handle_resume_evaluate(
    State(state): State<AppState>,
    Json(request): Json<ResumeEvaluateRequest>,
) -> Result<Json<ResumeEvaluationResponse>, ReportedError> {
    let expose = state.config.expose_error_details();

    let resume_text = required(request.resume_text, "resumeText").map_err(|e| e.reported(expose))?;
    let question = required(request.question, "question").map_err(|e| e.reported(expose))?;
    let answer = required(request.answer, "answer").map_err(|e| e.reported(expose))?;

    state
        .pipeline()
        .evaluate_answer(&resume_text, &question, &answer)
        .await
        .map(Json)
        .map_err(|e| e.reported(expose))
}

/// Finds the `resume` field, checks it is a PDF and stores it in `upload_dir`.
async fn read_resume_upload(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_read_error)?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        if !is_pdf(field.content_type(), file_name.as_deref()) {
            return Err(AppError::Validation(
                "Only PDF files are allowed".to_string(),
            ));
        }

        let data: Bytes = field
            .bytes()
            .await
            .map_err(upload_read_error)?;
        if data.is_empty() {
            return Err(ExtractionError::MissingFile.into());
        }

        let upload = UploadedFile::persist(upload_dir, file_name, &data)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("storing upload")))?;
        return Ok(upload);
    }

    Err(ExtractionError::MissingFile.into())
}

/// Body-limit overruns become 413; anything else is a malformed upload.
fn upload_read_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file exceeds the size limit".to_string())
    } else {
        AppError::Validation(format!("Failed to read upload: {err}"))
    }
}

fn is_pdf(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let by_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    by_type || by_name
}
