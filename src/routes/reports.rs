use std::fmt;

use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;

use crate::AppState;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ReportDepth;
use crate::pipeline::{IncidentReport, IncidentRequest, generate_incident_report};

#[derive(Deserialize)]
pub struct CreateReportBody {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub depth: ReportDepth,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for CreateReportBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateReportBody")
            .field("scenario", &self.scenario)
            .field("depth", &self.depth)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A server-side key wins over one supplied in the request body.
fn credential<'a>(config: &'a Config, body: &'a CreateReportBody) -> &'a str {
    config
        .google_api_key
        .as_deref()
        .or(body.api_key.as_deref())
        .unwrap_or("")
}

async fn run_submission(
    state: &AppState,
    body: Result<Json<CreateReportBody>, JsonRejection>,
) -> AppResult<IncidentReport> {
    let Json(body) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let request = IncidentRequest {
        credential: credential(&state.config, &body),
        scenario: &body.scenario,
        depth: body.depth,
    };

    let _gate = state.submissions.lock().await;
    let report = generate_incident_report(
        &state.report_client,
        &state.renderer,
        request,
        &state.config.download_filename,
    )
    .await?;

    Ok(report)
}

pub async fn create_report(
    State(state): State<AppState>,
    body: Result<Json<CreateReportBody>, JsonRejection>,
) -> AppResult<Json<IncidentReport>> {
    let report = run_submission(&state, body).await?;
    Ok(Json(report))
}

pub async fn download_report_pdf(
    State(state): State<AppState>,
    body: Result<Json<CreateReportBody>, JsonRejection>,
) -> AppResult<Response> {
    let report = run_submission(&state, body).await?;
    let disposition = format!("attachment; filename=\"{}\"", report.download.filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header("x-report-reference", &report.reference)
        .body(Body::from(report.document.bytes))
        .map_err(|e| AppError::Internal(format!("failed to build PDF response: {e}")))
}
