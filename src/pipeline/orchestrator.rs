use std::fmt;

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;
use uuid::Uuid;

use crate::delivery::{self, DownloadPayload};
use crate::document::{DocumentRenderer, RenderedDocument, ReportMeta};
use crate::error::ReportError;
use crate::llm::ReportClient;
use crate::models::ReportDepth;
use crate::telemetry::metrics::{REPORT_GENERATION_DURATION, REPORTS_GENERATED};

/// One submission. The credential is only borrowed for the run.
#[derive(Clone, Copy)]
pub struct IncidentRequest<'a> {
    pub credential: &'a str,
    pub scenario: &'a str,
    pub depth: ReportDepth,
}

impl fmt::Debug for IncidentRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncidentRequest")
            .field("credential", &"<redacted>")
            .field("scenario", &self.scenario)
            .field("depth", &self.depth)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentReport {
    pub id: Uuid,
    pub reference: String,
    pub depth: ReportDepth,
    pub title: String,
    pub model: String,
    pub report: String,
    pub generated_at: DateTime<Utc>,
    pub page_count: usize,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub generation_duration_ms: u64,
    pub download: DownloadPayload,
    #[serde(skip)]
    pub document: RenderedDocument,
}

pub fn report_reference(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    format!("IR-{}", simple[..8].to_uppercase())
}

/// Runs validate → generate → render → encode for one submission.
#[tracing::instrument(
    name = "pipeline report",
    skip(client, renderer, request, filename),
    fields(
        report.id,
        report.depth = %request.depth,
        report.pages,
        report.duration_ms,
    )
)]
pub async fn generate_incident_report(
    client: &ReportClient,
    renderer: &DocumentRenderer,
    request: IncidentRequest<'_>,
    filename: &str,
) -> Result<IncidentReport, ReportError> {
    let start = std::time::Instant::now();

    if request.credential.trim().is_empty() {
        return Err(ReportError::MissingCredential);
    }
    if request.scenario.trim().is_empty() {
        return Err(ReportError::MissingScenario);
    }

    // Stage 1: resolve model, prompt and generate
    let generated = client
        .generate(request.credential, request.scenario, request.depth)
        .await?;

    // Stage 2: render the document
    let id = Uuid::new_v4();
    let meta = ReportMeta {
        depth: request.depth,
        generated_at: Utc::now(),
        reference: report_reference(&id),
    };
    let document = renderer.render(&generated.content, &meta);

    // Stage 3: encode for download
    let download = delivery::encode(&document.bytes, filename);

    let duration = start.elapsed();
    REPORT_GENERATION_DURATION.record(
        duration.as_secs_f64(),
        &[KeyValue::new("report.depth", request.depth.as_str())],
    );
    REPORTS_GENERATED.add(1, &[KeyValue::new("report.depth", request.depth.as_str())]);

    let span = tracing::Span::current();
    span.record("report.id", id.to_string());
    span.record("report.pages", document.page_count());
    span.record("report.duration_ms", duration.as_millis() as u64);

    tracing::info!(
        report.reference = %meta.reference,
        model = %generated.model,
        pages = document.page_count(),
        bytes = document.bytes.len(),
        "Incident report generated"
    );

    Ok(IncidentReport {
        id,
        reference: meta.reference,
        depth: request.depth,
        title: request.depth.title().to_string(),
        model: generated.model,
        report: generated.content,
        generated_at: meta.generated_at,
        page_count: document.page_count(),
        input_tokens: generated.input_tokens,
        output_tokens: generated.output_tokens,
        generation_duration_ms: duration.as_millis() as u64,
        download,
        document,
    })
}
