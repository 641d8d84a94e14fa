use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use serde::Serialize;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::gemini::{GeminiEndpoints, GenerateContentRequest, GenerateContentResponse};
use super::prompt::build_prompt;
use super::resolver::ModelResolver;
use super::transport::{HttpResponse, Transport};
use crate::error::ReportError;
use crate::models::ReportDepth;
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_TOKEN_USAGE,
};

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
}

/// Turns a scenario into report text: resolve the model, build the prompt,
/// make one generation call.
pub struct ReportClient {
    transport: Arc<dyn Transport>,
    endpoints: GeminiEndpoints,
    resolver: ModelResolver,
}

impl ReportClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: GeminiEndpoints,
        resolver: ModelResolver,
    ) -> Self {
        Self {
            transport,
            endpoints,
            resolver,
        }
    }

    pub async fn generate(
        &self,
        credential: &str,
        scenario: &str,
        depth: ReportDepth,
    ) -> Result<GeneratedReport, ReportError> {
        if credential.trim().is_empty() {
            return Err(ReportError::MissingCredential);
        }

        let model = self.resolver.resolve(credential).await?;
        let prompt = build_prompt(scenario, depth);

        self.generate_once(credential, &model, &prompt, depth).await
    }

    async fn generate_once(
        &self,
        credential: &str,
        model: &str,
        prompt: &str,
        depth: ReportDepth,
    ) -> Result<GeneratedReport, ReportError> {
        let span_display_name = format!("gen_ai.chat {model}");
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = "google",
            gen_ai.request.model = %model,
            server.address = %self.endpoints.host(),
            server.port = self.endpoints.port(),
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            report.depth = %depth,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        span.add_event(
            "gen_ai.user.message",
            vec![KeyValue::new("gen_ai.prompt", truncate(prompt, 1000))],
        );

        let result = self
            .call_provider(credential, model, prompt)
            .instrument(span.clone())
            .await;

        let duration = start.elapsed().as_secs_f64();
        let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
        let provider_kv = KeyValue::new("gen_ai.provider.name", "google");
        let model_kv = KeyValue::new("gen_ai.request.model", model.to_string());

        match result {
            Ok(report) => {
                span.record("gen_ai.response.model", report.model.as_str());
                span.record("gen_ai.usage.input_tokens", report.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", report.output_tokens as i64);
                if !report.finish_reason.is_empty() {
                    span.record(
                        "gen_ai.response.finish_reasons",
                        report.finish_reason.as_str(),
                    );
                }

                span.add_event(
                    "gen_ai.assistant.message",
                    vec![KeyValue::new(
                        "gen_ai.completion",
                        truncate(&report.content, 2000),
                    )],
                );

                GEN_AI_TOKEN_USAGE.record(
                    f64::from(report.input_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "input"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_TOKEN_USAGE.record(
                    f64::from(report.output_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "output"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(report)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", err.kind());

                GEN_AI_ERROR_COUNT.add(
                    1,
                    &[
                        provider_kv,
                        model_kv,
                        KeyValue::new("error.type", err.kind()),
                    ],
                );

                tracing::warn!(
                    parent: &span,
                    error.type = err.kind(),
                    error = %err,
                    "Generation call failed"
                );

                Err(err)
            }
        }
    }

    async fn call_provider(
        &self,
        credential: &str,
        model: &str,
        prompt: &str,
    ) -> Result<GeneratedReport, ReportError> {
        let url = self.endpoints.generate_url(model, credential)?;
        let body = serde_json::to_string(&GenerateContentRequest::single_prompt(prompt))
            .map_err(|e| ReportError::MalformedResponse(format!("request encoding: {e}")))?;

        let response = self.transport.post_json(&url, body).await?;
        parse_generation(model, response)
    }
}

fn parse_generation(model: &str, response: HttpResponse) -> Result<GeneratedReport, ReportError> {
    if !response.is_success() {
        return Err(match response.status {
            401 | 403 => ReportError::Authentication {
                status: response.status,
                message: response.body,
            },
            status => ReportError::Generation {
                status,
                body: response.body,
            },
        });
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&response.body)
        .map_err(|e| ReportError::MalformedResponse(format!("generation response: {e}")))?;

    if let Some(error) = &parsed.error {
        return Err(ReportError::Provider {
            message: error.message.clone(),
        });
    }

    let content = parsed.first_text().map(str::to_string).ok_or_else(|| {
        ReportError::MalformedResponse(format!(
            "no candidate text (finish reason: {})",
            parsed.finish_reason().unwrap_or("unknown")
        ))
    })?;

    let finish_reason = parsed.finish_reason().unwrap_or_default().to_lowercase();
    let usage = parsed.usage_metadata.unwrap_or_default();

    Ok(GeneratedReport {
        content,
        model: parsed.model_version.unwrap_or_else(|| model.to_string()),
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
        finish_reason,
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
