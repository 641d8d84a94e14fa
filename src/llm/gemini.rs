//! Wire types and endpoint construction for the Gemini `generativelanguage`
//! REST API.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

#[derive(Debug, Clone)]
pub struct GeminiEndpoints {
    base_url: String,
    api_version: String,
}

impl GeminiEndpoints {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        }
    }

    /// Host name reported on spans as `server.address`.
    pub fn host(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn port(&self) -> i64 {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .map(i64::from)
            .unwrap_or(443)
    }

    pub fn catalog_url(&self, credential: &str) -> Result<Url, ReportError> {
        self.with_key(format!("{}/{}/models", self.base_url, self.api_version), credential)
    }

    pub fn generate_url(&self, model: &str, credential: &str) -> Result<Url, ReportError> {
        let model = qualified_model_name(model);
        self.with_key(
            format!("{}/{}/{model}:generateContent", self.base_url, self.api_version),
            credential,
        )
    }

    fn with_key(&self, raw: String, credential: &str) -> Result<Url, ReportError> {
        let mut url = Url::parse(&raw)
            .map_err(|e| ReportError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        url.query_pairs_mut().append_pair("key", credential);
        Ok(url)
    }
}

/// Catalog names are `models/<id>`; bare ids from configuration get the prefix.
pub fn qualified_model_name(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn single_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> GeminiEndpoints {
        GeminiEndpoints::new("https://generativelanguage.googleapis.com/", "v1beta")
    }

    #[test]
    fn test_catalog_url_carries_key() {
        let url = endpoints().catalog_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models?key=abc123"
        );
    }

    #[test]
    fn test_generate_url_for_model() {
        let url = endpoints()
            .generate_url("models/gemini-2.0-flash", "abc123")
            .unwrap();
        assert_eq!(url.path(), "/v1beta/models/gemini-2.0-flash:generateContent");
        assert_eq!(url.query(), Some("key=abc123"));
    }

    #[test]
    fn test_key_is_query_encoded() {
        let url = endpoints().catalog_url("a b&c").unwrap();
        assert_eq!(url.query(), Some("key=a+b%26c"));
    }

    #[test]
    fn test_invalid_base_url() {
        let endpoints = GeminiEndpoints::new("not a url", "v1beta");
        let err = endpoints.catalog_url("k").unwrap_err();
        assert!(matches!(err, ReportError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_host() {
        assert_eq!(endpoints().host(), "generativelanguage.googleapis.com");
        assert_eq!(endpoints().port(), 443);
        assert_eq!(GeminiEndpoints::new("http://localhost:8089", "v1beta").port(), 8089);
    }

    #[test]
    fn test_qualified_model_name() {
        assert_eq!(qualified_model_name("gemini-pro"), "models/gemini-pro");
        assert_eq!(qualified_model_name("models/gemini-pro"), "models/gemini-pro");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::single_prompt("hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_parse_generate_response() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "WHAT HAPPENED: leak"}], "role": "model"}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 120, "totalTokenCount": 160},
            "modelVersion": "gemini-2.0-flash"
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text(), Some("WHAT HAPPENED: leak"));
        assert_eq!(resp.finish_reason(), Some("STOP"));
        let usage = resp.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 40);
        assert_eq!(usage.candidates_token_count, 120);
        assert_eq!(resp.model_version.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_parse_blocked_response_has_no_text() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text(), None);
        assert_eq!(resp.finish_reason(), Some("SAFETY"));
    }

    #[test]
    fn test_parse_catalog_error() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let catalog: ModelCatalog = serde_json::from_str(raw).unwrap();
        assert!(catalog.models.is_empty());
        let error = catalog.error.unwrap();
        assert_eq!(error.message, "API key not valid.");
        assert_eq!(error.code, Some(400));
    }
}
