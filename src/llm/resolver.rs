use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;

use super::gemini::{GeminiEndpoints, ModelCatalog};
use super::transport::{HttpResponse, Transport};
use crate::error::ReportError;
use crate::telemetry::metrics::GEN_AI_MODEL_RESOLUTION_COUNT;

/// Picks the concrete model to target from the provider's model catalog.
pub struct ModelResolver {
    transport: Arc<dyn Transport>,
    endpoints: GeminiEndpoints,
    keyword: String,
    fallback: String,
    cache: Option<ModelCache>,
}

impl ModelResolver {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: GeminiEndpoints,
        keyword: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoints,
            keyword: keyword.into(),
            fallback: fallback.into(),
            cache: None,
        }
    }

    /// Reuse a resolved model for `ttl` as long as the credential is unchanged.
    /// Without this every call queries the catalog.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(ModelCache::new(ttl));
        self
    }

    #[tracing::instrument(
        name = "gen_ai.model.resolve",
        skip(self, credential),
        fields(gen_ai.request.model, model.resolution)
    )]
    pub async fn resolve(&self, credential: &str) -> Result<String, ReportError> {
        let span = tracing::Span::current();

        if let Some(model) = self.cache.as_ref().and_then(|c| c.lookup(credential)) {
            record_resolution(&span, &model, "cached");
            return Ok(model);
        }

        let url = self.endpoints.catalog_url(credential)?;
        let response = self.transport.get(&url).await.map_err(ReportError::from)?;
        let (model, outcome) = self.select(&response)?;

        if let Some(cache) = &self.cache {
            cache.store(credential, &model);
        }

        record_resolution(&span, &model, outcome);
        Ok(model)
    }

    fn select(&self, response: &HttpResponse) -> Result<(String, &'static str), ReportError> {
        let catalog: ModelCatalog = serde_json::from_str(&response.body).map_err(|e| {
            ReportError::MalformedResponse(format!("model catalog: {e}"))
        })?;

        if let Some(error) = catalog.error {
            return Err(match response.status {
                401 | 403 => ReportError::Authentication {
                    status: response.status,
                    message: error.message,
                },
                _ => ReportError::Provider {
                    message: error.message,
                },
            });
        }

        let selected = catalog
            .models
            .into_iter()
            .find(|m| m.name.contains(self.keyword.as_str()));

        Ok(match selected {
            Some(descriptor) => (descriptor.name, "matched"),
            None => {
                tracing::debug!(
                    keyword = %self.keyword,
                    fallback = %self.fallback,
                    "No catalog model matched keyword, using fallback"
                );
                (self.fallback.clone(), "fallback")
            }
        })
    }
}

fn record_resolution(span: &tracing::Span, model: &str, outcome: &'static str) {
    span.record("gen_ai.request.model", model);
    span.record("model.resolution", outcome);
    GEN_AI_MODEL_RESOLUTION_COUNT.add(1, &[KeyValue::new("model.resolution", outcome)]);
}

struct CachedModel {
    fingerprint: u64,
    model: String,
    resolved_at: Instant,
}

/// Single-slot cache. Only a hash of the credential is kept.
struct ModelCache {
    ttl: Duration,
    slot: Mutex<Option<CachedModel>>,
}

impl ModelCache {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    fn lookup(&self, credential: &str) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        let key = fingerprint(credential);
        slot.as_ref()
            .filter(|c| c.fingerprint == key && c.resolved_at.elapsed() < self.ttl)
            .map(|c| c.model.clone())
    }

    fn store(&self, credential: &str, model: &str) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedModel {
                fingerprint: fingerprint(credential),
                model: model.to_string(),
                resolved_at: Instant::now(),
            });
        }
    }
}

fn fingerprint(credential: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    credential.hash(&mut hasher);
    hasher.finish()
}
