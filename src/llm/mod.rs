pub mod client;
pub mod gemini;
pub mod prompt;
pub mod resolver;
pub mod transport;

use std::sync::Arc;

pub use client::{GeneratedReport, ReportClient};
pub use gemini::GeminiEndpoints;
pub use prompt::build_prompt;
pub use resolver::ModelResolver;
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};

use crate::config::Config;

/// Wires a `ReportClient` for the configured provider on top of `transport`.
pub fn report_client_from_config(config: &Config, transport: Arc<dyn Transport>) -> ReportClient {
    let endpoints = GeminiEndpoints::new(&config.gemini_base_url, &config.gemini_api_version);

    let mut resolver = ModelResolver::new(
        transport.clone(),
        endpoints.clone(),
        &config.model_keyword,
        &config.fallback_model,
    );
    if let Some(ttl) = config.model_cache_ttl() {
        resolver = resolver.with_cache(ttl);
    }

    ReportClient::new(transport, endpoints, resolver)
}
