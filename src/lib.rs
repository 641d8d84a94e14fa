pub mod config;
pub mod delivery;
pub mod document;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use tokio::sync::Mutex;

use config::Config;
use document::DocumentRenderer;
use llm::ReportClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub report_client: Arc<ReportClient>,
    pub renderer: Arc<DocumentRenderer>,
    /// Held for the whole run of a submission so provider calls never interleave.
    pub submissions: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, report_client: ReportClient) -> Self {
        let renderer = DocumentRenderer::new(config.render_options());
        Self {
            config,
            report_client: Arc::new(report_client),
            renderer: Arc::new(renderer),
            submissions: Arc::new(Mutex::new(())),
        }
    }
}
