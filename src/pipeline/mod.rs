pub mod orchestrator;

pub use orchestrator::{IncidentReport, IncidentRequest, generate_incident_report};
