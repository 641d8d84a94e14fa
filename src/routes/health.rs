use axum::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "incident-report-generator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_payload() {
        let Json(body) = tokio_test::block_on(health());
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "incident-report-generator");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
