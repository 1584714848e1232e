//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub weather_provider: String,
    pub ai_enabled: bool,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        weather_provider: state.provider.name().to_string(),
        ai_enabled: state.openai.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{cloud_cover, test_app, FakeProvider};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_provider() {
        for uri in ["/health", "/api/v1/health"] {
            let app = test_app(FakeProvider::new(|_| Ok(cloud_cover(0.0))).into_arc());
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["status"], "healthy");
            assert_eq!(body["weatherProvider"], "fake");
            assert_eq!(body["aiEnabled"], false);
        }
    }
}
