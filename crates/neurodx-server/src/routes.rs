//! HTTP routes.
//!
//! This is the only place that maps pipeline errors to status codes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use neurodx_core::{DiagnoseError, Diagnosis, DiagnosisService, ErrorKind};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<DiagnosisService>,
}

impl AppState {
    pub fn new(service: DiagnosisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub diagnosis: Diagnosis,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// A pipeline failure on its way out as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub DiagnoseError);

impl From<DiagnoseError> for ApiError {
    fn from(err: DiagnoseError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    if kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: Some(kind.as_str()),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/diagnose",
            post(diagnose).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn diagnose(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DiagnoseResponse>, Response> {
    let body = body.map_err(rejected_body)?;

    let result = match parse_body(&body) {
        Ok(fields) => state.service.diagnose(&fields).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(diagnosis) => Ok(Json(DiagnoseResponse { diagnosis })),
        Err(err) => {
            let kind = err.kind();
            if kind.is_client_error() {
                warn!(kind = %kind, error = %err, "diagnosis request rejected");
            } else {
                error!(kind = %kind, error = %err, "diagnosis failed");
            }
            Err(ApiError(err).into_response())
        }
    }
}

/// Body-read failures (oversized, aborted) keep their own status but still answer in JSON.
fn rejected_body(rejection: BytesRejection) -> Response {
    let status = rejection.status();
    warn!(status = %status, error = %rejection.body_text(), "request body rejected");
    (
        status,
        Json(ErrorBody {
            error: rejection.body_text(),
            kind: Some(ErrorKind::MalformedRequest.as_str()),
        }),
    )
        .into_response()
}

fn parse_body(body: &[u8]) -> Result<Map<String, Value>, DiagnoseError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(DiagnoseError::MalformedRequest {
            message: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(DiagnoseError::MalformedRequest {
            message: e.to_string(),
        }),
    }
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "Method not allowed".to_string(),
            kind: None,
        }),
    )
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_string(),
            kind: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::MissingField), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::InvalidFieldType),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(ErrorKind::MalformedRequest),
            StatusCode::BAD_REQUEST
        );
        for kind in [
            ErrorKind::Configuration,
            ErrorKind::DataUnavailable,
            ErrorKind::Upstream,
            ErrorKind::InvalidDiagnosis,
        ] {
            assert_eq!(status_for(kind), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(br#"{"tau_p": 1}"#).is_ok());

        let err = parse_body(b"[1, 2]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);

        let err = parse_body(b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);

        let err = parse_body(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
    }
}
