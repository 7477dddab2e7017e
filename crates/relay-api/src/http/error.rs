//! Application error type mapping every failure to one HTTP shape.
//!
//! Both endpoints answer failures with `500 {"error": "<description>"}`,
//! whether the body was malformed or a collaborator failed.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use relay_types::error::RelayError;

/// Application-level error that maps to HTTP responses.
///
/// Body rejections are carried as [`RelayError::Input`] so the handlers
/// see one error taxonomy.
#[derive(Debug)]
pub struct AppError(pub RelayError);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(RelayError::Input(rejection.body_text()))
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match &self.0 {
            RelayError::Input(_) => tracing::warn!(error = %message, "rejected request"),
            _ => tracing::error!(error = %message, "request failed"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    use relay_types::error::{AgentError, StoreError};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn json_rejection_becomes_relay_input_error() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"session_id":"abc"}"#))
            .unwrap();
        let rejection = Json::<relay_types::transcript::EndSessionRequest>::from_request(request, &())
            .await
            .unwrap_err();

        let err = AppError::from(rejection);
        match &err.0 {
            RelayError::Input(message) => assert!(message.contains("full_conversation"), "{message}"),
            other => panic!("expected input error, got {other:?}"),
        }

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("full_conversation"));
    }

    #[tokio::test]
    async fn collaborator_errors_keep_their_description() {
        let response = AppError::from(RelayError::from(AgentError::Exception {
            kind: "accessDeniedException".to_string(),
            message: "denied".to_string(),
        }))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "agent service raised accessDeniedException: denied"})
        );

        let response =
            AppError::from(RelayError::from(StoreError::Http("timed out".to_string()))).into_response();
        assert_eq!(
            body_json(response).await,
            json!({"error": "object store request failed: timed out"})
        );
    }
}
