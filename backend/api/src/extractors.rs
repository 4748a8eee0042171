//! Request extractors for part payloads
//!
//! `ValidatedPart` reads the body as an untyped JSON object and runs it
//! through `validate_part_data`, so handlers only ever see `PartChanges`.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde_json::Value;
use shared::{validate_part_data, PartChanges};

use crate::error::ApiError;
use crate::metrics;

pub const BODY_FIELD: &str = "body";

/// A part payload that passed validation
#[derive(Debug)]
pub struct ValidatedPart(pub PartChanges);

fn reject_body(message: impl Into<String>) -> ApiError {
    metrics::record_validation_failure(Some(BODY_FIELD));
    ApiError::validation(BODY_FIELD, message)
}

pub fn map_json_rejection(err: JsonRejection) -> ApiError {
    let message = match err {
        JsonRejection::JsonDataError(e) => format!("Invalid JSON data: {}", e.body_text()),
        JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Content-Type must be application/json".to_string()
        }
        JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
        _ => "Invalid JSON payload".to_string(),
    };
    reject_body(message)
}

#[async_trait]
impl<S> FromRequest<S> for ValidatedPart
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(map_json_rejection)?;

        let Value::Object(raw) = value else {
            return Err(reject_body("Request body must be a JSON object"));
        };

        let changes = validate_part_data(&raw).map_err(|err| {
            metrics::record_validation_failure(err.field_name());
            tracing::debug!(field = ?err.field, message = %err.message, "part payload rejected");
            ApiError::from(err)
        })?;

        Ok(ValidatedPart(changes))
    }
}

impl std::ops::Deref for ValidatedPart {
    type Target = PartChanges;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(req: Request) -> Result<ValidatedPart, ApiError> {
        ValidatedPart::from_request(req, &()).await
    }

    async fn error_body(err: ApiError) -> Value {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_is_cleaned() {
        let part = extract(json_request(r#"{"name": " Gear ", "type": "HAND"}"#))
            .await
            .unwrap();
        assert_eq!(part.name.as_deref(), Some("Gear"));
        assert_eq!(part.part_type, Some(Some(shared::PartType::Hand)));
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let err = extract(json_request("[1, 2]")).await.unwrap_err();
        let body = error_body(err).await;
        assert_eq!(body["field"], "body");
        assert_eq!(body["message"], "Request body must be a JSON object");
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let err = extract(json_request("{\"name\": ")).await.unwrap_err();
        let body = error_body(err).await;
        assert_eq!(body["field"], "body");
        assert!(body["message"].as_str().unwrap().starts_with("JSON syntax error"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .method("POST")
            .body(Body::from("{}"))
            .unwrap();
        let body = error_body(extract(req).await.unwrap_err()).await;
        assert_eq!(body["message"], "Content-Type must be application/json");
    }

    #[tokio::test]
    async fn test_field_errors_pass_through() {
        let err = extract(json_request(r#"{"amount": 0}"#)).await.unwrap_err();
        let body = error_body(err).await;
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["field"], "amount");
        assert_eq!(body["message"], "amount must be greater than 0");
    }
}
