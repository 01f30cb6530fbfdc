//! HTTP error handling for the admin API
//!
//! Every failure leaves the API as `{ "code", "message", "field"? }` so the
//! admin UI can show the message next to the offending input.

use crate::services::NodeServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// JSON error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// Machine-readable error code (`NODE_NOT_FOUND`, `CYCLE_DETECTED`, ...)
    pub code: String,
    /// User-facing error message
    pub message: String,
    /// Form field the error refers to, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
        }
    }

    /// Validation error pinned to a request field
    pub fn invalid_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CYCLE_DETECTED" | "SELF_PARENT" | "HAS_CHILDREN" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<NodeServiceError> for HttpError {
    fn from(err: NodeServiceError) -> Self {
        let field = match &err {
            NodeServiceError::ValidationFailed(validation) => {
                validation.field().map(str::to_string)
            }
            NodeServiceError::CycleDetected { .. } | NodeServiceError::SelfParent { .. } => {
                Some("parentId".to_string())
            }
            _ => None,
        };

        if matches!(err, NodeServiceError::DatabaseError(_)) {
            tracing::error!(error = %err, "Storage failure while serving request");
        } else {
            tracing::debug!(error = %err, "Request rejected");
        }

        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseError;
    use crate::models::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (NodeServiceError::node_not_found("x"), StatusCode::NOT_FOUND),
            (
                NodeServiceError::from(ValidationError::MissingField("slug".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                NodeServiceError::invalid_update("bad order"),
                StatusCode::BAD_REQUEST,
            ),
            (
                NodeServiceError::cycle_detected("a", "b"),
                StatusCode::CONFLICT,
            ),
            (NodeServiceError::self_parent("a"), StatusCode::CONFLICT),
            (NodeServiceError::has_children("a", 2), StatusCode::CONFLICT),
            (
                NodeServiceError::from(DatabaseError::malformed("site.json", "truncated")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_validation_error_carries_field() {
        let err = HttpError::from(NodeServiceError::from(ValidationError::MissingField(
            "href".into(),
        )));

        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.field.as_deref(), Some("href"));
    }

    #[test]
    fn test_body_omits_missing_field() {
        let body = serde_json::to_value(HttpError::new("gone", "NODE_NOT_FOUND")).unwrap();
        assert!(body.get("field").is_none());
        assert_eq!(body["code"], "NODE_NOT_FOUND");
    }
}
