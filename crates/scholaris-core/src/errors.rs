//! Application error taxonomy.
//!
//! Every public operation returns `Result<T, AppError>`. Errors are recovered at the
//! action boundary and rendered as `{"success": false, "message": "..."}`; nothing
//! propagates past a handler as an unhandled fault.
//!
//! | kind | status | rendered message |
//! |------|--------|------------------|
//! | `PermissionDenied` | 403 | the denial reason |
//! | `NotFound` | 404 | the error text |
//! | `Conflict` | 409 | the error text |
//! | `Validation` | 422 | the error text |
//! | `Unauthorized` | 401 | the error text |
//! | `BadRequest` | 400 | the error text |
//! | `TransactionFailure` | 500 | generic, cause is logged |
//! | `Internal` | 500 | generic, cause is logged |

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const TRANSACTION_FAILURE: &str = "The operation could not be completed and was rolled back.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Conflict,
    Validation,
    TransactionFailure,
    Unauthorized,
    BadRequest,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::TransactionFailure | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the underlying error text is safe to show to the caller.
    pub fn is_user_facing(self) -> bool {
        !matches!(self, ErrorKind::TransactionFailure | ErrorKind::Internal)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            status: kind.status(),
            error: err.into(),
        }
    }

    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, anyhow::anyhow!(reason.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, anyhow::anyhow!(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, anyhow::anyhow!(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, anyhow::anyhow!(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, anyhow::anyhow!(message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, anyhow::anyhow!(message.into()))
    }

    pub fn transaction_failure<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::TransactionFailure, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    /// Re-tags a store-level failure raised inside a multi-step operation.
    ///
    /// Errors that already carry a user-facing kind (a denial or a conflict
    /// detected mid-transaction) keep it.
    pub fn in_transaction(self) -> Self {
        match self.kind {
            ErrorKind::Internal => Self {
                kind: ErrorKind::TransactionFailure,
                status: ErrorKind::TransactionFailure.status(),
                error: self.error,
            },
            _ => self,
        }
    }

    /// The message shown to the caller. Internal details are never exposed.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::TransactionFailure => TRANSACTION_FAILURE.to_string(),
            ErrorKind::Internal => GENERIC_FAILURE.to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.kind.is_user_facing() {
            tracing::error!(error = %self.error, kind = ?self.kind, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Success envelope for action-style endpoints (assignments, propagation, batch upserts).
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> MessageResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl MessageResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_permission_denied_renders_reason() {
        let (status, body) =
            body_json(AppError::permission_denied("Teachers cannot delete homework")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Teachers cannot delete homework");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_json(AppError::internal(anyhow::anyhow!("relation \"users\" does not exist")))
                .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_transaction_failure_hides_detail() {
        let (status, body) =
            body_json(AppError::transaction_failure(anyhow::anyhow!("deadlock detected"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], TRANSACTION_FAILURE);
    }

    #[test]
    fn test_in_transaction_keeps_user_facing_kinds() {
        let conflict = AppError::conflict("Class already has an administrator").in_transaction();
        assert_eq!(conflict.kind, ErrorKind::Conflict);
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let internal = AppError::internal(anyhow::anyhow!("io")).in_transaction();
        assert_eq!(internal.kind, ErrorKind::TransactionFailure);
    }

    #[test]
    fn test_question_mark_conversion_is_internal() {
        fn parse() -> Result<i64, AppError> {
            Ok("nope".parse::<i64>()?)
        }
        let err = parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::BadRequest.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_message_response_serialization() {
        let ok = MessageResponse::ok("Assigned", 55_i64);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 55);

        let bare = serde_json::to_value(MessageResponse::message("Done")).unwrap();
        assert!(bare.get("data").is_none());
    }
}
