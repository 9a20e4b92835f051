use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::db::{IntegrityViolation, StoreError};
use crate::validation::ValidationFailure;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Integrity violation: {0}")]
    Integrity(IntegrityViolation),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(failure) => AppError::Validation(failure),
            StoreError::Integrity(violation) => AppError::Integrity(violation),
            StoreError::Connectivity(e) => AppError::Unavailable(e.to_string()),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from(err).into()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Integrity(v) if v.is_unique() => StatusCode::CONFLICT,
            AppError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details): (String, Option<Value>) = match &self {
            AppError::NotFound(msg) => (msg.clone(), None),
            AppError::Validation(failure) => (
                "Validation failed".into(),
                Some(json!({ "fields": failure.errors })),
            ),
            AppError::Integrity(violation) => {
                tracing::warn!(
                    kind = %violation.kind,
                    constraint = violation.constraint.as_deref().unwrap_or(""),
                    "Integrity violation"
                );
                (
                    format!("{} constraint violated", violation.kind),
                    Some(json!({
                        "kind": violation.kind,
                        "constraint": violation.constraint,
                    })),
                )
            }
            AppError::Unavailable(e) => {
                tracing::error!(error = %e, "Database unavailable");
                ("Service unavailable".into(), None)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ("Internal server error".into(), None)
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                ("Internal server error".into(), None)
            }
        };

        let mut error = json!({
            "message": message,
            "code": status.as_u16(),
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ConstraintKind;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_lists_every_field() {
        let failure = ValidationFailure {
            errors: vec![
                crate::validation::FieldError {
                    field: "email".into(),
                    code: "email".into(),
                    reason: "must be a valid email address".into(),
                },
                crate::validation::FieldError {
                    field: "username".into(),
                    code: "length".into(),
                    reason: "must be between 3 and 50 characters".into(),
                },
            ],
        };
        let (status, body) = body_json(AppError::Validation(failure)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);
        let fields = body["error"]["details"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["field"], "email");
        assert_eq!(fields[1]["reason"], "must be between 3 and 50 characters");
    }

    #[tokio::test]
    async fn test_unique_violation_is_conflict() {
        let err = AppError::from(StoreError::Integrity(IntegrityViolation {
            kind: ConstraintKind::Unique,
            constraint: Some("users_email_key".into()),
            message: "duplicate key value violates unique constraint".into(),
        }));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["details"]["kind"], "unique");
        assert_eq!(body["error"]["details"]["constraint"], "users_email_key");
    }

    #[tokio::test]
    async fn test_foreign_key_violation_is_unprocessable() {
        let err = AppError::Integrity(IntegrityViolation {
            kind: ConstraintKind::ForeignKey,
            constraint: None,
            message: "violates foreign key constraint".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"]["kind"], "foreign_key");
    }

    #[tokio::test]
    async fn test_connectivity_is_service_unavailable() {
        let (status, body) = body_json(AppError::from(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["message"], "Service unavailable");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) = body_json(AppError::from(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
