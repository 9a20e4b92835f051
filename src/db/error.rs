use serde::Serialize;
use sqlx::error::ErrorKind;

use crate::validation::ValidationFailure;

/// Which storage constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    /// NUMERIC precision overflow (SQLSTATE 22003).
    NumericRange,
    /// VARCHAR length overflow (SQLSTATE 22001).
    Length,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Unique => write!(f, "unique"),
            ConstraintKind::ForeignKey => write!(f, "foreign key"),
            ConstraintKind::NotNull => write!(f, "not null"),
            ConstraintKind::Check => write!(f, "check"),
            ConstraintKind::NumericRange => write!(f, "numeric range"),
            ConstraintKind::Length => write!(f, "length"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} constraint violated: {message}")]
pub struct IntegrityViolation {
    pub kind: ConstraintKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    pub message: String,
}

impl IntegrityViolation {
    pub fn is_unique(&self) -> bool {
        self.kind == ConstraintKind::Unique
    }

    fn from_sqlx(err: &sqlx::Error) -> Option<Self> {
        let sqlx::Error::Database(db) = err else {
            return None;
        };
        let kind = classify_constraint(db.kind(), db.code().as_deref())?;
        Some(Self {
            kind,
            constraint: db.constraint().map(str::to_owned),
            message: db.message().to_owned(),
        })
    }
}

/// Map a PostgreSQL error onto a constraint kind, if it is one.
pub fn classify_constraint(kind: ErrorKind, code: Option<&str>) -> Option<ConstraintKind> {
    match kind {
        ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
        ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
        ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
        ErrorKind::CheckViolation => Some(ConstraintKind::Check),
        _ => match code {
            Some("22003") => Some(ConstraintKind::NumericRange),
            Some("22001") => Some(ConstraintKind::Length),
            _ => None,
        },
    }
}

/// Errors from the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid row: {0}")]
    Invalid(#[from] ValidationFailure),

    #[error("Integrity violation: {0}")]
    Integrity(IntegrityViolation),

    #[error("Database unreachable: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Connectivity(_))
    }

    pub fn integrity(&self) -> Option<&IntegrityViolation> {
        match self {
            StoreError::Integrity(v) => Some(v),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(violation) = IntegrityViolation::from_sqlx(&err) {
            return StoreError::Integrity(violation);
        }
        if is_connectivity_error(&err) {
            StoreError::Connectivity(err)
        } else {
            StoreError::Database(err)
        }
    }
}

pub fn is_connectivity_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        // SQLSTATE class 08: connection exception; 57P01..57P03: server shutting down
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|c| c.starts_with("08") || c.starts_with("57P0")),
        _ => false,
    }
}
