use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] casebook_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] casebook_core::error::CoreError),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

impl ServiceError {
    /// ## Summary
    /// Builds a not-found error for an entity/id pair.
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }

    /// True when this error is a unique-constraint race on a uniquely-owned
    /// resource (document slot, referral identity).
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::DatabaseError(db) => db.is_unique_violation(),
            Self::DieselError(e) => matches!(
                e,
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                )
            ),
            _ => false,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
