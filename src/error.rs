use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Seat already booked for this occurrence")]
    AlreadyBooked,
    #[error("Occurrence has already started")]
    AlreadyStarted,
    #[error("Occurrence is fully booked")]
    Full,
    #[error("Reservation is already cancelled")]
    AlreadyCancelled,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Transient failure: {0}")]
    Transient(String),
    #[error("Notification rejected: {0}")]
    Notify(String),
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// Whether a retry of the same call has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Transient(_) => true,
            EngineError::Database(e) => match e {
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
                _ => {
                    if let Some(db_err) = e.as_database_error()
                        && let Some(code) = db_err.code()
                    {
                        // 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED, 517 = SQLITE_BUSY_SNAPSHOT
                        // 40001 = PostgreSQL serialization failure
                        // 40P01 = PostgreSQL deadlock detected
                        matches!(code.as_ref(), "5" | "6" | "517" | "40001" | "40P01")
                    } else {
                        false
                    }
                }
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_variant_is_retryable() {
        assert!(EngineError::Transient("timeout".into()).is_transient());
    }

    #[test]
    fn domain_rejections_are_not_retryable() {
        assert!(!EngineError::AlreadyBooked.is_transient());
        assert!(!EngineError::Full.is_transient());
        assert!(!EngineError::NotFound("occurrence abc".into()).is_transient());
    }

    #[test]
    fn pool_timeout_is_retryable() {
        assert!(EngineError::Database(sqlx::Error::PoolTimedOut).is_transient());
    }
}
