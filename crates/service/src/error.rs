use thiserror::Error;

use tally_core::DomainError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation was rejected; the ledger is unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A writer panicked while holding the state lock.
    #[error("ledger state lock poisoned")]
    Poisoned,
}

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_validation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_not_found())
    }
}
