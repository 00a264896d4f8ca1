//! Service-level errors and their client-facing classification.

use crate::mission::{
    domain::{MissionDomainError, UserId},
    ports::{MembershipRepositoryError, MissionRepositoryError, UserDirectoryError},
};
use std::fmt;
use thiserror::Error;

/// Client-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced mission, user, or material line does not exist.
    NotFound,
    /// A lifecycle precondition failed.
    Conflict,
    /// The caller lacks the role required for the operation.
    Forbidden,
    /// Input is malformed or incomplete.
    ValidationFailed,
    /// Infrastructure failure unrelated to the request.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for mission lifecycle operations.
#[derive(Debug, Error)]
pub enum MissionServiceError {
    /// Domain validation or a lifecycle rule failed.
    #[error(transparent)]
    Domain(#[from] MissionDomainError),
    /// Mission repository operation failed.
    #[error(transparent)]
    Repository(#[from] MissionRepositoryError),
    /// Membership repository operation failed.
    #[error(transparent)]
    Membership(#[from] MembershipRepositoryError),
    /// User directory lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
    /// A referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    /// A publication target does not hold the instrumentist role.
    #[error("publication target {0} is not an instrumentist")]
    TargetNotInstrumentist(UserId),
}

impl MissionServiceError {
    /// Classifies the error for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) | Self::Repository(MissionRepositoryError::Rejected(err)) => {
                domain_kind(err)
            }
            Self::Repository(
                MissionRepositoryError::DuplicateMission(_)
                | MissionRepositoryError::DuplicateClaim(_),
            )
            | Self::Membership(MembershipRepositoryError::DuplicateMembership { .. }) => {
                ErrorKind::Conflict
            }
            Self::Repository(MissionRepositoryError::NotFound(_)) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::TargetNotInstrumentist(_) => ErrorKind::ValidationFailed,
            Self::Repository(MissionRepositoryError::Persistence(_))
            | Self::Membership(MembershipRepositoryError::Persistence(_))
            | Self::Directory(_) => ErrorKind::Internal,
        }
    }
}

const fn domain_kind(err: &MissionDomainError) -> ErrorKind {
    match err {
        MissionDomainError::InvalidStatusTransition { .. }
        | MissionDomainError::AlreadyAssigned(_)
        | MissionDomainError::EncodingBeforeStart(_)
        | MissionDomainError::EncodingLocked(_)
        | MissionDomainError::NotEncodable { .. } => ErrorKind::Conflict,
        MissionDomainError::NotAssignedInstrumentist { .. }
        | MissionDomainError::NotPrivileged(_)
        | MissionDomainError::NotInstrumentist(_) => ErrorKind::Forbidden,
        MissionDomainError::InvalidSchedule { .. }
        | MissionDomainError::MissingPublicationTarget
        | MissionDomainError::InvalidQuantity(_)
        | MissionDomainError::EmptyMaterialItem => ErrorKind::ValidationFailed,
        MissionDomainError::MaterialLineNotFound { .. } => ErrorKind::NotFound,
    }
}

/// Result type for mission service operations.
pub type MissionServiceResult<T> = Result<T, MissionServiceError>;
