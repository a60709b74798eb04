//! Error types for the dispatch core.

use thiserror::Error;

/// Result type for remote store and blob operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the remote store and blob collaborators.
///
/// The core never retries these; they are forwarded verbatim to the
/// relevant completion callback or logged at the dispatch boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network or transport failure reported by the remote collaborator.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service rejected the operation.
    #[error("remote service rejected the operation: {0}")]
    Rejected(String),

    /// A binary transfer failed.
    #[error("blob transfer failed: {0}")]
    Blob(String),
}

/// Errors produced while executing identity-service commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider reported a successful log-in but returned no user id.
    #[error("log in returned no user id")]
    LogInMissingUserId,

    /// Sign-up succeeded but the provider yielded no user to log in.
    #[error("sign up did not yield a user")]
    SignUpFailedLogIn,

    /// The operation requires a current user and none is resolvable.
    #[error("no current user")]
    CurrentUserNotFound,

    /// Any other failure reported by the identity provider.
    #[error("identity provider error: {0}")]
    Provider(String),
}
