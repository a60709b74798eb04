//! Identity provider capability and the auth session command mapping.
//!
//! The core never caches credentials: every command re-resolves the current
//! app/user through the provider's accessors at call time and maps the
//! outcome to events. Two precondition failures are deliberately handled
//! differently: a missing app is a silent no-op, while a missing current
//! user is reported as [`AuthError::CurrentUserNotFound`].

use crate::command::SignUpCompletion;
use crate::error::AuthError;
use crate::event::{AuthAction, Event, EventSink};
use std::sync::Arc;
use tracing::debug;

/// A user as resolved by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Provider-assigned user id.
    pub user_id: String,
    /// The user's email address.
    pub email: String,
    /// Whether the email address is verified.
    pub email_verified: bool,
}

/// The capability set the core needs from the external identity service.
///
/// `sign_in` and `create_user` return `Ok(None)` when the provider call
/// succeeded but yielded no user; the session manager reports that as a
/// distinct failure from a provider error.
pub trait IdentityProvider: Send + Sync {
    /// Whether an app context is resolvable at all.
    fn app_available(&self) -> bool;

    /// Resolves the current session user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Signs a user in.
    fn sign_in(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Creates a new account.
    fn create_user(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Changes the current user's password.
    fn update_password(&self, password: &str) -> Result<(), AuthError>;

    /// Changes the current user's email.
    fn update_email(&self, email: &str) -> Result<(), AuthError>;

    /// Sends a password reset email.
    fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Signs the current user out.
    fn sign_out(&self) -> Result<(), AuthError>;

    /// Re-resolves the current user from the provider.
    fn reload_current_user(&self) -> Result<AuthUser, AuthError>;

    /// Sends a verification email to a user.
    fn send_email_verification(&self, user: &AuthUser) -> Result<(), AuthError>;
}

/// Maps identity-service outcomes to events.
pub struct AuthSessionManager {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthSessionManager {
    /// Creates a session manager over an identity provider.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Logs a user in.
    ///
    /// With no resolvable app this is a silent no-op (defensive guard, not
    /// an error event).
    pub fn log_in<T>(&self, email: &str, password: &str, sink: &dyn EventSink<T>) {
        if !self.provider.app_available() {
            debug!("log in skipped: no resolvable app");
            return;
        }
        match self.provider.sign_in(email, password) {
            Ok(Some(user)) => sink.accept(Event::UserLoggedIn {
                user_id: user.user_id,
                email_verified: user.email_verified,
                email: user.email,
            }),
            Ok(None) => sink.accept(Event::UserAuthFailed(AuthError::LogInMissingUserId)),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Creates an account.
    ///
    /// On success always emits the signed-up event. When `completion` is
    /// supplied it receives the new user id and no further event follows;
    /// otherwise a logged-in event is emitted as well.
    pub fn sign_up<T>(
        &self,
        email: &str,
        password: &str,
        completion: Option<SignUpCompletion>,
        sink: &dyn EventSink<T>,
    ) {
        match self.provider.create_user(email, password) {
            Ok(Some(user)) => {
                sink.accept(Event::UserSignedUp {
                    user_id: user.user_id.clone(),
                    email: user.email.clone(),
                });
                match completion {
                    Some(completion) => completion(user.user_id),
                    None => sink.accept(Event::UserLoggedIn {
                        user_id: user.user_id,
                        email_verified: user.email_verified,
                        email: user.email,
                    }),
                }
            }
            Ok(None) => sink.accept(Event::UserAuthFailed(AuthError::SignUpFailedLogIn)),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Changes the current user's password.
    pub fn change_password<T>(&self, password: &str, sink: &dyn EventSink<T>) {
        if self.provider.current_user().is_none() {
            sink.accept(Event::UserAuthFailed(AuthError::CurrentUserNotFound));
            return;
        }
        match self.provider.update_password(password) {
            Ok(()) => sink.accept(Event::UserAuthenticationAction(AuthAction::PasswordChanged)),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Changes the current user's email.
    pub fn change_email<T>(&self, email: &str, sink: &dyn EventSink<T>) {
        if self.provider.current_user().is_none() {
            sink.accept(Event::UserAuthFailed(AuthError::CurrentUserNotFound));
            return;
        }
        match self.provider.update_email(email) {
            Ok(()) => sink.accept(Event::UserAuthenticationAction(AuthAction::EmailChanged)),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Sends a password reset email.
    pub fn reset_password<T>(&self, email: &str, sink: &dyn EventSink<T>) {
        match self.provider.send_password_reset(email) {
            Ok(()) => sink.accept(Event::UserAuthenticationAction(AuthAction::PasswordReset)),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Logs the current user out.
    pub fn log_out<T>(&self, sink: &dyn EventSink<T>) {
        match self.provider.sign_out() {
            Ok(()) => sink.accept(Event::UserLoggedOut),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Re-resolves the current user.
    pub fn reload_current_user<T>(&self, sink: &dyn EventSink<T>) {
        match self.provider.reload_current_user() {
            Ok(user) => sink.accept(Event::UserIdentified {
                user_id: user.user_id,
                email_verified: user.email_verified,
            }),
            Err(error) => sink.accept(Event::UserAuthFailed(error)),
        }
    }

    /// Sends a verification email.
    ///
    /// The explicit `user` argument takes precedence over the current
    /// session user. Failures here are minor and recoverable, so they are
    /// reported as [`Event::EmailVerificationError`] rather than the
    /// auth-failed class.
    pub fn send_email_verification<T>(&self, user: Option<AuthUser>, sink: &dyn EventSink<T>) {
        let target = user.or_else(|| self.provider.current_user());
        let Some(target) = target else {
            sink.accept(Event::EmailVerificationError(AuthError::CurrentUserNotFound));
            return;
        };
        match self.provider.send_email_verification(&target) {
            Ok(()) => sink.accept(Event::UserAuthenticationAction(
                AuthAction::EmailVerificationSent,
            )),
            Err(error) => sink.accept(Event::EmailVerificationError(error)),
        }
    }
}
