//! Scriptable identity provider.

use parking_lot::Mutex;
use statewire_core::{AuthError, AuthUser, IdentityProvider};
use std::sync::atomic::{AtomicBool, Ordering};

type UserOutcome = Result<Option<AuthUser>, AuthError>;

/// An [`IdentityProvider`] with scripted outcomes.
///
/// Sign-in and account creation must be scripted through
/// [`set_sign_in`](Self::set_sign_in) / [`set_create_user`](Self::set_create_user)
/// and report an error otherwise, mirroring an unreachable provider. Unit
/// operations succeed unless a failure is scripted. Successful sign-in and
/// sign-up establish the session user; sign-out clears it.
pub struct MockIdentityProvider {
    app_available: AtomicBool,
    current_user: Mutex<Option<AuthUser>>,
    sign_in_outcome: Mutex<Option<UserOutcome>>,
    create_user_outcome: Mutex<Option<UserOutcome>>,
    update_password_error: Mutex<Option<AuthError>>,
    update_email_error: Mutex<Option<AuthError>>,
    password_reset_error: Mutex<Option<AuthError>>,
    sign_out_error: Mutex<Option<AuthError>>,
    verification_error: Mutex<Option<AuthError>>,
    verification_targets: Mutex<Vec<AuthUser>>,
}

impl MockIdentityProvider {
    /// Creates a provider with a resolvable app and no session user.
    pub fn new() -> Self {
        Self {
            app_available: AtomicBool::new(true),
            current_user: Mutex::new(None),
            sign_in_outcome: Mutex::new(None),
            create_user_outcome: Mutex::new(None),
            update_password_error: Mutex::new(None),
            update_email_error: Mutex::new(None),
            password_reset_error: Mutex::new(None),
            sign_out_error: Mutex::new(None),
            verification_error: Mutex::new(None),
            verification_targets: Mutex::new(Vec::new()),
        }
    }

    /// Sets whether an app context is resolvable.
    pub fn set_app_available(&self, available: bool) {
        self.app_available.store(available, Ordering::SeqCst);
    }

    /// Sets the current session user.
    pub fn set_current_user(&self, user: Option<AuthUser>) {
        *self.current_user.lock() = user;
    }

    /// Scripts the sign-in outcome.
    pub fn set_sign_in(&self, outcome: UserOutcome) {
        *self.sign_in_outcome.lock() = Some(outcome);
    }

    /// Scripts the account-creation outcome.
    pub fn set_create_user(&self, outcome: UserOutcome) {
        *self.create_user_outcome.lock() = Some(outcome);
    }

    /// Makes password changes fail.
    pub fn fail_update_password(&self, error: AuthError) {
        *self.update_password_error.lock() = Some(error);
    }

    /// Makes email changes fail.
    pub fn fail_update_email(&self, error: AuthError) {
        *self.update_email_error.lock() = Some(error);
    }

    /// Makes password resets fail.
    pub fn fail_password_reset(&self, error: AuthError) {
        *self.password_reset_error.lock() = Some(error);
    }

    /// Makes sign-out fail.
    pub fn fail_sign_out(&self, error: AuthError) {
        *self.sign_out_error.lock() = Some(error);
    }

    /// Makes verification emails fail.
    pub fn fail_email_verification(&self, error: AuthError) {
        *self.verification_error.lock() = Some(error);
    }

    /// Returns the users verification emails were sent to, in order.
    pub fn verification_targets(&self) -> Vec<AuthUser> {
        self.verification_targets.lock().clone()
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn app_available(&self) -> bool {
        self.app_available.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current_user.lock().clone()
    }

    fn sign_in(&self, _email: &str, _password: &str) -> UserOutcome {
        let outcome = self
            .sign_in_outcome
            .lock()
            .clone()
            .unwrap_or_else(|| Err(AuthError::Provider("no scripted sign-in outcome".into())));
        if let Ok(Some(user)) = &outcome {
            *self.current_user.lock() = Some(user.clone());
        }
        outcome
    }

    fn create_user(&self, _email: &str, _password: &str) -> UserOutcome {
        let outcome = self
            .create_user_outcome
            .lock()
            .clone()
            .unwrap_or_else(|| Err(AuthError::Provider("no scripted sign-up outcome".into())));
        if let Ok(Some(user)) = &outcome {
            *self.current_user.lock() = Some(user.clone());
        }
        outcome
    }

    fn update_password(&self, _password: &str) -> Result<(), AuthError> {
        match self.update_password_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn update_email(&self, _email: &str) -> Result<(), AuthError> {
        match self.update_email_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn send_password_reset(&self, _email: &str) -> Result<(), AuthError> {
        match self.password_reset_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(error) = self.sign_out_error.lock().clone() {
            return Err(error);
        }
        *self.current_user.lock() = None;
        Ok(())
    }

    fn reload_current_user(&self) -> Result<AuthUser, AuthError> {
        self.current_user
            .lock()
            .clone()
            .ok_or(AuthError::CurrentUserNotFound)
    }

    fn send_email_verification(&self, user: &AuthUser) -> Result<(), AuthError> {
        self.verification_targets.lock().push(user.clone());
        match self.verification_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
