//! Auth session manager tests against the mock identity provider.

use statewire_core::{AuthAction, AuthError, AuthSessionManager, AuthUser, Event, IdentityProvider};
use statewire_testkit::{CollectingSink, MockIdentityProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn user(id: &str, email: &str) -> AuthUser {
    AuthUser {
        user_id: id.into(),
        email: email.into(),
        email_verified: false,
    }
}

fn manager(provider: &Arc<MockIdentityProvider>) -> AuthSessionManager {
    AuthSessionManager::new(Arc::clone(provider) as Arc<dyn IdentityProvider>)
}

#[test]
fn log_in_success() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_sign_in(Ok(Some(user("u1", "ada@example.com"))));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).log_in("ada@example.com", "pw", &sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserLoggedIn {
            user_id: "u1".into(),
            email_verified: false,
            email: "ada@example.com".into(),
        }]
    );
}

#[test]
fn log_in_without_app_is_silent() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_app_available(false);
    provider.set_sign_in(Ok(Some(user("u1", "ada@example.com"))));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).log_in("ada@example.com", "pw", &sink);

    assert!(sink.take().is_empty());
}

#[test]
fn log_in_with_no_user_id_fails() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_sign_in(Ok(None));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).log_in("ada@example.com", "pw", &sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserAuthFailed(AuthError::LogInMissingUserId)]
    );
}

#[test]
fn sign_up_without_completion_also_logs_in() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_create_user(Ok(Some(user("u2", "ada@example.com"))));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).sign_up("ada@example.com", "pw", None, &sink);

    assert_eq!(
        sink.take(),
        vec![
            Event::UserSignedUp {
                user_id: "u2".into(),
                email: "ada@example.com".into(),
            },
            Event::UserLoggedIn {
                user_id: "u2".into(),
                email_verified: false,
                email: "ada@example.com".into(),
            },
        ]
    );
}

#[test]
fn sign_up_with_completion_suppresses_log_in() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_create_user(Ok(Some(user("u2", "ada@example.com"))));
    let sink: CollectingSink<()> = CollectingSink::new();

    let called = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&called);
    manager(&provider).sign_up(
        "ada@example.com",
        "pw",
        Some(Box::new(move |user_id| {
            assert_eq!(user_id, "u2");
            flag.store(true, Ordering::SeqCst);
        })),
        &sink,
    );

    assert!(called.load(Ordering::SeqCst));
    assert_eq!(
        sink.take(),
        vec![Event::UserSignedUp {
            user_id: "u2".into(),
            email: "ada@example.com".into(),
        }]
    );
}

#[test]
fn sign_up_with_no_user_fails() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_create_user(Ok(None));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).sign_up("ada@example.com", "pw", None, &sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserAuthFailed(AuthError::SignUpFailedLogIn)]
    );
}

#[test]
fn change_password_requires_current_user() {
    let provider = Arc::new(MockIdentityProvider::new());
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).change_password("new-pw", &sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserAuthFailed(AuthError::CurrentUserNotFound)]
    );
}

#[test]
fn change_password_and_email_success() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_current_user(Some(user("u1", "ada@example.com")));
    let sink: CollectingSink<()> = CollectingSink::new();
    let manager = manager(&provider);

    manager.change_password("new-pw", &sink);
    manager.change_email("new@example.com", &sink);

    assert_eq!(
        sink.take(),
        vec![
            Event::UserAuthenticationAction(AuthAction::PasswordChanged),
            Event::UserAuthenticationAction(AuthAction::EmailChanged),
        ]
    );
}

#[test]
fn reset_password_and_log_out() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_current_user(Some(user("u1", "ada@example.com")));
    let sink: CollectingSink<()> = CollectingSink::new();
    let manager = manager(&provider);

    manager.reset_password("ada@example.com", &sink);
    manager.log_out(&sink);

    assert_eq!(
        sink.take(),
        vec![
            Event::UserAuthenticationAction(AuthAction::PasswordReset),
            Event::UserLoggedOut,
        ]
    );
}

#[test]
fn reload_current_user_identifies() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_current_user(Some(AuthUser {
        user_id: "u1".into(),
        email: "ada@example.com".into(),
        email_verified: true,
    }));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).reload_current_user(&sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserIdentified {
            user_id: "u1".into(),
            email_verified: true,
        }]
    );
}

#[test]
fn email_verification_prefers_explicit_user() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_current_user(Some(user("session", "s@example.com")));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).send_email_verification(Some(user("explicit", "e@example.com")), &sink);

    assert_eq!(
        provider.verification_targets(),
        vec![user("explicit", "e@example.com")]
    );
    assert_eq!(
        sink.take(),
        vec![Event::UserAuthenticationAction(
            AuthAction::EmailVerificationSent
        )]
    );
}

#[test]
fn email_verification_failure_is_minor() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_current_user(Some(user("u1", "ada@example.com")));
    provider.fail_email_verification(AuthError::Provider("smtp down".into()));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).send_email_verification(None, &sink);

    assert_eq!(
        sink.take(),
        vec![Event::EmailVerificationError(AuthError::Provider(
            "smtp down".into()
        ))]
    );
}

#[test]
fn provider_errors_are_wrapped_as_auth_failed() {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.set_sign_in(Err(AuthError::Provider("bad credentials".into())));
    let sink: CollectingSink<()> = CollectingSink::new();

    manager(&provider).log_in("ada@example.com", "pw", &sink);

    assert_eq!(
        sink.take(),
        vec![Event::UserAuthFailed(AuthError::Provider(
            "bad credentials".into()
        ))]
    );
}
