//! Tests for the auth service.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::MockClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MailerError, MockMailer, MockPasswordHasher, MockTokenService, MockUserRepository, TokenError,
};
use crate::domain::{ErrorCode, PasswordHash, PasswordReset};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn clock() -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now());
    clock
}

fn stored_user() -> User {
    User {
        id: UserId::random(),
        name: "John Doe".into(),
        email: EmailAddress::new("john@gmail.com").expect("valid email"),
        role: Role::User,
        password_hash: PasswordHash::new("hash:123456"),
        password_reset: None,
        created_at: now(),
    }
}

/// Hasher that prefixes `hash:` so tests can reason about stored values.
fn hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hash:{password}"))));
    hasher
        .expect_verify()
        .returning(|password, hash| Ok(hash.as_str() == format!("hash:{password}")));
    hasher
}

fn tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().returning(|user| {
        Ok(IssuedToken {
            token: format!("token-for-{user}"),
            expires_at: now() + Duration::days(30),
        })
    });
    tokens
}

fn make_service(users: MockUserRepository, mailer: MockMailer) -> AuthService {
    make_service_with(users, mailer, tokens())
}

fn make_service_with(
    users: MockUserRepository,
    mailer: MockMailer,
    tokens: MockTokenService,
) -> AuthService {
    AuthService::new(
        Arc::new(users),
        Arc::new(hasher()),
        Arc::new(tokens),
        Arc::new(mailer),
        Arc::new(clock()),
        AuthServiceConfig {
            public_base_url: "http://localhost:5000/".into(),
        },
    )
}

fn draft(role: Option<&str>) -> UserDraft {
    UserDraft {
        name: Some("Jane Doe".into()),
        email: Some("jane@gmail.com".into()),
        password: Some("123456".into()),
        role: role.map(str::to_owned),
    }
}

#[tokio::test]
async fn register_refuses_admin_role() {
    let mut users = MockUserRepository::new();
    users.expect_create().times(0);
    let service = make_service(users, MockMailer::new());

    let err = service
        .register(draft(Some("admin")))
        .await
        .expect_err("admin is not self-assignable");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn register_hashes_password_and_issues_token() {
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .withf(|user| user.password_hash.as_str() == "hash:123456" && user.role == Role::Publisher)
        .times(1)
        .return_once(|_| Ok(()));
    let service = make_service(users, MockMailer::new());

    let session = service
        .register(draft(Some("publisher")))
        .await
        .expect("registered");
    assert_eq!(session.token.token, format!("token-for-{}", session.user.id));
    assert_eq!(session.user.created_at, now());
}

#[rstest]
#[case(LoginInput { email: None, password: Some("123456".into()) })]
#[case(LoginInput { email: Some("john@gmail.com".into()), password: None })]
#[tokio::test]
async fn login_requires_both_fields(#[case] input: LoginInput) {
    let service = make_service(MockUserRepository::new(), MockMailer::new());
    let err = service.login(input).await.expect_err("missing field");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Please provide an email and password");
}

#[rstest]
#[case(None, "123456")]
#[case(Some(stored_user()), "wrong-password")]
#[tokio::test]
async fn login_rejects_bad_credentials(#[case] found: Option<User>, #[case] password: &str) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| Ok(found));
    let service = make_service(users, MockMailer::new());

    let err = service
        .login(LoginInput {
            email: Some("John@Gmail.com".into()),
            password: Some(password.into()),
        })
        .await
        .expect_err("bad credentials");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Invalid credentials");
}

#[tokio::test]
async fn login_looks_up_normalised_email() {
    let user = stored_user();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email.as_ref() == "john@gmail.com")
        .return_once(move |_| Ok(Some(user)));
    let service = make_service(users, MockMailer::new());

    let session = service
        .login(LoginInput {
            email: Some(" John@Gmail.com ".into()),
            password: Some("123456".into()),
        })
        .await
        .expect("logged in");
    assert_eq!(session.user.name, "John Doe");
}

#[tokio::test]
async fn authenticate_rejects_tokens_for_deleted_users() {
    let mut tokens = MockTokenService::new();
    tokens.expect_verify().returning(|_| Ok(UserId::random()));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));
    let service = make_service_with(users, MockMailer::new(), tokens);

    let err = service
        .authenticate("stale")
        .await
        .expect_err("subject gone");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Not authorized to access this route");
}

#[tokio::test]
async fn authenticate_rejects_invalid_tokens() {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(|_| Err(TokenError::invalid("bad signature")));
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);
    let service = make_service_with(users, MockMailer::new(), tokens);

    let err = service.authenticate("forged").await.expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn update_password_checks_current_password() {
    let user = stored_user();
    let actor = Actor::from(&user);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
    users.expect_update().times(0);
    let service = make_service(users, MockMailer::new());

    let err = service
        .update_password(
            &actor,
            PasswordChange {
                current_password: Some("nope".into()),
                new_password: Some("654321".into()),
            },
        )
        .await
        .expect_err("wrong password");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Password is incorrect");
}

#[tokio::test]
async fn update_password_stores_new_hash_and_issues_token() {
    let user = stored_user();
    let actor = Actor::from(&user);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(|user| user.password_hash.as_str() == "hash:654321")
        .return_once(|_| Ok(true));
    let service = make_service(users, MockMailer::new());

    let session = service
        .update_password(
            &actor,
            PasswordChange {
                current_password: Some("123456".into()),
                new_password: Some("654321".into()),
            },
        )
        .await
        .expect("changed");
    assert_eq!(session.user.id, actor.id);
}

#[tokio::test]
async fn update_details_ignores_role() {
    let user = stored_user();
    let actor = Actor::from(&user);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
    users.expect_update().return_once(|_| Ok(true));
    let service = make_service(users, MockMailer::new());

    let updated = service
        .update_details(
            &actor,
            UserPatch {
                name: Some("John Smith".into()),
                email: None,
                role: Some("admin".into()),
            },
        )
        .await
        .expect("updated");
    assert_eq!(updated.name, "John Smith");
    assert_eq!(updated.role, Role::User);
}

#[tokio::test]
async fn forgot_password_for_unknown_email_is_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    let service = make_service(users, MockMailer::new());

    let err = service
        .forgot_password(ForgotPasswordInput {
            email: Some("nobody@gmail.com".into()),
        })
        .await
        .expect_err("unknown email");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "There is no user with that email");
}

#[tokio::test]
async fn forgot_password_mails_link_for_stored_digest() {
    let user = stored_user();
    let stored_reset: Arc<Mutex<Option<PasswordReset>>> = Arc::default();
    let sent_body: Arc<Mutex<Option<String>>> = Arc::default();

    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| Ok(Some(user)));
    let reset_slot = Arc::clone(&stored_reset);
    users.expect_update().times(1).returning(move |user| {
        *reset_slot.lock().expect("reset lock") = user.password_reset.clone();
        Ok(true)
    });
    let mut mailer = MockMailer::new();
    let body_slot = Arc::clone(&sent_body);
    mailer.expect_send().times(1).returning(move |mail| {
        *body_slot.lock().expect("body lock") = Some(mail.body.clone());
        Ok(())
    });
    let service = make_service(users, mailer);

    service
        .forgot_password(ForgotPasswordInput {
            email: Some("john@gmail.com".into()),
        })
        .await
        .expect("mail sent");

    let reset = stored_reset
        .lock()
        .expect("reset lock")
        .clone()
        .expect("reset stored");
    assert_eq!(reset.expires_at, now() + Duration::minutes(10));
    let body = sent_body
        .lock()
        .expect("body lock")
        .clone()
        .expect("mail sent");
    let token = body
        .rsplit("/api/v1/auth/resetpassword/")
        .next()
        .expect("reset link");
    assert!(body.contains("http://localhost:5000/api/v1/auth/resetpassword/"));
    assert_eq!(reset_token_digest(token.trim()), reset.token_digest);
}

#[tokio::test]
async fn forgot_password_clears_token_when_mail_fails() {
    let user = stored_user();
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(move |_| Ok(Some(user)));
    let mut sequence = mockall::Sequence::new();
    users
        .expect_update()
        .withf(|user| user.password_reset.is_some())
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(true));
    users
        .expect_update()
        .withf(|user| user.password_reset.is_none())
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Ok(true));
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .returning(|_| Err(MailerError::transport("connection refused")));
    let service = make_service(users, mailer);

    let err = service
        .forgot_password(ForgotPasswordInput {
            email: Some("john@gmail.com".into()),
        })
        .await
        .expect_err("mail failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Email could not be sent");
    assert!(err.is_exposed());
}

fn user_with_reset(expires_at: DateTime<Utc>) -> User {
    User {
        password_reset: Some(PasswordReset {
            token_digest: reset_token_digest("plain-token"),
            expires_at,
        }),
        ..stored_user()
    }
}

#[rstest]
#[case(None)]
#[case(Some(user_with_reset(now() - Duration::seconds(1))))]
#[tokio::test]
async fn reset_password_rejects_unknown_or_expired_tokens(#[case] found: Option<User>) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_reset_digest()
        .return_once(move |_| Ok(found));
    users.expect_update().times(0);
    let service = make_service(users, MockMailer::new());

    let err = service
        .reset_password(
            "plain-token",
            ResetPasswordInput {
                password: Some("654321".into()),
            },
        )
        .await
        .expect_err("invalid token");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Invalid token");
}

#[tokio::test]
async fn reset_password_sets_password_and_consumes_token() {
    let user = user_with_reset(now() + Duration::minutes(5));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_reset_digest()
        .withf(|digest| digest == reset_token_digest("plain-token"))
        .return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(|user| user.password_reset.is_none() && user.password_hash.as_str() == "hash:654321")
        .times(1)
        .return_once(|_| Ok(true));
    let service = make_service(users, MockMailer::new());

    let session = service
        .reset_password(
            "plain-token",
            ResetPasswordInput {
                password: Some("654321".into()),
            },
        )
        .await
        .expect("reset");
    assert!(session.user.password_reset.is_none());
}
