//! Registration, login, token authentication and password recovery.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    IssuedToken, Mailer, OutgoingMail, PasswordHasher, TokenService, UserRepository,
};
use crate::domain::service_support::{
    hash_password, map_mailer_error, map_token_error, map_user_repository_error, verify_password,
};
use crate::domain::{
    Actor, EmailAddress, Error, ForgotPasswordInput, LoginCredentials, LoginInput, PasswordChange,
    ResetPasswordInput, Role, User, UserDraft, UserId, UserPatch, issue_reset_token,
    reset_token_digest, validate_new_password,
};

const SELF_SERVICE_ROLES: &[Role] = &[Role::User, Role::Publisher];
const NOT_AUTHORIZED: &str = "Not authorized to access this route";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Settings that shape outbound auth messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthServiceConfig {
    /// Public origin prefixed to password reset links, without a trailing slash.
    pub public_base_url: String,
}

/// Authenticated user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: IssuedToken,
    pub user: User,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
}

impl AuthService {
    /// Create the service from its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            mailer,
            clock,
            config,
        }
    }

    /// Register a `user` or `publisher` account and sign it in.
    pub async fn register(&self, draft: UserDraft) -> Result<Session, Error> {
        let new_user = draft.validate(SELF_SERVICE_ROLES)?;
        let password_hash = hash_password(&self.hasher, new_user.password).await?;
        let user = User {
            id: UserId::random(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            password_hash,
            password_reset: None,
            created_at: self.clock.utc(),
        };
        self.users
            .create(&user)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        self.session(user)
    }

    /// Check credentials and sign the user in.
    pub async fn login(&self, input: LoginInput) -> Result<Session, Error> {
        let credentials = LoginCredentials::try_from(input)?;
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let matches = verify_password(
            &self.hasher,
            Zeroizing::new(credentials.password().to_owned()),
            user.password_hash.clone(),
        )
        .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session(user)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Tokens whose subject no longer exists are rejected.
    pub async fn authenticate(&self, token: &str) -> Result<User, Error> {
        let user_id = self.tokens.verify(token).map_err(map_token_error)?;
        self.users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED))
    }

    /// Change the actor's own name or email; role changes are ignored.
    pub async fn update_details(&self, actor: &Actor, patch: UserPatch) -> Result<User, Error> {
        let mut user = self.current(actor).await?;
        patch.apply(&mut user, false)?;
        self.store(&user).await?;
        Ok(user)
    }

    /// Change the actor's password after checking the current one.
    pub async fn update_password(
        &self,
        actor: &Actor,
        change: PasswordChange,
    ) -> Result<Session, Error> {
        let mut user = self.current(actor).await?;
        let new_password = validate_new_password(change.new_password)?;
        let current = Zeroizing::new(change.current_password.unwrap_or_default());
        let matches = verify_password(&self.hasher, current, user.password_hash.clone()).await?;
        if !matches {
            return Err(Error::unauthorized("Password is incorrect"));
        }
        user.password_hash = hash_password(&self.hasher, new_password).await?;
        self.store(&user).await?;
        info!(user_id = %user.id, "password changed");
        self.session(user)
    }

    /// Issue a reset token and mail its link to the account holder.
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Result<(), Error> {
        let email = EmailAddress::lookup_key(input.email.as_deref().unwrap_or_default());
        let mut user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found("There is no user with that email"))?;

        let issued = issue_reset_token(self.clock.utc());
        user.password_reset = Some(issued.reset);
        self.store(&user).await?;

        let reset_url = format!(
            "{}/api/v1/auth/resetpassword/{}",
            self.config.public_base_url.trim_end_matches('/'),
            issued.token.as_str()
        );
        let mail = OutgoingMail {
            to: user.email.clone(),
            subject: "Password reset token".to_owned(),
            body: format!(
                "You are receiving this email because you (or someone else) has requested \
                 the reset of a password. Please make a PUT request to: \n\n {reset_url}"
            ),
        };
        if let Err(error) = self.mailer.send(&mail).await {
            user.password_reset = None;
            if let Err(clear_error) = self.store(&user).await {
                warn!(user_id = %user.id, error = %clear_error, "failed to clear reset token");
            }
            return Err(map_mailer_error(error));
        }
        info!(user_id = %user.id, "password reset token sent");
        Ok(())
    }

    /// Set a new password using a mailed reset token.
    ///
    /// The token is single-use and must not have expired.
    pub async fn reset_password(
        &self,
        token: &str,
        input: ResetPasswordInput,
    ) -> Result<Session, Error> {
        let digest = reset_token_digest(token);
        let now = self.clock.utc();
        let mut user = self
            .users
            .find_by_reset_digest(&digest)
            .await
            .map_err(map_user_repository_error)?
            .filter(|user| {
                user.password_reset
                    .as_ref()
                    .is_some_and(|reset| reset.is_valid_at(now))
            })
            .ok_or_else(|| Error::invalid_request("Invalid token"))?;

        let password = validate_new_password(input.password)?;
        user.password_hash = hash_password(&self.hasher, password).await?;
        user.password_reset = None;
        self.store(&user).await?;
        info!(user_id = %user.id, "password reset");
        self.session(user)
    }

    async fn current(&self, actor: &Actor) -> Result<User, Error> {
        self.users
            .find_by_id(&actor.id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized(NOT_AUTHORIZED))
    }

    async fn store(&self, user: &User) -> Result<(), Error> {
        let updated = self
            .users
            .update(user)
            .await
            .map_err(map_user_repository_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::unauthorized(NOT_AUTHORIZED))
        }
    }

    fn session(&self, user: User) -> Result<Session, Error> {
        let token = self.tokens.issue(&user.id).map_err(map_token_error)?;
        Ok(Session { token, user })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
