//! Admin-only user management.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::service_support::{hash_password, map_user_repository_error, user_not_found};
use crate::domain::{
    Actor, Error, ListQuery, Page, Role, User, UserDraft, UserId, UserPatch, require_role,
};

const ADMIN_ROLES: &[Role] = &[Role::Admin];
const ANY_ROLE: &[Role] = &[Role::User, Role::Publisher, Role::Admin];

/// User administration service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create a service over the user repository.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }

    /// Filter, sort and paginate every user.
    pub async fn list(&self, actor: &Actor, query: &ListQuery) -> Result<Page<User>, Error> {
        require_role(actor, ADMIN_ROLES)?;
        let users = self
            .users
            .list()
            .await
            .map_err(map_user_repository_error)?;
        query.apply(users)
    }

    /// Fetch one user.
    pub async fn get(&self, actor: &Actor, id: &UserId) -> Result<User, Error> {
        require_role(actor, ADMIN_ROLES)?;
        self.find(id).await
    }

    /// Create a user with any role.
    pub async fn create(&self, actor: &Actor, draft: UserDraft) -> Result<User, Error> {
        require_role(actor, ADMIN_ROLES)?;
        let new_user = draft.validate(ANY_ROLE)?;
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
        info!(user_id = %user.id, role = %user.role, "user created by admin");
        Ok(user)
    }

    /// Change a user's name, email or role.
    pub async fn update(&self, actor: &Actor, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        require_role(actor, ADMIN_ROLES)?;
        let mut user = self.find(id).await?;
        patch.apply(&mut user, true)?;
        let updated = self
            .users
            .update(&user)
            .await
            .map_err(map_user_repository_error)?;
        if !updated {
            return Err(user_not_found(id));
        }
        Ok(user)
    }

    /// Delete a user.
    pub async fn delete(&self, actor: &Actor, id: &UserId) -> Result<(), Error> {
        require_role(actor, ADMIN_ROLES)?;
        let removed = self
            .users
            .delete(id)
            .await
            .map_err(map_user_repository_error)?;
        if !removed {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, "user deleted by admin");
        Ok(())
    }

    async fn find(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }
}
