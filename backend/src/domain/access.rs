//! Role gate and ownership check shared by every mutating operation.

use super::{Error, Role, User, UserId};

/// Identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    /// Build an actor from its parts.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Entities carrying the `user` reference that grants mutation rights.
pub trait Owned {
    /// User recorded as the entity's owner or author.
    fn owner(&self) -> UserId;
}

/// Reject actors whose role is not in `allowed`.
///
/// # Examples
/// ```
/// use devcamper::domain::{Actor, Role, UserId, require_role};
///
/// let actor = Actor::new(UserId::random(), Role::User);
/// assert!(require_role(&actor, &[Role::Publisher, Role::Admin]).is_err());
/// assert!(require_role(&actor, &[Role::User, Role::Admin]).is_ok());
/// ```
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), Error> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "User role {} is not authorized to access this route",
            actor.role
        )))
    }
}

/// Permit owners and admins; everyone else is forbidden to `action`.
///
/// Call only after the entity is known to exist.
pub fn ensure_can_modify<T: Owned + ?Sized>(
    actor: &Actor,
    entity: &T,
    action: &str,
) -> Result<(), Error> {
    if actor.is_admin() || entity.owner() == actor.id {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "User {} is not authorized to {action}",
            actor.id
        )))
    }
}
