//! Caller identity and the role checks every operation starts with.
use models::{customer, mechanic, supplier, Role};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Authenticated caller, taken from a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn require_staff(&self) -> Result<(), ServiceError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("staff only"))
        }
    }

    pub fn require_manager(&self) -> Result<(), ServiceError> {
        self.require_one_of(&[Role::Manager])
    }

    pub fn require_one_of(&self, roles: &[Role]) -> Result<(), ServiceError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(format!("role {} not allowed", self.role)))
        }
    }
}

/// Customer profile linked to the caller's login.
pub async fn customer_profile<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<customer::Model, ServiceError> {
    customer::find_by_user(db, actor.user_id)
        .await?
        .ok_or_else(|| ServiceError::forbidden("no customer profile for this account"))
}

pub async fn mechanic_profile<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
) -> Result<Option<mechanic::Model>, ServiceError> {
    Ok(mechanic::find_by_user(db, actor.user_id).await?)
}

pub async fn supplier_profile<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<supplier::Model, ServiceError> {
    supplier::find_by_user(db, actor.user_id)
        .await?
        .ok_or_else(|| ServiceError::forbidden("no supplier profile for this account"))
}

/// Staff see everything; a customer only rows owned by their own profile.
pub async fn ensure_owner_or_staff<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    owner_customer_id: Uuid,
) -> Result<(), ServiceError> {
    if actor.is_staff() {
        return Ok(());
    }
    if actor.role == Role::Customer && customer_profile(db, actor).await?.id == owner_customer_id {
        return Ok(());
    }
    Err(ServiceError::forbidden("not your record"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_gates() {
        let mech = Actor::new(Uuid::new_v4(), Role::Mechanic);
        let cust = Actor::new(Uuid::new_v4(), Role::Customer);
        assert!(mech.require_staff().is_ok());
        assert!(mech.require_manager().is_err());
        assert!(matches!(cust.require_staff(), Err(ServiceError::Forbidden(_))));
        assert!(cust.require_one_of(&[Role::Customer, Role::Manager]).is_ok());
    }
}
