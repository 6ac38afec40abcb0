use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{Condition, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    #[sea_orm(string_value = "MECHANIC")]
    Mechanic,
    #[sea_orm(string_value = "SUPPLIER")]
    Supplier,
    #[sea_orm(string_value = "MANAGER")]
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Mechanic => "MECHANIC",
            Role::Supplier => "SUPPLIER",
            Role::Manager => "MANAGER",
        }
    }

    /// Mechanics and managers work inside the shop.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Mechanic | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "MECHANIC" => Ok(Role::Mechanic),
            "SUPPLIER" => Ok(Role::Supplier),
            "MANAGER" => Ok(Role::Manager),
            _ => Err(ModelError::invalid("role", format!("unknown role {s}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_account")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_algorithm: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}

/// Login accepts either the username or the account email.
pub async fn find_by_login<C: ConnectionTrait>(db: &C, login: &str) -> Result<Option<Model>, ModelError> {
    let login = login.trim();
    let cond = Condition::any()
        .add(Column::Username.eq(login))
        .add(Column::Email.eq(login.to_lowercase()));
    Ok(Entity::find().filter(cond).one(db).await?)
}

pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str) -> Result<bool, ModelError> {
    Ok(find_by_username(db, username).await?.is_some())
}
