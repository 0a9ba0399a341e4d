use crate::entity::null_as_default;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Role
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[display("admin")]
    Admin,

    #[default]
    #[display("user")]
    User,
}

///
/// UserType
///
/// Marketplace side of the account. `Indefinido` means onboarding has not
/// picked a side yet; unknown values decode as `Indefinido` too.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[display("cliente")]
    Cliente,

    #[display("prestador")]
    Prestador,

    #[default]
    #[serde(other)]
    #[display("indefinido")]
    Indefinido,
}

///
/// SessionUser
///
/// The signed-in identity and its role/user_type claims.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user_type: UserType,
}

impl SessionUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            full_name: String::new(),
            role: Role::User,
            user_type: UserType::Indefinido,
        }
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub const fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    #[must_use]
    pub const fn needs_setup(&self) -> bool {
        matches!(self.user_type, UserType::Indefinido)
    }
}

///
/// TESTS
///
