//! Identity resolved from a bearer token.

use serde::Serialize;

use minimart_core::{UserId, UserLevel, Username};

use super::User;

/// The user making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: Username,
    pub level: UserLevel,
}

impl CurrentUser {
    /// Upgrade to an [`AdminUser`] if this user holds the admin level.
    #[must_use]
    pub fn into_admin(self) -> Option<AdminUser> {
        self.level.is_admin().then_some(AdminUser(self))
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            level: user.level,
        }
    }
}

/// Proof that the caller is an administrator.
///
/// Only constructible through [`CurrentUser::into_admin`], so catalog
/// mutations that take `&AdminUser` cannot be reached by ordinary users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(CurrentUser);

impl AdminUser {
    /// The underlying user.
    #[must_use]
    pub const fn user(&self) -> &CurrentUser {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(level: UserLevel) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: Username::parse("pat").unwrap(),
            level,
        }
    }

    #[test]
    fn test_customer_cannot_become_admin() {
        assert!(user(UserLevel::Customer).into_admin().is_none());
    }

    #[test]
    fn test_admin_upgrade_keeps_identity() {
        let admin = user(UserLevel::Admin).into_admin();
        assert_eq!(admin.map(|a| a.user().id), Some(UserId::new(1)));
    }
}
