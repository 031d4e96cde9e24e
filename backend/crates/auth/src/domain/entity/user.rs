//! User Entity
//!
//! Core user profile entity containing non-sensitive user data.
//! Credentials are in the Credential entity.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    UserId, UserRole, public_id::PublicId, user_name::UserName, user_status::UserStatus,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// User name (unique, for login and display)
    pub user_name: UserName,
    /// Role (student, training center, testing center, admin, super admin)
    pub user_role: UserRole,
    /// Status (active, disabled)
    pub user_status: UserStatus,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given role
    pub fn new(user_name: UserName, user_role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            user_name,
            user_role,
            user_status: UserStatus::default(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Check if user can login
    pub fn can_login(&self) -> bool {
        self.user_status.can_login()
    }

    /// Update user status
    pub fn set_status(&mut self, status: UserStatus) {
        self.user_status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let name = UserName::new("riyadh_center").unwrap();
        let user = User::new(name, UserRole::TrainingCenter);

        assert_eq!(user.user_role, UserRole::TrainingCenter);
        assert_eq!(user.user_status, UserStatus::Active);
        assert!(user.last_login_at.is_none());
        assert!(user.can_login());
    }

    #[test]
    fn test_record_login() {
        let name = UserName::new("student1").unwrap();
        let mut user = User::new(name, UserRole::Student);

        user.record_login();
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn test_disabled_user_cannot_login() {
        let name = UserName::new("student1").unwrap();
        let mut user = User::new(name, UserRole::Student);

        user.set_status(UserStatus::Disabled);
        assert!(!user.can_login());
    }
}
