//! Role vocabulary shared by all domains
//!
//! The portal's role set is closed and consulted on every state-changing
//! request: the session crate records it, the auth crate assigns it, and
//! the accreditation crate authorizes review transitions against it.
//! That cross-domain reach is why it lives in the kernel.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User role
///
/// Static permission predicates hang off this enum; there is no dynamic
/// permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserRole {
    #[default]
    Student = 0,
    TrainingCenter = 1,
    TestingCenter = 2,
    Admin = 3,
    SuperAdmin = 4,
}

impl UserRole {
    /// Numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// String code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Student => "student",
            TrainingCenter => "training_center",
            TestingCenter => "testing_center",
            Admin => "admin",
            SuperAdmin => "super_admin",
        }
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Admin | SuperAdmin)
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }

    /// Roles representing a training or testing center
    #[inline]
    pub const fn is_center(&self) -> bool {
        use UserRole::*;
        matches!(self, TrainingCenter | TestingCenter)
    }

    /// May this role trigger review-pipeline transitions?
    #[inline]
    pub const fn can_review_applications(&self) -> bool {
        self.is_admin_or_higher()
    }

    /// May this role submit accreditation applications?
    #[inline]
    pub const fn can_submit_applications(&self) -> bool {
        self.is_center()
    }

    /// Roles that may be chosen at self-service registration.
    /// Admin roles are only ever assigned out of band.
    #[inline]
    pub const fn is_self_service(&self) -> bool {
        use UserRole::*;
        matches!(self, Student | TrainingCenter | TestingCenter)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(Student),
            1 => Some(TrainingCenter),
            2 => Some(TestingCenter),
            3 => Some(Admin),
            4 => Some(SuperAdmin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "student" => Some(Student),
            "training_center" => Some(TrainingCenter),
            "testing_center" => Some(TestingCenter),
            "admin" => Some(Admin),
            "super_admin" => Some(SuperAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The authenticated principal behind a request.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers that need to authorize a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Owner-or-admin check used by resource-scoped reads.
    pub fn can_access_resource_of(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.role.is_admin_or_higher()
    }
}
