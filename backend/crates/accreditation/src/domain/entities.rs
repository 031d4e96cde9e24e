//! Domain Entities
//!
//! The accreditation application (an audit record: created once, never
//! deleted) and the certificate minted on acceptance.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::{ApplicationStatus, CenterKind};

/// The editable fields of an application
#[derive(Debug, Clone)]
pub struct ApplicationFields {
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
}

/// A center's accreditation request
#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub center_kind: CenterKind,
    /// The center-role user who submitted it
    pub owner_user_id: Uuid,
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    /// Notes recorded by the reviewing admin
    pub review_notes: Option<String>,
    /// Stamped on every review transition
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Set exactly when the application reaches `accepted`
    pub certificate_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Create a freshly submitted application
    pub fn new(center_kind: CenterKind, owner_user_id: Uuid, fields: ApplicationFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            center_kind,
            owner_user_id,
            center_name: fields.center_name,
            manager_name: fields.manager_name,
            city: fields.city,
            status: ApplicationStatus::Submitted,
            submitted_at: now,
            review_notes: None,
            reviewed_at: None,
            certificate_id: None,
            updated_at: now,
        }
    }
}

/// Certificate minted when an application is accepted
#[derive(Debug, Clone)]
pub struct Certificate {
    pub id: Uuid,
    pub application_id: Uuid,
    /// Human-quotable serial, e.g. `ACC-TRN-2026-1a2b3c4d`
    pub serial: String,
    pub issued_at: DateTime<Utc>,
}

impl Certificate {
    pub fn mint(application: &Application) -> Self {
        let id = Uuid::new_v4();
        let issued_at = Utc::now();
        let kind_tag = match application.center_kind {
            CenterKind::Training => "TRN",
            CenterKind::Testing => "TST",
        };
        let short = &id.simple().to_string()[..8];
        let serial = format!(
            "ACC-{}-{}-{}",
            kind_tag,
            issued_at.format("%Y"),
            short
        );

        Self {
            id,
            application_id: application.id,
            serial,
            issued_at,
        }
    }
}
