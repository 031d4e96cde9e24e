//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{Application, ApplicationFields, Certificate};
use crate::domain::value_objects::{ApplicationStatus, CenterKind};
use crate::error::AccreditationResult;

/// Application repository trait
///
/// Status mutations are compare-and-swap on the previous status: a
/// transition raced by another admin fails instead of double-applying.
#[trait_variant::make(ApplicationRepository: Send)]
pub trait LocalApplicationRepository {
    /// Persist a new application
    async fn create(&self, application: &Application) -> AccreditationResult<()>;

    /// Find an application by ID
    async fn find_by_id(&self, id: Uuid) -> AccreditationResult<Option<Application>>;

    /// All applications of a kind owned by a user, newest first
    async fn list_by_owner(
        &self,
        kind: CenterKind,
        owner_user_id: Uuid,
    ) -> AccreditationResult<Vec<Application>>;

    /// All applications of a kind (admin review queue), newest first
    async fn list_all(&self, kind: CenterKind) -> AccreditationResult<Vec<Application>>;

    /// Apply a review transition: status CAS from `from` to `to`,
    /// stamping notes and `reviewed_at`, minting `certificate` in the
    /// same transaction when provided. Returns the updated row.
    async fn apply_transition(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        review_notes: Option<String>,
        reviewed_at: DateTime<Utc>,
        certificate: Option<Certificate>,
    ) -> AccreditationResult<Application>;

    /// Apply an owner re-submission: rewrite the editable fields, reset
    /// the status to `Submitted` and clear the review stamps. CAS on
    /// `from`. Returns the updated row.
    async fn apply_resubmission(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        fields: ApplicationFields,
    ) -> AccreditationResult<Application>;
}
