//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Application;
use crate::domain::services::progress_steps;
use crate::domain::value_objects::{Locale, ProgressStep, StepState};

/// Request for POST /api/{kind}-center-applications
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
}

/// Request for PATCH /api/{kind}-center-applications/{id}/status
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub review_notes: Option<String>,
}

/// Request for PATCH /api/{kind}-center-applications/{id}
/// (re-submission after a requested modification)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResubmitApplicationRequest {
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
    /// Marker carried by the legacy client; when present it must be
    /// exactly "modified"
    #[serde(default)]
    pub status: Option<String>,
}

/// One step of the visual progress projection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStepDto {
    pub id: u8,
    pub title: String,
    pub state: StepState,
}

impl ProgressStepDto {
    fn from_step(step: ProgressStep, locale: Locale) -> Self {
        Self {
            id: step.id,
            title: step.kind.title(locale).to_string(),
            state: step.state,
        }
    }
}

/// Application as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub center_kind: String,
    pub center_name: String,
    pub manager_name: String,
    pub city: String,
    /// Stable wire code (submitted, under_review, ...)
    pub status: String,
    /// Display label in the portal's primary locale
    pub status_label: String,
    pub submitted_at: DateTime<Utc>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub certificate_id: Option<Uuid>,
    /// Five-step projection, derived from `status` on every response
    pub progress: Vec<ProgressStepDto>,
}

impl ApplicationResponse {
    pub fn from_application(application: &Application, locale: Locale) -> Self {
        let progress = progress_steps(application.status)
            .into_iter()
            .map(|step| ProgressStepDto::from_step(step, locale))
            .collect();

        Self {
            id: application.id,
            center_kind: application.center_kind.code().to_string(),
            center_name: application.center_name.clone(),
            manager_name: application.manager_name.clone(),
            city: application.city.clone(),
            status: application.status.code().to_string(),
            status_label: application.status.label(locale).to_string(),
            submitted_at: application.submitted_at,
            review_notes: application.review_notes.clone(),
            reviewed_at: application.reviewed_at,
            certificate_id: application.certificate_id,
            progress,
        }
    }
}
