//! HTTP Handlers
//!
//! All routes run behind the auth middleware: every handler reads the
//! resolved [`Actor`] from request extensions. Finer authorization
//! (owner checks, admin checks, the transition table) lives in the use
//! cases.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use auth::domain::repository::UserRepository;
use kernel::role::Actor;

use crate::application::get_application::GetApplicationUseCase;
use crate::application::list_applications::ListApplicationsUseCase;
use crate::application::resubmit_application::{
    ResubmitApplicationInput, ResubmitApplicationUseCase,
};
use crate::application::review_transition::{ReviewTransitionInput, ReviewTransitionUseCase};
use crate::application::submit_application::{SubmitApplicationInput, SubmitApplicationUseCase};
use crate::domain::repository::ApplicationRepository;
use crate::domain::value_objects::{CenterKind, Locale};
use crate::error::{AccreditationError, AccreditationResult, FieldViolation};
use crate::presentation::dto::{
    ApplicationResponse, ResubmitApplicationRequest, SubmitApplicationRequest,
    UpdateStatusRequest,
};

/// Shared state for accreditation handlers
#[derive(Clone)]
pub struct AccreditationAppState<R, U>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub user_repo: Arc<U>,
    /// Which center kind this route tree serves
    pub kind: CenterKind,
}

/// POST /api/{kind}-center-applications
pub async fn submit<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<SubmitApplicationRequest>,
) -> AccreditationResult<impl IntoResponse>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = SubmitApplicationUseCase::new(state.repo.clone());

    let application = use_case
        .execute(
            actor,
            state.kind,
            SubmitApplicationInput {
                center_name: req.center_name,
                manager_name: req.manager_name,
                city: req.city,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from_application(
            &application,
            Locale::default(),
        )),
    ))
}

/// GET /api/{kind}-center-applications
///
/// The admin review queue (also guarded by the admin route layer).
pub async fn list_all<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
) -> AccreditationResult<Json<Vec<ApplicationResponse>>>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = ListApplicationsUseCase::new(state.repo.clone(), state.user_repo.clone());

    let applications = use_case.all(actor, state.kind).await?;

    Ok(Json(to_responses(&applications)))
}

/// GET /api/{kind}-center-applications/user/{userId}
pub async fn list_for_user<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> AccreditationResult<Json<Vec<ApplicationResponse>>>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = ListApplicationsUseCase::new(state.repo.clone(), state.user_repo.clone());

    let applications = use_case.for_user(actor, state.kind, &user_id).await?;

    Ok(Json(to_responses(&applications)))
}

/// GET /api/{kind}-center-applications/{id}
pub async fn get_by_id<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> AccreditationResult<Json<ApplicationResponse>>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = GetApplicationUseCase::new(state.repo.clone());

    let application = use_case.execute(actor, id).await?;

    Ok(Json(ApplicationResponse::from_application(
        &application,
        Locale::default(),
    )))
}

/// PATCH /api/{kind}-center-applications/{id}/status
///
/// Admin review transition. Illegal jumps and terminal states come
/// back as 400, wrong roles as 403.
pub async fn update_status<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> AccreditationResult<Json<ApplicationResponse>>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = ReviewTransitionUseCase::new(state.repo.clone());

    let application = use_case
        .execute(
            actor,
            id,
            ReviewTransitionInput {
                status: req.status,
                review_notes: req.review_notes,
            },
        )
        .await?;

    Ok(Json(ApplicationResponse::from_application(
        &application,
        Locale::default(),
    )))
}

/// PATCH /api/{kind}-center-applications/{id}
///
/// Owner re-submission after a requested modification.
pub async fn resubmit<R, U>(
    State(state): State<AccreditationAppState<R, U>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResubmitApplicationRequest>,
) -> AccreditationResult<Json<ApplicationResponse>>
where
    R: ApplicationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    // The legacy client tags re-submissions with status "modified";
    // any other status goes through the review endpoint instead
    if let Some(status) = &req.status {
        if status != "modified" {
            return Err(AccreditationError::Validation(vec![FieldViolation {
                field: "status",
                message: "re-submission accepts only \"modified\"".to_string(),
            }]));
        }
    }

    let use_case = ResubmitApplicationUseCase::new(state.repo.clone());

    let application = use_case
        .execute(
            actor,
            id,
            ResubmitApplicationInput {
                center_name: req.center_name,
                manager_name: req.manager_name,
                city: req.city,
            },
        )
        .await?;

    Ok(Json(ApplicationResponse::from_application(
        &application,
        Locale::default(),
    )))
}

fn to_responses(applications: &[crate::domain::entities::Application]) -> Vec<ApplicationResponse> {
    applications
        .iter()
        .map(|app| ApplicationResponse::from_application(app, Locale::default()))
        .collect()
}
