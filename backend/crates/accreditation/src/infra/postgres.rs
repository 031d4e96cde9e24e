//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Application, ApplicationFields, Certificate};
use crate::domain::repository::ApplicationRepository;
use crate::domain::value_objects::{ApplicationStatus, CenterKind};
use crate::error::{AccreditationError, AccreditationResult};

/// PostgreSQL-backed application repository
#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = r#"
    application_id,
    center_kind,
    owner_user_id,
    center_name,
    manager_name,
    city,
    status,
    submitted_at,
    review_notes,
    reviewed_at,
    certificate_id,
    updated_at
"#;

impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, application: &Application) -> AccreditationResult<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                application_id,
                center_kind,
                owner_user_id,
                center_name,
                manager_name,
                city,
                status,
                submitted_at,
                review_notes,
                reviewed_at,
                certificate_id,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(application.id)
        .bind(application.center_kind.id())
        .bind(application.owner_user_id)
        .bind(&application.center_name)
        .bind(&application.manager_name)
        .bind(&application.city)
        .bind(application.status.id())
        .bind(application.submitted_at)
        .bind(&application.review_notes)
        .bind(application.reviewed_at)
        .bind(application.certificate_id)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(application_id = %application.id, "Application created");

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AccreditationResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM applications WHERE application_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_application()).transpose()
    }

    async fn list_by_owner(
        &self,
        kind: CenterKind,
        owner_user_id: Uuid,
    ) -> AccreditationResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM applications
            WHERE center_kind = $1 AND owner_user_id = $2
            ORDER BY submitted_at DESC
            "#
        ))
        .bind(kind.id())
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_application()).collect()
    }

    async fn list_all(&self, kind: CenterKind) -> AccreditationResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM applications
            WHERE center_kind = $1
            ORDER BY submitted_at DESC
            "#
        ))
        .bind(kind.id())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_application()).collect()
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        review_notes: Option<String>,
        reviewed_at: DateTime<Utc>,
        certificate: Option<Certificate>,
    ) -> AccreditationResult<Application> {
        let mut tx = self.pool.begin().await?;

        let certificate_id = match &certificate {
            Some(cert) => {
                sqlx::query(
                    r#"
                    INSERT INTO certificates (certificate_id, application_id, serial, issued_at)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(cert.id)
                .bind(cert.application_id)
                .bind(&cert.serial)
                .bind(cert.issued_at)
                .execute(&mut *tx)
                .await?;
                Some(cert.id)
            }
            None => None,
        };

        // Compare-and-swap on the previous status: a raced transition
        // updates zero rows and the whole transaction rolls back.
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications SET
                status = $3,
                review_notes = $4,
                reviewed_at = $5,
                certificate_id = COALESCE($6, certificate_id),
                updated_at = now()
            WHERE application_id = $1 AND status = $2
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from.id())
        .bind(to.id())
        .bind(&review_notes)
        .bind(reviewed_at)
        .bind(certificate_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Err(AccreditationError::ConcurrentUpdate);
        };

        tx.commit().await?;

        row.into_application()
    }

    async fn apply_resubmission(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        fields: ApplicationFields,
    ) -> AccreditationResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications SET
                center_name = $3,
                manager_name = $4,
                city = $5,
                status = $6,
                review_notes = NULL,
                reviewed_at = NULL,
                updated_at = now()
            WHERE application_id = $1 AND status = $2
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from.id())
        .bind(&fields.center_name)
        .bind(&fields.manager_name)
        .bind(&fields.city)
        .bind(ApplicationStatus::Submitted.id())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AccreditationError::ConcurrentUpdate);
        };

        row.into_application()
    }
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct ApplicationRow {
    application_id: Uuid,
    center_kind: i16,
    owner_user_id: Uuid,
    center_name: String,
    manager_name: String,
    city: String,
    status: i16,
    submitted_at: DateTime<Utc>,
    review_notes: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    certificate_id: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    fn into_application(self) -> AccreditationResult<Application> {
        let center_kind = CenterKind::from_id(self.center_kind).ok_or_else(|| {
            AccreditationError::Internal(format!("Invalid center kind id: {}", self.center_kind))
        })?;
        let status = ApplicationStatus::from_id(self.status).ok_or_else(|| {
            AccreditationError::Internal(format!("Invalid status id: {}", self.status))
        })?;

        Ok(Application {
            id: self.application_id,
            center_kind,
            owner_user_id: self.owner_user_id,
            center_name: self.center_name,
            manager_name: self.manager_name,
            city: self.city,
            status,
            submitted_at: self.submitted_at,
            review_notes: self.review_notes,
            reviewed_at: self.reviewed_at,
            certificate_id: self.certificate_id,
            updated_at: self.updated_at,
        })
    }
}
