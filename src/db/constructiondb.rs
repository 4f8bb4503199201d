// db/constructiondb.rs
use async_trait::async_trait;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    models::{constructionmodel::*, requestmodel::*},
    service::error::ServiceError,
};

/// Persistence seam for the construction back office.
///
/// A project row is the unit of consistency: its embedded tasks, materials,
/// payments, allocations and approval requests are always written together.
/// Every project write is a compare-and-swap on `version`.
#[async_trait]
pub trait ConstructionExt: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn insert_project(&self, project: &Project) -> Result<Project, ServiceError>;

    async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>, ServiceError>;

    /// Newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError>;

    /// Stores `project` if the stored version still equals `project.version`.
    /// The returned copy carries the bumped version.
    async fn replace_project(&self, project: &Project) -> Result<Project, ServiceError>;

    async fn delete_project(&self, project_id: Uuid) -> Result<bool, ServiceError>;

    async fn insert_construction_request(
        &self,
        request: &ConstructionRequest,
    ) -> Result<ConstructionRequest, ServiceError>;

    async fn get_construction_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ConstructionRequest>, ServiceError>;

    async fn list_construction_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ConstructionRequest>, ServiceError>;

    /// Inserts `project` and marks the request approved with a back-reference,
    /// all or nothing. `None` when the request is missing or not pending.
    async fn approve_construction_request(
        &self,
        request_id: Uuid,
        project: &Project,
    ) -> Result<Option<(ConstructionRequest, Project)>, ServiceError>;

    async fn insert_repair_request(&self, request: &RepairRequest) -> Result<RepairRequest, ServiceError>;

    async fn get_repair_request(&self, request_id: Uuid) -> Result<Option<RepairRequest>, ServiceError>;

    async fn list_repair_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<RepairRequest>, ServiceError>;

    async fn insert_job_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, ServiceError>;

    async fn get_job_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, ServiceError>;

    async fn list_job_applications(
        &self,
        status: Option<ApprovalStatus>,
        role: Option<ApplicantRole>,
    ) -> Result<Vec<JobApplication>, ServiceError>;

    async fn request_status(
        &self,
        kind: RequestKind,
        request_id: Uuid,
    ) -> Result<Option<ApprovalStatus>, ServiceError>;

    /// Moves a pending record to `to`. False when no pending record matched.
    async fn decide_request(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        to: ApprovalStatus,
    ) -> Result<bool, ServiceError>;
}

async fn insert_project_with<'c, E>(executor: E, project: &Project) -> Result<Project, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO construction_projects (
            id, title, description, client_id, client_name, location, address,
            project_type, status, phase, start_date, end_date,
            estimated_cost, actual_cost,
            contractor_id, contractor_name, designer_id, designer_name,
            worker_ids, blueprint_urls, progress_image_urls,
            tasks, materials, payments, allocations, approval_requests,
            version, created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7,
            $8, $9, $10, $11, $12,
            $13, $14,
            $15, $16, $17, $18,
            $19, $20, $21,
            $22, $23, $24, $25, $26,
            $27, $28, $29
        )
        RETURNING *
        "#,
    )
    .bind(project.id)
    .bind(&project.title)
    .bind(&project.description)
    .bind(project.client_id)
    .bind(&project.client_name)
    .bind(&project.location)
    .bind(&project.address)
    .bind(project.project_type)
    .bind(project.status)
    .bind(project.phase)
    .bind(project.start_date)
    .bind(project.end_date)
    .bind(&project.estimated_cost)
    .bind(&project.actual_cost)
    .bind(project.contractor_id)
    .bind(&project.contractor_name)
    .bind(project.designer_id)
    .bind(&project.designer_name)
    .bind(&project.worker_ids)
    .bind(&project.blueprint_urls)
    .bind(&project.progress_image_urls)
    .bind(&project.tasks)
    .bind(&project.materials)
    .bind(&project.payments)
    .bind(&project.allocations)
    .bind(&project.approval_requests)
    .bind(project.version)
    .bind(project.created_at)
    .bind(project.updated_at)
    .fetch_one(executor)
    .await
}

#[async_trait]
impl ConstructionExt for DBClient {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, ServiceError> {
        let project = insert_project_with(&self.pool, project).await?;
        Ok(project)
    }

    async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>, ServiceError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM construction_projects WHERE id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM construction_projects ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn replace_project(&self, project: &Project) -> Result<Project, ServiceError> {
        let updated = sqlx::query_as::<_, Project>(
            r#"
            UPDATE construction_projects
            SET title = $3,
                description = $4,
                client_id = $5,
                client_name = $6,
                location = $7,
                address = $8,
                project_type = $9,
                status = $10,
                phase = $11,
                start_date = $12,
                end_date = $13,
                estimated_cost = $14,
                actual_cost = $15,
                contractor_id = $16,
                contractor_name = $17,
                designer_id = $18,
                designer_name = $19,
                worker_ids = $20,
                blueprint_urls = $21,
                progress_image_urls = $22,
                tasks = $23,
                materials = $24,
                payments = $25,
                allocations = $26,
                approval_requests = $27,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING *
            "#,
        )
        .bind(project.id)
        .bind(project.version)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.client_id)
        .bind(&project.client_name)
        .bind(&project.location)
        .bind(&project.address)
        .bind(project.project_type)
        .bind(project.status)
        .bind(project.phase)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(&project.estimated_cost)
        .bind(&project.actual_cost)
        .bind(project.contractor_id)
        .bind(&project.contractor_name)
        .bind(project.designer_id)
        .bind(&project.designer_name)
        .bind(&project.worker_ids)
        .bind(&project.blueprint_urls)
        .bind(&project.progress_image_urls)
        .bind(&project.tasks)
        .bind(&project.materials)
        .bind(&project.payments)
        .bind(&project.allocations)
        .bind(&project.approval_requests)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(updated) = updated {
            return Ok(updated);
        }

        let found: Option<i32> = sqlx::query_scalar(
            "SELECT version FROM construction_projects WHERE id = $1",
        )
        .bind(project.id)
        .fetch_optional(&self.pool)
        .await?;

        match found {
            Some(found) => Err(ServiceError::ConcurrencyConflict {
                id: project.id,
                expected: project.version,
                found,
            }),
            None => Err(ServiceError::ProjectNotFound(project.id)),
        }
    }

    async fn delete_project(&self, project_id: Uuid) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM construction_projects WHERE id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_construction_request(
        &self,
        request: &ConstructionRequest,
    ) -> Result<ConstructionRequest, ServiceError> {
        let request = sqlx::query_as::<_, ConstructionRequest>(
            r#"
            INSERT INTO construction_requests (
                id, client_id, client_name, email, phone, project_type,
                location, address, description, budget, preferred_start,
                status, project_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.client_id)
        .bind(&request.client_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.project_type)
        .bind(&request.location)
        .bind(&request.address)
        .bind(&request.description)
        .bind(&request.budget)
        .bind(request.preferred_start)
        .bind(request.status)
        .bind(request.project_id)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn get_construction_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ConstructionRequest>, ServiceError> {
        let request = sqlx::query_as::<_, ConstructionRequest>(
            "SELECT * FROM construction_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_construction_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ConstructionRequest>, ServiceError> {
        let requests = sqlx::query_as::<_, ConstructionRequest>(
            r#"
            SELECT * FROM construction_requests
            WHERE ($1::approval_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn approve_construction_request(
        &self,
        request_id: Uuid,
        project: &Project,
    ) -> Result<Option<(ConstructionRequest, Project)>, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let project = insert_project_with(&mut *tx, project).await?;

        let request = sqlx::query_as::<_, ConstructionRequest>(
            r#"
            UPDATE construction_requests
            SET status = 'approved', project_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(project.id)
        .fetch_optional(&mut *tx)
        .await?;

        match request {
            Some(request) => {
                tx.commit().await?;
                Ok(Some((request, project)))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    async fn insert_repair_request(&self, request: &RepairRequest) -> Result<RepairRequest, ServiceError> {
        let request = sqlx::query_as::<_, RepairRequest>(
            r#"
            INSERT INTO repair_requests (
                id, client_id, client_name, property_address, repair_type,
                description, urgency, attachments, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.client_id)
        .bind(&request.client_name)
        .bind(&request.property_address)
        .bind(&request.repair_type)
        .bind(&request.description)
        .bind(request.urgency)
        .bind(&request.attachments)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn get_repair_request(&self, request_id: Uuid) -> Result<Option<RepairRequest>, ServiceError> {
        let request = sqlx::query_as::<_, RepairRequest>(
            "SELECT * FROM repair_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_repair_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<RepairRequest>, ServiceError> {
        let requests = sqlx::query_as::<_, RepairRequest>(
            r#"
            SELECT * FROM repair_requests
            WHERE ($1::approval_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn insert_job_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, ServiceError> {
        let application = sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications (
                id, applicant_id, applicant_name, email, phone, role, skills,
                certifications, experience_years, details, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(application.applicant_id)
        .bind(&application.applicant_name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(application.role)
        .bind(&application.skills)
        .bind(&application.certifications)
        .bind(application.experience_years)
        .bind(&application.details)
        .bind(application.status)
        .bind(application.created_at)
        .bind(application.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    async fn get_job_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, ServiceError> {
        let application = sqlx::query_as::<_, JobApplication>(
            "SELECT * FROM job_applications WHERE id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn list_job_applications(
        &self,
        status: Option<ApprovalStatus>,
        role: Option<ApplicantRole>,
    ) -> Result<Vec<JobApplication>, ServiceError> {
        let applications = sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT * FROM job_applications
            WHERE ($1::approval_status IS NULL OR status = $1)
              AND ($2::applicant_role IS NULL OR role = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn request_status(
        &self,
        kind: RequestKind,
        request_id: Uuid,
    ) -> Result<Option<ApprovalStatus>, ServiceError> {
        let sql = format!("SELECT status FROM {} WHERE id = $1", kind.table());
        let status: Option<ApprovalStatus> = sqlx::query_scalar(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(status)
    }

    async fn decide_request(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        to: ApprovalStatus,
    ) -> Result<bool, ServiceError> {
        let sql = format!(
            "UPDATE {} SET status = $2, updated_at = NOW() WHERE id = $1 AND status = 'pending'",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(request_id)
            .bind(to)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
