// db/memorydb.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::constructiondb::ConstructionExt;
use crate::{
    models::{constructionmodel::*, requestmodel::*},
    service::error::ServiceError,
};

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<Uuid, Project>,
    construction_requests: HashMap<Uuid, ConstructionRequest>,
    repair_requests: HashMap<Uuid, RepairRequest>,
    job_applications: HashMap<Uuid, JobApplication>,
}

impl Tables {
    fn reviewable_mut(&mut self, kind: RequestKind, id: Uuid) -> Option<&mut dyn Reviewable> {
        match kind {
            RequestKind::Construction => self
                .construction_requests
                .get_mut(&id)
                .map(|r| r as &mut dyn Reviewable),
            RequestKind::Repair => self
                .repair_requests
                .get_mut(&id)
                .map(|r| r as &mut dyn Reviewable),
            RequestKind::JobApplication => self
                .job_applications
                .get_mut(&id)
                .map(|r| r as &mut dyn Reviewable),
        }
    }
}

/// Process-local store with the same guarantees as the Postgres one:
/// versioned project writes and a single lock around request promotion.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F>(mut rows: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    rows.sort_by(|a, b| created(b).cmp(&created(a)));
    rows
}

#[async_trait]
impl ConstructionExt for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.projects.insert(project.id, project.clone());
        Ok(project.clone())
    }

    async fn get_project(&self, project_id: Uuid) -> Result<Option<Project>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.get(&project_id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let tables = self.tables.read().await;
        let rows = tables.projects.values().cloned().collect();
        Ok(newest_first(rows, |p: &Project| p.created_at))
    }

    async fn replace_project(&self, project: &Project) -> Result<Project, ServiceError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .get_mut(&project.id)
            .ok_or(ServiceError::ProjectNotFound(project.id))?;

        if stored.version != project.version {
            return Err(ServiceError::ConcurrencyConflict {
                id: project.id,
                expected: project.version,
                found: stored.version,
            });
        }

        let mut next = project.clone();
        next.version = stored.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_project(&self, project_id: Uuid) -> Result<bool, ServiceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.remove(&project_id).is_some())
    }

    async fn insert_construction_request(
        &self,
        request: &ConstructionRequest,
    ) -> Result<ConstructionRequest, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.construction_requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn get_construction_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ConstructionRequest>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.construction_requests.get(&request_id).cloned())
    }

    async fn list_construction_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ConstructionRequest>, ServiceError> {
        let tables = self.tables.read().await;
        let rows = tables
            .construction_requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &ConstructionRequest| r.created_at))
    }

    async fn approve_construction_request(
        &self,
        request_id: Uuid,
        project: &Project,
    ) -> Result<Option<(ConstructionRequest, Project)>, ServiceError> {
        let mut tables = self.tables.write().await;

        let request = match tables.construction_requests.get_mut(&request_id) {
            Some(request) if request.status == ApprovalStatus::Pending => request,
            _ => return Ok(None),
        };

        request.status = ApprovalStatus::Approved;
        request.project_id = Some(project.id);
        request.updated_at = Utc::now();
        let request = request.clone();

        tables.projects.insert(project.id, project.clone());
        Ok(Some((request, project.clone())))
    }

    async fn insert_repair_request(&self, request: &RepairRequest) -> Result<RepairRequest, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.repair_requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn get_repair_request(&self, request_id: Uuid) -> Result<Option<RepairRequest>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.repair_requests.get(&request_id).cloned())
    }

    async fn list_repair_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<RepairRequest>, ServiceError> {
        let tables = self.tables.read().await;
        let rows = tables
            .repair_requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |r: &RepairRequest| r.created_at))
    }

    async fn insert_job_application(
        &self,
        application: &JobApplication,
    ) -> Result<JobApplication, ServiceError> {
        let mut tables = self.tables.write().await;
        tables.job_applications.insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn get_job_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<JobApplication>, ServiceError> {
        let tables = self.tables.read().await;
        Ok(tables.job_applications.get(&application_id).cloned())
    }

    async fn list_job_applications(
        &self,
        status: Option<ApprovalStatus>,
        role: Option<ApplicantRole>,
    ) -> Result<Vec<JobApplication>, ServiceError> {
        let tables = self.tables.read().await;
        let rows = tables
            .job_applications
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter(|a| role.map_or(true, |r| a.role == r))
            .cloned()
            .collect();
        Ok(newest_first(rows, |a: &JobApplication| a.created_at))
    }

    async fn request_status(
        &self,
        kind: RequestKind,
        request_id: Uuid,
    ) -> Result<Option<ApprovalStatus>, ServiceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.reviewable_mut(kind, request_id).map(|r| r.status()))
    }

    async fn decide_request(
        &self,
        kind: RequestKind,
        request_id: Uuid,
        to: ApprovalStatus,
    ) -> Result<bool, ServiceError> {
        let mut tables = self.tables.write().await;
        match tables.reviewable_mut(kind, request_id) {
            Some(record) if record.status() == ApprovalStatus::Pending => {
                record.set_status(to, Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
