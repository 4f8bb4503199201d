// service/review_service.rs
use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::constructiondb::ConstructionExt,
    dtos::requestdtos::*,
    models::{
        constructionmodel::{Project, ProjectStatus, ProjectType},
        requestmodel::*,
    },
    service::{
        approval::{self, ReviewDecision},
        error::ServiceError,
    },
    utils::money::non_negative_amount,
};

/// Intake and review of construction requests, repair requests and job
/// applications.
pub struct ReviewService {
    store: Arc<dyn ConstructionExt>,
}

impl std::fmt::Debug for ReviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService")
            .field("store", &self.store.backend())
            .finish()
    }
}

impl ReviewService {
    pub fn new(store: Arc<dyn ConstructionExt>) -> Self {
        Self { store }
    }

    // Construction requests

    pub async fn create_construction_request(
        &self,
        body: CreateConstructionRequestDto,
    ) -> Result<ConstructionRequest, ServiceError> {
        let budget = body
            .budget
            .map(|budget| non_negative_amount("budget", budget))
            .transpose()?;

        let now = Utc::now();
        let request = ConstructionRequest {
            id: Uuid::new_v4(),
            client_id: body.client_id,
            client_name: body.client_name,
            email: body.email,
            phone: body.phone,
            project_type: body.project_type,
            location: body.location,
            address: body.address,
            description: body.description,
            budget,
            preferred_start: body.preferred_start,
            status: ApprovalStatus::Pending,
            project_id: None,
            created_at: now,
            updated_at: now,
        };

        let request = self.store.insert_construction_request(&request).await?;
        tracing::info!("construction request {} received from {}", request.id, request.client_name);
        Ok(request)
    }

    pub async fn list_construction_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ConstructionRequest>, ServiceError> {
        self.store.list_construction_requests(status).await
    }

    pub async fn get_construction_request(&self, request_id: Uuid) -> Result<ConstructionRequest, ServiceError> {
        self.store
            .get_construction_request(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound {
                kind: RequestKind::Construction,
                id: request_id,
            })
    }

    /// Approves a pending request and creates its project in one step.
    /// Either both writes land or neither does.
    pub async fn approve_construction_request(
        &self,
        request_id: Uuid,
    ) -> Result<PromotionResultDto, ServiceError> {
        let request = self.get_construction_request(request_id).await?;
        approval::transition(request.status, ReviewDecision::Approve)?;

        let project = project_from_request(&request);
        match self.store.approve_construction_request(request_id, &project).await? {
            Some((request, project)) => {
                tracing::info!(
                    "construction request {} approved; project {} created",
                    request.id,
                    project.id
                );
                Ok(PromotionResultDto { request, project })
            }
            None => Err(self.lost_race(RequestKind::Construction, request_id, ApprovalStatus::Approved).await),
        }
    }

    pub async fn reject_construction_request(
        &self,
        request_id: Uuid,
    ) -> Result<ConstructionRequest, ServiceError> {
        self.decide(RequestKind::Construction, request_id, ReviewDecision::Reject)
            .await?;
        self.get_construction_request(request_id).await
    }

    // Repair requests

    pub async fn create_repair_request(&self, body: CreateRepairRequestDto) -> Result<RepairRequest, ServiceError> {
        let now = Utc::now();
        let request = RepairRequest {
            id: Uuid::new_v4(),
            client_id: body.client_id,
            client_name: body.client_name,
            property_address: body.property_address,
            repair_type: body.repair_type,
            description: body.description,
            urgency: body.urgency.unwrap_or_default(),
            attachments: body.attachments.unwrap_or_default(),
            status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let request = self.store.insert_repair_request(&request).await?;
        tracing::info!(
            "repair request {} ({:?} urgency) received from {}",
            request.id,
            request.urgency,
            request.client_name
        );
        Ok(request)
    }

    pub async fn list_repair_requests(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<RepairRequest>, ServiceError> {
        self.store.list_repair_requests(status).await
    }

    pub async fn get_repair_request(&self, request_id: Uuid) -> Result<RepairRequest, ServiceError> {
        self.store
            .get_repair_request(request_id)
            .await?
            .ok_or(ServiceError::RequestNotFound {
                kind: RequestKind::Repair,
                id: request_id,
            })
    }

    pub async fn review_repair_request(
        &self,
        request_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<RepairRequest, ServiceError> {
        self.decide(RequestKind::Repair, request_id, decision).await?;
        self.get_repair_request(request_id).await
    }

    // Job applications

    pub async fn create_job_application(
        &self,
        body: CreateJobApplicationDto,
    ) -> Result<JobApplication, ServiceError> {
        let now = Utc::now();
        let details = match body.details {
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        };
        let application = JobApplication {
            id: Uuid::new_v4(),
            applicant_id: body.applicant_id,
            applicant_name: body.applicant_name,
            email: body.email,
            phone: body.phone,
            role: body.role,
            skills: body.skills,
            certifications: body.certifications,
            experience_years: body.experience_years,
            details: Json(details),
            status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let application = self.store.insert_job_application(&application).await?;
        tracing::info!(
            "{:?} application {} received from {}",
            application.role,
            application.id,
            application.applicant_name
        );
        Ok(application)
    }

    pub async fn list_job_applications(
        &self,
        status: Option<ApprovalStatus>,
        role: Option<ApplicantRole>,
    ) -> Result<Vec<JobApplication>, ServiceError> {
        self.store.list_job_applications(status, role).await
    }

    pub async fn get_job_application(&self, application_id: Uuid) -> Result<JobApplication, ServiceError> {
        self.store
            .get_job_application(application_id)
            .await?
            .ok_or(ServiceError::RequestNotFound {
                kind: RequestKind::JobApplication,
                id: application_id,
            })
    }

    pub async fn review_job_application(
        &self,
        application_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<JobApplication, ServiceError> {
        self.decide(RequestKind::JobApplication, application_id, decision)
            .await?;
        self.get_job_application(application_id).await
    }

    /// Status-only decision for any intake record. The store only writes if
    /// the record is still pending.
    async fn decide(
        &self,
        kind: RequestKind,
        id: Uuid,
        decision: ReviewDecision,
    ) -> Result<ApprovalStatus, ServiceError> {
        let current = self
            .store
            .request_status(kind, id)
            .await?
            .ok_or(ServiceError::RequestNotFound { kind, id })?;
        let to = approval::transition(current, decision)?;

        if !self.store.decide_request(kind, id, to).await? {
            return Err(self.lost_race(kind, id, to).await);
        }

        tracing::info!("{} {} {}", kind.label(), id, to.to_str());
        Ok(to)
    }

    /// A guarded write matched nothing: the record vanished or someone else
    /// reviewed it first.
    async fn lost_race(&self, kind: RequestKind, id: Uuid, to: ApprovalStatus) -> ServiceError {
        match self.store.request_status(kind, id).await {
            Ok(Some(found)) => {
                tracing::warn!("{} {} was already {}", kind.label(), id, found.to_str());
                approval::invalid_transition(found, to)
            }
            Ok(None) => ServiceError::RequestNotFound { kind, id },
            Err(e) => e,
        }
    }
}

/// The project an approved construction request turns into.
pub fn project_from_request(request: &ConstructionRequest) -> Project {
    let project_type = ProjectType::from_request_value(&request.project_type);
    let type_label = match request.project_type.trim() {
        "" => project_type.to_str(),
        raw => raw,
    };

    let mut project = Project::new(
        format!("{} for {}", type_label, request.client_name),
        request.client_name.clone(),
        request.location.clone(),
        project_type,
    );
    project.description = request.description.clone();
    project.client_id = request.client_id;
    project.address = request.address.clone();
    project.status = ProjectStatus::InProgress;
    project.start_date = request.preferred_start;
    project
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use num_traits::Zero;
    use std::str::FromStr;
    use crate::{
        db::memorydb::MemoryStore,
        models::constructionmodel::Phase,
    };

    fn service() -> (Arc<MemoryStore>, ReviewService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ReviewService::new(store))
    }

    fn construction_request(project_type: &str) -> CreateConstructionRequestDto {
        CreateConstructionRequestDto {
            client_id: None,
            client_name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
            project_type: project_type.to_string(),
            location: "Abuja".to_string(),
            address: None,
            description: "Two storey office block".to_string(),
            budget: Some(BigDecimal::from(250_000)),
            preferred_start: None,
        }
    }

    fn repair_request() -> CreateRepairRequestDto {
        CreateRepairRequestDto {
            client_id: None,
            client_name: "Bola".to_string(),
            property_address: "12 Marina Road".to_string(),
            repair_type: "plumbing".to_string(),
            description: "Burst pipe in kitchen".to_string(),
            urgency: None,
            attachments: None,
        }
    }

    fn job_application(role: ApplicantRole) -> CreateJobApplicationDto {
        CreateJobApplicationDto {
            applicant_id: None,
            applicant_name: "Chidi".to_string(),
            email: "chidi@example.com".to_string(),
            phone: None,
            role,
            skills: vec!["masonry".to_string()],
            certifications: Vec::new(),
            experience_years: 4,
            details: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn approving_a_request_creates_its_project() {
        let (store, svc) = service();
        let request = svc
            .create_construction_request(construction_request("Office"))
            .await
            .unwrap();
        assert_eq!(request.status, ApprovalStatus::Pending);

        let promoted = svc.approve_construction_request(request.id).await.unwrap();
        assert_eq!(promoted.request.status, ApprovalStatus::Approved);
        assert_eq!(promoted.request.project_id, Some(promoted.project.id));

        let project = store.get_project(promoted.project.id).await.unwrap().unwrap();
        assert_eq!(project.title, "Office for Ada");
        assert_eq!(project.project_type, ProjectType::Residential);
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.phase, Phase::Planning);
        assert!(project.estimated_cost.is_zero());
        assert_eq!(project.location, "Abuja");
        assert!(project.tasks.is_empty() && project.materials.is_empty());
    }

    #[tokio::test]
    async fn known_project_types_are_normalised() {
        let (_, svc) = service();
        let request = svc
            .create_construction_request(construction_request("  Commercial "))
            .await
            .unwrap();
        let promoted = svc.approve_construction_request(request.id).await.unwrap();
        assert_eq!(promoted.project.project_type, ProjectType::Commercial);

        let blank = svc.create_construction_request(construction_request("")).await.unwrap();
        let promoted = svc.approve_construction_request(blank.id).await.unwrap();
        assert_eq!(promoted.project.title, "residential for Ada");
    }

    #[tokio::test]
    async fn second_approval_creates_no_second_project() {
        let (store, svc) = service();
        let request = svc
            .create_construction_request(construction_request("Residential"))
            .await
            .unwrap();

        svc.approve_construction_request(request.id).await.unwrap();
        let again = svc.approve_construction_request(request.id).await;
        assert!(matches!(again, Err(ServiceError::InvalidStateTransition(_))));
        assert_eq!(store.list_projects().await.unwrap().len(), 1);

        let rejected_after = svc.reject_construction_request(request.id).await;
        assert!(matches!(rejected_after, Err(ServiceError::InvalidStateTransition(_))));
    }

    #[tokio::test]
    async fn rejecting_leaves_no_project_behind() {
        let (store, svc) = service();
        let request = svc
            .create_construction_request(construction_request("Renovation"))
            .await
            .unwrap();

        let rejected = svc.reject_construction_request(request.id).await.unwrap();
        assert_eq!(rejected.status, ApprovalStatus::Rejected);
        assert!(rejected.project_id.is_none());
        assert!(store.list_projects().await.unwrap().is_empty());

        let approve_after = svc.approve_construction_request(request.id).await;
        assert!(matches!(approve_after, Err(ServiceError::InvalidStateTransition(_))));
    }

    #[tokio::test]
    async fn budget_is_kept_to_kobo_and_never_negative() {
        let (_, svc) = service();

        let mut body = construction_request("Office");
        body.budget = Some(BigDecimal::from_str("1500000.506").unwrap());
        let request = svc.create_construction_request(body).await.unwrap();
        assert_eq!(request.budget, Some(BigDecimal::from_str("1500000.51").unwrap()));

        let mut body = construction_request("Office");
        body.budget = Some(BigDecimal::from(-1));
        assert!(matches!(
            svc.create_construction_request(body).await,
            Err(ServiceError::Validation(msg)) if msg == "budget cannot be negative"
        ));
        assert_eq!(svc.list_construction_requests(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_requests_are_not_found() {
        let (_, svc) = service();
        let id = Uuid::new_v4();
        assert!(matches!(
            svc.approve_construction_request(id).await,
            Err(ServiceError::RequestNotFound { kind: RequestKind::Construction, .. })
        ));
        assert!(matches!(
            svc.review_repair_request(id, ReviewDecision::Approve).await,
            Err(ServiceError::RequestNotFound { kind: RequestKind::Repair, .. })
        ));
        assert!(matches!(
            svc.review_job_application(id, ReviewDecision::Reject).await,
            Err(ServiceError::RequestNotFound { kind: RequestKind::JobApplication, .. })
        ));
    }

    #[tokio::test]
    async fn repair_requests_default_and_review() {
        let (_, svc) = service();
        let request = svc.create_repair_request(repair_request()).await.unwrap();
        assert_eq!(request.urgency, Urgency::Medium);
        assert!(request.attachments.is_empty());
        assert_eq!(request.status, ApprovalStatus::Pending);

        let approved = svc
            .review_repair_request(request.id, ReviewDecision::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);

        let pending = svc
            .list_repair_requests(Some(ApprovalStatus::Pending))
            .await
            .unwrap();
        assert!(pending.is_empty());

        assert!(matches!(
            svc.review_repair_request(request.id, ReviewDecision::Reject).await,
            Err(ServiceError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn job_applications_filter_by_role_and_status() {
        let (_, svc) = service();
        let worker = svc.create_job_application(job_application(ApplicantRole::Worker)).await.unwrap();
        svc.create_job_application(job_application(ApplicantRole::Designer))
            .await
            .unwrap();
        assert_eq!(worker.details.0, serde_json::json!({}));

        let rejected = svc
            .review_job_application(worker.id, ReviewDecision::Reject)
            .await
            .unwrap();
        assert_eq!(rejected.status, ApprovalStatus::Rejected);

        let designers = svc
            .list_job_applications(None, Some(ApplicantRole::Designer))
            .await
            .unwrap();
        assert_eq!(designers.len(), 1);

        let pending_workers = svc
            .list_job_applications(Some(ApprovalStatus::Pending), Some(ApplicantRole::Worker))
            .await
            .unwrap();
        assert!(pending_workers.is_empty());
    }
}
