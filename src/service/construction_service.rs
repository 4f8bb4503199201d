// service/construction_service.rs
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use num_traits::Zero;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::constructiondb::ConstructionExt,
    dtos::constructiondtos::*,
    models::{constructionmodel::*, requestmodel::ApprovalStatus},
    service::{
        approval::{self, ReviewDecision},
        error::ServiceError,
        materials::{self, MaterialsSummary},
        pool::{self, PoolBalance},
        progress::progress_percent,
    },
    utils::money::non_negative_amount,
};

/// What a mutation did to the project. Unchanged outcomes skip the write.
pub enum Outcome<T> {
    Changed(T),
    Unchanged(T),
}

pub struct ProjectService {
    store: Arc<dyn ConstructionExt>,
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectService")
            .field("store", &self.store.backend())
            .finish()
    }
}

impl ProjectService {
    pub fn new(store: Arc<dyn ConstructionExt>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    async fn load(&self, project_id: Uuid) -> Result<Project, ServiceError> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or(ServiceError::ProjectNotFound(project_id))
    }

    /// Read, apply, compare-and-swap. `expected_version` lets a caller pin
    /// the version it last saw; the store guards the read-to-write window.
    async fn modify<T, F>(
        &self,
        project_id: Uuid,
        expected_version: Option<i32>,
        apply: F,
    ) -> Result<(Project, T), ServiceError>
    where
        F: FnOnce(&mut Project) -> Result<Outcome<T>, ServiceError> + Send,
        T: Send,
    {
        let mut project = self.load(project_id).await?;

        if let Some(expected) = expected_version {
            if expected != project.version {
                tracing::warn!(
                    "stale write on project {}: client saw v{}, stored v{}",
                    project_id,
                    expected,
                    project.version
                );
                return Err(ServiceError::ConcurrencyConflict {
                    id: project_id,
                    expected,
                    found: project.version,
                });
            }
        }

        match apply(&mut project)? {
            Outcome::Unchanged(value) => Ok((project, value)),
            Outcome::Changed(value) => {
                let saved = self.store.replace_project(&project).await.map_err(|e| {
                    if matches!(e, ServiceError::ConcurrencyConflict { .. }) {
                        tracing::warn!("concurrent write lost on project {}: {}", project_id, e);
                    }
                    e
                })?;
                Ok((saved, value))
            }
        }
    }

    // Project record store

    pub async fn create_project(&self, body: CreateProjectDto) -> Result<Project, ServiceError> {
        let mut project = Project::new(
            body.title,
            body.client_name,
            body.location,
            body.project_type.unwrap_or(ProjectType::Residential),
        );
        project.description = body.description.unwrap_or_default();
        project.client_id = body.client_id;
        project.address = body.address;
        project.status = body.status.unwrap_or(ProjectStatus::Pending);
        project.phase = body.phase.unwrap_or(Phase::Planning);
        project.start_date = body.start_date;
        project.end_date = body.end_date;
        project.estimated_cost =
            non_negative_amount("estimated cost", body.estimated_cost.unwrap_or_else(BigDecimal::zero))?;
        project.actual_cost = non_negative_amount("actual cost", body.actual_cost.unwrap_or_else(BigDecimal::zero))?;
        project.contractor_id = body.contractor_id;
        project.contractor_name = body.contractor_name;
        project.designer_id = body.designer_id;
        project.designer_name = body.designer_name;
        project.worker_ids = body.worker_ids.unwrap_or_default();
        project.blueprint_urls = body.blueprint_urls.unwrap_or_default();
        project.progress_image_urls = body.progress_image_urls.unwrap_or_default();
        align_phase_with_status(&mut project);

        let project = self.store.insert_project(&project).await?;
        tracing::info!("created project {} ({})", project.id, project.title);
        Ok(project)
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        self.store.list_projects().await
    }

    pub async fn get_project(&self, project_id: Uuid) -> Result<Project, ServiceError> {
        self.load(project_id).await
    }

    pub async fn update_project(
        &self,
        project_id: Uuid,
        body: UpdateProjectDto,
    ) -> Result<Project, ServiceError> {
        let expected_version = body.expected_version;
        let (project, _) = self
            .modify(project_id, expected_version, move |project| {
                apply_update(project, body)?;
                Ok(Outcome::Changed(()))
            })
            .await?;

        tracing::info!(
            "updated project {} -> v{} (status {:?}, phase {:?})",
            project.id,
            project.version,
            project.status,
            project.phase
        );
        Ok(project)
    }

    pub async fn delete_project(&self, project_id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_project(project_id).await? {
            return Err(ServiceError::ProjectNotFound(project_id));
        }
        tracing::info!("deleted project {}", project_id);
        Ok(())
    }

    // Phase progress

    pub async fn progress(&self, project_id: Uuid) -> Result<ProjectProgressDto, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(ProjectProgressDto {
            project_id,
            phase: project.phase,
            progress_percent: progress_percent(project.phase),
        })
    }

    pub async fn summarize(&self, project_id: Uuid) -> Result<ProjectSummaryDto, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(summarize_project(&project))
    }

    // Tasks

    pub async fn add_task(&self, project_id: Uuid, body: CreateTaskDto) -> Result<Task, ServiceError> {
        let task = Task {
            id: Uuid::new_v4(),
            title: body.title,
            description: body.description.unwrap_or_default(),
            assignee_id: body.assignee_id,
            assignee_name: body.assignee_name,
            status: TaskStatus::Pending,
            priority: body.priority.unwrap_or_default(),
            start_date: body.start_date,
            end_date: body.end_date,
            completed_at: None,
        };

        let (_, task) = self
            .modify(project_id, body.expected_version, move |project| {
                project.tasks.push(task.clone());
                Ok(Outcome::Changed(task))
            })
            .await?;
        Ok(task)
    }

    pub async fn update_task_status(
        &self,
        project_id: Uuid,
        task_id: Uuid,
        body: UpdateTaskStatusDto,
    ) -> Result<Task, ServiceError> {
        let (_, task) = self
            .modify(project_id, body.expected_version, move |project| {
                let task = project
                    .tasks
                    .iter_mut()
                    .find(|t| t.id == task_id)
                    .ok_or(ServiceError::TaskNotFound(task_id))?;

                if task.status == body.status {
                    return Ok(Outcome::Unchanged(task.clone()));
                }
                task.status = body.status;
                task.completed_at = match body.status {
                    TaskStatus::Completed => Some(Utc::now()),
                    _ => None,
                };
                Ok(Outcome::Changed(task.clone()))
            })
            .await?;

        tracing::info!("task {} on project {} is now {:?}", task_id, project_id, task.status);
        Ok(task)
    }

    // Materials ledger

    pub async fn list_materials(&self, project_id: Uuid) -> Result<Vec<Material>, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(project.materials.0)
    }

    /// Full-list replacement; totals are recomputed server side.
    pub async fn set_materials(
        &self,
        project_id: Uuid,
        body: SetMaterialsDto,
    ) -> Result<MaterialsResponseDto, ServiceError> {
        let incoming: Vec<Material> = body
            .materials
            .into_iter()
            .map(MaterialInputDto::into_material)
            .collect();
        let materials = materials::normalize_all(incoming)?;

        let (project, _) = self
            .modify(project_id, body.expected_version, move |project| {
                project.materials = Json(materials);
                pool::ensure_covered(project)?;
                Ok(Outcome::Changed(()))
            })
            .await?;

        tracing::info!(
            "saved {} materials on project {} (v{})",
            project.materials.len(),
            project_id,
            project.version
        );
        materials_response(project)
    }

    pub async fn add_material(
        &self,
        project_id: Uuid,
        body: MaterialInputDto,
    ) -> Result<MaterialsResponseDto, ServiceError> {
        let mut material = body.into_material();
        materials::recompute(&mut material)?;

        let (project, _) = self
            .modify(project_id, None, move |project| {
                if project.materials.iter().any(|m| m.id == material.id) {
                    return Err(ServiceError::Validation(format!(
                        "Material {} already exists",
                        material.id
                    )));
                }
                project.materials.push(material);
                pool::ensure_covered(project)?;
                Ok(Outcome::Changed(()))
            })
            .await?;
        materials_response(project)
    }

    pub async fn remove_material(
        &self,
        project_id: Uuid,
        material_id: Uuid,
    ) -> Result<MaterialsResponseDto, ServiceError> {
        let (project, _) = self
            .modify(project_id, None, move |project| {
                let before = project.materials.len();
                project.materials.retain(|m| m.id != material_id);
                if project.materials.len() == before {
                    return Err(ServiceError::MaterialNotFound(material_id));
                }
                Ok(Outcome::Changed(()))
            })
            .await?;
        materials_response(project)
    }

    pub async fn materials_summary(
        &self,
        project_id: Uuid,
        transportation: BigDecimal,
        admin: BigDecimal,
    ) -> Result<MaterialsSummary, ServiceError> {
        let project = self.load(project_id).await?;
        materials::compute_summary(&project.materials, transportation, admin)
    }

    // Payments and pool

    pub async fn list_payments(&self, project_id: Uuid) -> Result<Vec<Payment>, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(project.payments.0)
    }

    pub async fn add_payment(&self, project_id: Uuid, body: CreatePaymentDto) -> Result<Payment, ServiceError> {
        let expected_version = body.expected_version;
        let mut payment = body.into_payment();
        pool::validate_schedule(&mut payment)?;

        let (_, payment) = self
            .modify(project_id, expected_version, move |project| {
                project.payments.push(payment.clone());
                Ok(Outcome::Changed(payment))
            })
            .await?;

        tracing::info!("scheduled {:?} payment {} on project {}", payment.payment_type, payment.id, project_id);
        Ok(payment)
    }

    pub async fn mark_paid(&self, project_id: Uuid, payment_id: Uuid) -> Result<Payment, ServiceError> {
        let (_, payment) = self
            .modify(project_id, None, move |project| {
                let payment = find_payment(project, payment_id)?;
                if pool::mark_paid(payment, Utc::now()) {
                    Ok(Outcome::Changed(payment.clone()))
                } else {
                    Ok(Outcome::Unchanged(payment.clone()))
                }
            })
            .await?;

        tracing::info!("payment {} on project {} is {:?}", payment_id, project_id, payment.status);
        Ok(payment)
    }

    pub async fn pay_installment(
        &self,
        project_id: Uuid,
        payment_id: Uuid,
        installment_id: Uuid,
    ) -> Result<Payment, ServiceError> {
        let (_, payment) = self
            .modify(project_id, None, move |project| {
                let payment = find_payment(project, payment_id)?;
                if pool::pay_installment(payment, installment_id, Utc::now())? {
                    Ok(Outcome::Changed(payment.clone()))
                } else {
                    Ok(Outcome::Unchanged(payment.clone()))
                }
            })
            .await?;

        tracing::info!(
            "installment {} of payment {} paid (payment now {:?})",
            installment_id,
            payment_id,
            payment.status
        );
        Ok(payment)
    }

    pub async fn pool_balance(&self, project_id: Uuid) -> Result<PoolBalance, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(pool::pool_balance(&project))
    }

    pub async fn list_allocations(&self, project_id: Uuid) -> Result<Vec<PoolAllocation>, ServiceError> {
        let project = self.load(project_id).await?;
        Ok(project.allocations.0)
    }

    pub async fn allocate(
        &self,
        project_id: Uuid,
        body: AllocatePaymentDto,
    ) -> Result<AllocationResultDto, ServiceError> {
        let (project, allocation) = self
            .modify(project_id, body.expected_version, move |project| {
                let allocation = pool::allocate(project, body.recipient, body.amount, body.category, body.note)?;
                Ok(Outcome::Changed(allocation))
            })
            .await?;

        let balance = pool::pool_balance(&project);
        tracing::info!(
            "allocated {} to {} on project {}; remaining pool {}",
            allocation.amount,
            allocation.recipient,
            project_id,
            balance.remaining_pool
        );
        Ok(AllocationResultDto {
            allocation,
            pool: balance,
        })
    }

    // Embedded approval requests

    pub async fn add_approval_request(
        &self,
        project_id: Uuid,
        body: CreateApprovalRequestDto,
    ) -> Result<ApprovalRequest, ServiceError> {
        let request = ApprovalRequest {
            id: Uuid::new_v4(),
            title: body.title,
            description: body.description,
            requested_by: body.requested_by,
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        };

        let (_, request) = self
            .modify(project_id, None, move |project| {
                project.approval_requests.push(request.clone());
                Ok(Outcome::Changed(request))
            })
            .await?;
        Ok(request)
    }

    pub async fn decide_approval_request(
        &self,
        project_id: Uuid,
        approval_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<ApprovalRequest, ServiceError> {
        let (_, request) = self
            .modify(project_id, None, move |project| {
                let request = project
                    .approval_requests
                    .iter_mut()
                    .find(|r| r.id == approval_id)
                    .ok_or(ServiceError::ApprovalNotFound(approval_id))?;

                request.status = approval::transition(request.status, decision)?;
                request.decided_at = Some(Utc::now());
                Ok(Outcome::Changed(request.clone()))
            })
            .await?;

        tracing::info!(
            "approval request {} on project {} {}",
            approval_id,
            project_id,
            request.status.to_str()
        );
        Ok(request)
    }
}

fn find_payment(project: &mut Project, payment_id: Uuid) -> Result<&mut Payment, ServiceError> {
    project
        .payments
        .iter_mut()
        .find(|p| p.id == payment_id)
        .ok_or(ServiceError::PaymentNotFound(payment_id))
}

fn materials_response(project: Project) -> Result<MaterialsResponseDto, ServiceError> {
    let summary = materials::compute_summary(&project.materials, BigDecimal::zero(), BigDecimal::zero())?;
    Ok(MaterialsResponseDto {
        materials: project.materials.0,
        summary,
        version: project.version,
    })
}

/// A completed project is always in the completed phase.
fn align_phase_with_status(project: &mut Project) {
    if project.status == ProjectStatus::Completed {
        project.phase = Phase::Completed;
    }
}

fn apply_update(project: &mut Project, body: UpdateProjectDto) -> Result<(), ServiceError> {
    if let Some(title) = body.title {
        project.title = title;
    }
    if let Some(description) = body.description {
        project.description = description;
    }
    if let Some(client_id) = body.client_id {
        project.client_id = Some(client_id);
    }
    if let Some(client_name) = body.client_name {
        project.client_name = client_name;
    }
    if let Some(location) = body.location {
        project.location = location;
    }
    if let Some(address) = body.address {
        project.address = Some(address);
    }
    if let Some(project_type) = body.project_type {
        project.project_type = project_type;
    }
    if let Some(status) = body.status {
        project.status = status;
    }
    if let Some(phase) = body.phase {
        project.phase = phase;
    }
    if let Some(start_date) = body.start_date {
        project.start_date = Some(start_date);
    }
    if let Some(end_date) = body.end_date {
        project.end_date = Some(end_date);
    }
    if let Some(estimated_cost) = body.estimated_cost {
        project.estimated_cost = non_negative_amount("estimated cost", estimated_cost)?;
        pool::ensure_covered(project)?;
    }
    if let Some(actual_cost) = body.actual_cost {
        project.actual_cost = non_negative_amount("actual cost", actual_cost)?;
    }
    if let Some(contractor_id) = body.contractor_id {
        project.contractor_id = Some(contractor_id);
    }
    if let Some(contractor_name) = body.contractor_name {
        project.contractor_name = Some(contractor_name);
    }
    if let Some(designer_id) = body.designer_id {
        project.designer_id = Some(designer_id);
    }
    if let Some(designer_name) = body.designer_name {
        project.designer_name = Some(designer_name);
    }
    if let Some(worker_ids) = body.worker_ids {
        project.worker_ids = worker_ids;
    }
    if let Some(blueprint_urls) = body.blueprint_urls {
        project.blueprint_urls = blueprint_urls;
    }
    if let Some(progress_image_urls) = body.progress_image_urls {
        project.progress_image_urls = progress_image_urls;
    }
    align_phase_with_status(project);
    Ok(())
}

pub fn summarize_project(project: &Project) -> ProjectSummaryDto {
    let mut tasks = TaskCountsDto::default();
    for task in project.tasks.iter() {
        match task.status {
            TaskStatus::Pending => tasks.pending += 1,
            TaskStatus::InProgress => tasks.in_progress += 1,
            TaskStatus::Completed => tasks.completed += 1,
        }
    }
    let (payments_paid, payments_outstanding) = pool::payment_totals(&project.payments);

    ProjectSummaryDto {
        project_id: project.id,
        title: project.title.clone(),
        status: project.status,
        phase: project.phase,
        progress_percent: progress_percent(project.phase),
        tasks,
        materials_total: materials::materials_total(&project.materials),
        payments_paid,
        payments_outstanding,
        pool: pool::pool_balance(project),
        version: project.version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memorydb::MemoryStore;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn service() -> ProjectService {
        ProjectService::new(Arc::new(MemoryStore::new()))
    }

    fn new_project(estimated_cost: &str) -> CreateProjectDto {
        CreateProjectDto {
            title: "Duplex at Ikoyi".to_string(),
            description: None,
            client_id: None,
            client_name: "Ada".to_string(),
            location: "Lagos".to_string(),
            address: None,
            project_type: None,
            status: None,
            phase: None,
            start_date: None,
            end_date: None,
            estimated_cost: Some(dec(estimated_cost)),
            actual_cost: None,
            contractor_id: None,
            contractor_name: None,
            designer_id: None,
            designer_name: None,
            worker_ids: None,
            blueprint_urls: None,
            progress_image_urls: None,
        }
    }

    fn material(name: &str, quantity: &str, unit_cost: &str) -> MaterialInputDto {
        MaterialInputDto {
            id: None,
            name: name.to_string(),
            quantity: dec(quantity),
            unit: "bag".to_string(),
            unit_cost: dec(unit_cost),
            supplier: None,
            purchase_date: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_and_newest_first_listing() {
        let svc = service();
        let first = svc.create_project(new_project("1000")).await.unwrap();
        let second = svc.create_project(new_project("2000")).await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(first.status, ProjectStatus::Pending);
        assert_eq!(first.phase, Phase::Planning);
        assert_eq!(first.project_type, ProjectType::Residential);
        assert!(first.tasks.is_empty() && first.materials.is_empty() && first.payments.is_empty());

        let listed = svc.list_projects().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn unknown_ids_report_not_found() {
        let svc = service();
        let id = Uuid::new_v4();
        assert!(matches!(svc.get_project(id).await, Err(ServiceError::ProjectNotFound(_))));
        assert!(matches!(
            svc.update_project(id, UpdateProjectDto::default()).await,
            Err(ServiceError::ProjectNotFound(_))
        ));
        assert!(matches!(svc.delete_project(id).await, Err(ServiceError::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn update_merges_and_completion_forces_phase() {
        let svc = service();
        let project = svc.create_project(new_project("1000")).await.unwrap();

        let updated = svc
            .update_project(project.id, UpdateProjectDto {
                phase: Some(Phase::Structure),
                contractor_name: Some("BuildRight Ltd".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.phase, Phase::Structure);
        assert_eq!(updated.title, project.title);
        assert_eq!(updated.contractor_name.as_deref(), Some("BuildRight Ltd"));
        assert_eq!(updated.version, 2);

        let done = svc
            .update_project(project.id, UpdateProjectDto {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(done.phase, Phase::Completed);
        assert_eq!(svc.progress(project.id).await.unwrap().progress_percent, 100);
    }

    #[tokio::test]
    async fn stale_expected_version_is_a_conflict() {
        let svc = service();
        let project = svc.create_project(new_project("10000")).await.unwrap();

        // two editors both loaded v1
        svc.set_materials(project.id, SetMaterialsDto {
            materials: vec![material("Cement", "10", "350")],
            expected_version: Some(1),
        })
        .await
        .unwrap();

        let err = svc
            .set_materials(project.id, SetMaterialsDto {
                materials: vec![material("Sand", "1", "1")],
                expected_version: Some(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConcurrencyConflict { expected: 1, found: 2, .. }));

        let materials = svc.list_materials(project.id).await.unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "Cement");
    }

    #[tokio::test]
    async fn store_rejects_writes_from_an_outdated_read() {
        let store = Arc::new(MemoryStore::new());
        let svc = ProjectService::new(store.clone());
        let project = svc.create_project(new_project("1000")).await.unwrap();

        let stale = store.get_project(project.id).await.unwrap().unwrap();
        svc.update_project(project.id, UpdateProjectDto {
            title: Some("Renamed".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

        let err = store.replace_project(&stale).await.unwrap_err();
        assert!(matches!(err, ServiceError::ConcurrencyConflict { expected: 1, found: 2, .. }));
    }

    #[tokio::test]
    async fn materials_ledger_recomputes_totals() {
        let svc = service();
        let project = svc.create_project(new_project("10000")).await.unwrap();

        let saved = svc
            .set_materials(project.id, SetMaterialsDto {
                materials: vec![material("Cement", "10", "350")],
                expected_version: None,
            })
            .await
            .unwrap();
        assert_eq!(saved.materials[0].total_cost, dec("3500"));
        assert_eq!(saved.summary.materials_total, dec("3500"));

        let summary = svc.materials_summary(project.id, dec("500"), dec("200")).await.unwrap();
        assert_eq!(summary.grand_total, dec("4200"));

        let added = svc.add_material(project.id, material("Sand", "2", "100")).await.unwrap();
        assert_eq!(added.summary.materials_total, dec("3700"));

        let sand_id = added.materials[1].id;
        let removed = svc.remove_material(project.id, sand_id).await.unwrap();
        assert_eq!(removed.materials.len(), 1);
        assert!(matches!(
            svc.remove_material(project.id, sand_id).await,
            Err(ServiceError::MaterialNotFound(_))
        ));

        assert!(matches!(
            svc.add_material(project.id, material("Gravel", "-1", "10")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn installment_rollup_through_the_service() {
        let svc = service();
        let project = svc.create_project(new_project("100000")).await.unwrap();

        let payment = svc
            .add_payment(project.id, CreatePaymentDto {
                amount: dec("50000"),
                payment_type: PaymentType::Milestone,
                due_date: None,
                description: "Roofing".to_string(),
                installments: vec![
                    InstallmentInputDto { amount: dec("2500"), due_date: None },
                    InstallmentInputDto { amount: dec("2500"), due_date: None },
                ],
                expected_version: None,
            })
            .await
            .unwrap();
        let first = payment.installments[0].id;
        let second = payment.installments[1].id;

        let after_first = svc.pay_installment(project.id, payment.id, first).await.unwrap();
        assert_eq!(after_first.status, PaymentStatus::Pending);

        let after_second = svc.pay_installment(project.id, payment.id, second).await.unwrap();
        assert_eq!(after_second.status, PaymentStatus::Paid);
        assert!(after_second.paid_at.is_some());

        let stored = svc.list_payments(project.id).await.unwrap();
        assert_eq!(stored[0].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn mark_paid_twice_does_not_write_again() {
        let svc = service();
        let project = svc.create_project(new_project("100000")).await.unwrap();
        let payment = svc
            .add_payment(project.id, CreatePaymentDto {
                amount: dec("10000"),
                payment_type: PaymentType::Advance,
                due_date: None,
                description: String::new(),
                installments: Vec::new(),
                expected_version: None,
            })
            .await
            .unwrap();

        let paid = svc.mark_paid(project.id, payment.id).await.unwrap();
        let version_after_first = svc.get_project(project.id).await.unwrap().version;
        let again = svc.mark_paid(project.id, payment.id).await.unwrap();

        assert_eq!(paid.paid_at, again.paid_at);
        assert_eq!(svc.get_project(project.id).await.unwrap().version, version_after_first);
        assert!(matches!(
            svc.mark_paid(project.id, Uuid::new_v4()).await,
            Err(ServiceError::PaymentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn allocation_scenario_against_the_store() {
        let svc = service();
        let project = svc.create_project(new_project("100000")).await.unwrap();
        svc.set_materials(project.id, SetMaterialsDto {
            materials: vec![material("Blocks", "1", "20000")],
            expected_version: None,
        })
        .await
        .unwrap();

        let result = svc
            .allocate(project.id, AllocatePaymentDto {
                recipient: "Worker A".to_string(),
                amount: dec("10000"),
                category: AllocationCategory::Salary,
                note: None,
                expected_version: None,
            })
            .await
            .unwrap();
        assert_eq!(result.pool.remaining_pool, dec("70000"));

        let over = svc
            .allocate(project.id, AllocatePaymentDto {
                recipient: "Worker B".to_string(),
                amount: dec("70000.5"),
                category: AllocationCategory::Salary,
                note: None,
                expected_version: None,
            })
            .await;
        assert!(matches!(over, Err(ServiceError::InsufficientPool { .. })));

        let balance = svc.pool_balance(project.id).await.unwrap();
        assert_eq!(balance.salaries_cost, dec("10000"));
        assert_eq!(balance.remaining_pool, dec("70000"));
        assert_eq!(svc.list_allocations(project.id).await.unwrap().len(), 1);
    }

    fn allocation(recipient: &str, amount: &str) -> AllocatePaymentDto {
        AllocatePaymentDto {
            recipient: recipient.to_string(),
            amount: dec(amount),
            category: AllocationCategory::Salary,
            note: None,
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn fractional_allocations_use_the_whole_pool() {
        let svc = service();
        let project = svc.create_project(new_project("0.3")).await.unwrap();

        svc.allocate(project.id, allocation("Crew", "0.1")).await.unwrap();
        let second = svc.allocate(project.id, allocation("Crew", "0.2")).await.unwrap();
        assert!(second.pool.remaining_pool.is_zero());
        assert_eq!(svc.list_allocations(project.id).await.unwrap().len(), 2);
    }

    /// A project with 100000 estimated and 90000 already allocated.
    async fn mostly_allocated(svc: &ProjectService) -> Project {
        let project = svc.create_project(new_project("100000")).await.unwrap();
        svc.allocate(project.id, allocation("Crew", "90000")).await.unwrap();
        svc.get_project(project.id).await.unwrap()
    }

    #[tokio::test]
    async fn replacing_materials_cannot_overdraw_the_pool() {
        let svc = service();
        let project = mostly_allocated(&svc).await;

        let err = svc
            .set_materials(project.id, SetMaterialsDto {
                materials: vec![material("Rebar", "10", "5000")],
                expected_version: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientPool { requested, available }
                if requested == dec("140000") && available == dec("100000")
        ));

        let stored = svc.get_project(project.id).await.unwrap();
        assert!(stored.materials.is_empty());
        assert_eq!(stored.version, project.version);

        // exactly filling the pool is fine
        let saved = svc
            .set_materials(project.id, SetMaterialsDto {
                materials: vec![material("Rebar", "2", "5000")],
                expected_version: None,
            })
            .await
            .unwrap();
        assert_eq!(saved.summary.materials_total, dec("10000"));
        assert!(svc.pool_balance(project.id).await.unwrap().remaining_pool.is_zero());
    }

    #[tokio::test]
    async fn adding_a_material_cannot_overdraw_the_pool() {
        let svc = service();
        let project = mostly_allocated(&svc).await;

        assert!(matches!(
            svc.add_material(project.id, material("Tiles", "1", "10000.01")).await,
            Err(ServiceError::InsufficientPool { .. })
        ));
        assert!(svc.list_materials(project.id).await.unwrap().is_empty());

        svc.add_material(project.id, material("Tiles", "1", "10000")).await.unwrap();
        assert!(svc.pool_balance(project.id).await.unwrap().remaining_pool.is_zero());
    }

    #[tokio::test]
    async fn estimate_cannot_drop_below_committed_spend() {
        let svc = service();
        let project = mostly_allocated(&svc).await;

        let err = svc
            .update_project(project.id, UpdateProjectDto {
                estimated_cost: Some(dec("89999.99")),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientPool { .. }));
        assert_eq!(svc.get_project(project.id).await.unwrap().estimated_cost, dec("100000"));

        let lowered = svc
            .update_project(project.id, UpdateProjectDto {
                estimated_cost: Some(dec("90000")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(lowered.estimated_cost, dec("90000"));

        // other fields still update while the pool is fully spent
        let renamed = svc
            .update_project(project.id, UpdateProjectDto {
                title: Some("Duplex at Lekki".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(renamed.title, "Duplex at Lekki");
    }

    #[tokio::test]
    async fn tasks_and_summary() {
        let svc = service();
        let project = svc.create_project(new_project("5000")).await.unwrap();
        let task = svc
            .add_task(project.id, CreateTaskDto {
                title: "Excavate footings".to_string(),
                description: None,
                assignee_id: None,
                assignee_name: Some("Worker A".to_string()),
                priority: Some(TaskPriority::High),
                start_date: None,
                end_date: None,
                expected_version: None,
            })
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let done = svc
            .update_task_status(project.id, task.id, UpdateTaskStatusDto {
                status: TaskStatus::Completed,
                expected_version: None,
            })
            .await
            .unwrap();
        assert!(done.completed_at.is_some());

        let reopened = svc
            .update_task_status(project.id, task.id, UpdateTaskStatusDto {
                status: TaskStatus::InProgress,
                expected_version: None,
            })
            .await
            .unwrap();
        assert!(reopened.completed_at.is_none());

        let summary = svc.summarize(project.id).await.unwrap();
        assert_eq!(summary.tasks, TaskCountsDto { pending: 0, in_progress: 1, completed: 0 });
        assert_eq!(summary.progress_percent, 17);
        assert_eq!(summary.pool.remaining_pool, dec("5000"));
    }

    #[tokio::test]
    async fn embedded_approval_requests_follow_the_state_machine() {
        let svc = service();
        let project = svc.create_project(new_project("5000")).await.unwrap();
        let request = svc
            .add_approval_request(project.id, CreateApprovalRequestDto {
                title: "Change roofing sheets".to_string(),
                description: String::new(),
                requested_by: None,
            })
            .await
            .unwrap();

        let approved = svc
            .decide_approval_request(project.id, request.id, ReviewDecision::Approve)
            .await
            .unwrap();
        assert_eq!(approved.status, ApprovalStatus::Approved);
        assert!(approved.decided_at.is_some());

        assert!(matches!(
            svc.decide_approval_request(project.id, request.id, ReviewDecision::Reject).await,
            Err(ServiceError::InvalidStateTransition(_))
        ));
    }
}
