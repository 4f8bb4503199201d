use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::constructiondtos::*,
    error::HttpError,
    service::approval::ReviewDecision,
    AppState,
};

pub fn construction_handler() -> Router {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/progress", get(get_progress))
        .route("/projects/:id/summary", get(get_summary))
        .route("/projects/:id/tasks", post(add_task))
        .route("/projects/:id/tasks/:task_id/status", put(update_task_status))
        .route(
            "/projects/:id/materials",
            get(list_materials).put(set_materials).post(add_material),
        )
        .route("/projects/:id/materials/summary", get(materials_summary))
        .route("/projects/:id/materials/:material_id", delete(remove_material))
        .route("/projects/:id/payments", get(list_payments).post(add_payment))
        .route("/projects/:id/payments/:payment_id/paid", put(mark_payment_paid))
        .route(
            "/projects/:id/payments/:payment_id/installments/:installment_id/paid",
            put(pay_installment),
        )
        .route("/projects/:id/pool", get(get_pool))
        .route(
            "/projects/:id/pool/allocations",
            get(list_allocations).post(allocate_payment),
        )
        .route("/projects/:id/approvals", post(add_approval_request))
        .route(
            "/projects/:id/approvals/:approval_id/approve",
            put(approve_approval_request),
        )
        .route(
            "/projects/:id/approvals/:approval_id/reject",
            put(reject_approval_request),
        )
}

fn validation_error(e: validator::ValidationErrors) -> HttpError {
    HttpError::bad_request(e.to_string())
}

pub async fn create_project(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateProjectDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let project = app_state.project_service.create_project(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Project created successfully", project)),
    ))
}

pub async fn list_projects(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let projects = app_state.project_service.list_projects().await?;

    Ok(Json(ApiResponse::success("Projects retrieved successfully", projects)))
}

pub async fn get_project(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let project = app_state.project_service.get_project(project_id).await?;

    Ok(Json(ApiResponse::success("Project retrieved successfully", project)))
}

pub async fn update_project(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<UpdateProjectDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let project = app_state
        .project_service
        .update_project(project_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Project updated successfully", project)))
}

pub async fn delete_project(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.project_service.delete_project(project_id).await?;

    Ok(Json(ApiResponse::message("Project deleted successfully")))
}

pub async fn get_progress(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let progress = app_state.project_service.progress(project_id).await?;

    Ok(Json(ApiResponse::success("Project progress retrieved", progress)))
}

pub async fn get_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state.project_service.summarize(project_id).await?;

    Ok(Json(ApiResponse::success("Project summary retrieved", summary)))
}

pub async fn add_task(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateTaskDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let task = app_state.project_service.add_task(project_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Task added successfully", task)),
    ))
}

pub async fn update_task_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTaskStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let task = app_state
        .project_service
        .update_task_status(project_id, task_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Task status updated", task)))
}

pub async fn list_materials(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let materials = app_state.project_service.list_materials(project_id).await?;

    Ok(Json(ApiResponse::success("Materials retrieved successfully", materials)))
}

pub async fn set_materials(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<SetMaterialsDto>,
) -> Result<impl IntoResponse, HttpError> {
    for material in &body.materials {
        material.validate().map_err(validation_error)?;
    }

    let saved = app_state
        .project_service
        .set_materials(project_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Materials saved successfully", saved)))
}

pub async fn add_material(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<MaterialInputDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let saved = app_state.project_service.add_material(project_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Material added successfully", saved)),
    ))
}

pub async fn remove_material(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, material_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let saved = app_state
        .project_service
        .remove_material(project_id, material_id)
        .await?;

    Ok(Json(ApiResponse::success("Material removed successfully", saved)))
}

pub async fn materials_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<MaterialsSummaryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state
        .project_service
        .materials_summary(
            project_id,
            query.transportation.unwrap_or_else(BigDecimal::zero),
            query.admin.unwrap_or_else(BigDecimal::zero),
        )
        .await?;

    Ok(Json(ApiResponse::success("Materials summary computed", summary)))
}

pub async fn list_payments(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let payments = app_state.project_service.list_payments(project_id).await?;

    Ok(Json(ApiResponse::success("Payments retrieved successfully", payments)))
}

pub async fn add_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state.project_service.add_payment(project_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment scheduled successfully", payment)),
    ))
}

pub async fn mark_payment_paid(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .project_service
        .mark_paid(project_id, payment_id)
        .await?;

    Ok(Json(ApiResponse::success("Payment marked as paid", payment)))
}

pub async fn pay_installment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, payment_id, installment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let payment = app_state
        .project_service
        .pay_installment(project_id, payment_id, installment_id)
        .await?;

    Ok(Json(ApiResponse::success("Installment marked as paid", payment)))
}

pub async fn get_pool(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let balance = app_state.project_service.pool_balance(project_id).await?;

    Ok(Json(ApiResponse::success("Pool balance retrieved", balance)))
}

pub async fn list_allocations(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let allocations = app_state.project_service.list_allocations(project_id).await?;

    Ok(Json(ApiResponse::success("Allocations retrieved successfully", allocations)))
}

pub async fn allocate_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<AllocatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let result = app_state.project_service.allocate(project_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment allocated from pool", result)),
    ))
}

pub async fn add_approval_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(body): Json<CreateApprovalRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(validation_error)?;

    let request = app_state
        .project_service
        .add_approval_request(project_id, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Approval request submitted", request)),
    ))
}

pub async fn approve_approval_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, approval_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .project_service
        .decide_approval_request(project_id, approval_id, ReviewDecision::Approve)
        .await?;

    Ok(Json(ApiResponse::success("Approval request approved", request)))
}

pub async fn reject_approval_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path((project_id, approval_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .project_service
        .decide_approval_request(project_id, approval_id, ReviewDecision::Reject)
        .await?;

    Ok(Json(ApiResponse::success("Approval request rejected", request)))
}
