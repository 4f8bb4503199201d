use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{constructiondtos::ApiResponse, requestdtos::*},
    error::HttpError,
    service::approval::ReviewDecision,
    AppState,
};

pub fn requests_handler() -> Router {
    Router::new()
        .route(
            "/requests",
            post(create_construction_request).get(list_construction_requests),
        )
        .route("/requests/:id", get(get_construction_request))
        .route("/requests/approve/:id", put(approve_construction_request))
        .route("/requests/reject/:id", put(reject_construction_request))
        .route("/requests/:id/create-project", post(create_project_from_request))
        .route("/repairs", post(create_repair_request).get(list_repair_requests))
        .route("/repairs/:id", get(get_repair_request))
        .route("/repairs/approve/:id", put(approve_repair_request))
        .route("/repairs/reject/:id", put(reject_repair_request))
        .route(
            "/applications",
            post(create_job_application).get(list_job_applications),
        )
        .route("/applications/:id", get(get_job_application))
        .route("/applications/approve/:id", put(approve_job_application))
        .route("/applications/reject/:id", put(reject_job_application))
}

pub async fn create_construction_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateConstructionRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .review_service
        .create_construction_request(body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Construction request submitted successfully", request)),
    ))
}

pub async fn list_construction_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(filter): Query<ReviewFilterQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state
        .review_service
        .list_construction_requests(filter.status)
        .await?;

    Ok(Json(ApiResponse::success("Construction requests retrieved", requests)))
}

pub async fn get_construction_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .review_service
        .get_construction_request(request_id)
        .await?;

    Ok(Json(ApiResponse::success("Construction request retrieved", request)))
}

pub async fn approve_construction_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let promoted = app_state
        .review_service
        .approve_construction_request(request_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Construction request approved and project created",
        promoted,
    )))
}

pub async fn create_project_from_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let promoted = app_state
        .review_service
        .approve_construction_request(request_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Project created from request", promoted)),
    ))
}

pub async fn reject_construction_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .review_service
        .reject_construction_request(request_id)
        .await?;

    Ok(Json(ApiResponse::success("Construction request rejected", request)))
}

pub async fn create_repair_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateRepairRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state.review_service.create_repair_request(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Repair request submitted successfully", request)),
    ))
}

pub async fn list_repair_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(filter): Query<ReviewFilterQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = app_state
        .review_service
        .list_repair_requests(filter.status)
        .await?;

    Ok(Json(ApiResponse::success("Repair requests retrieved", requests)))
}

pub async fn get_repair_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state.review_service.get_repair_request(request_id).await?;

    Ok(Json(ApiResponse::success("Repair request retrieved", request)))
}

pub async fn approve_repair_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .review_service
        .review_repair_request(request_id, ReviewDecision::Approve)
        .await?;

    Ok(Json(ApiResponse::success("Repair request approved", request)))
}

pub async fn reject_repair_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .review_service
        .review_repair_request(request_id, ReviewDecision::Reject)
        .await?;

    Ok(Json(ApiResponse::success("Repair request rejected", request)))
}

pub async fn create_job_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateJobApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let application = app_state.review_service.create_job_application(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Application submitted successfully", application)),
    ))
}

pub async fn list_job_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(filter): Query<ReviewFilterQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .review_service
        .list_job_applications(filter.status, filter.role)
        .await?;

    Ok(Json(ApiResponse::success("Applications retrieved", applications)))
}

pub async fn get_job_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .review_service
        .get_job_application(application_id)
        .await?;

    Ok(Json(ApiResponse::success("Application retrieved", application)))
}

pub async fn approve_job_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .review_service
        .review_job_application(application_id, ReviewDecision::Approve)
        .await?;

    Ok(Json(ApiResponse::success("Application approved", application)))
}

pub async fn reject_job_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .review_service
        .review_job_application(application_id, ReviewDecision::Reject)
        .await?;

    Ok(Json(ApiResponse::success("Application rejected", application)))
}
