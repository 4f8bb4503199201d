use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::constructionmodel::*,
    service::{materials::MaterialsSummary, pool::PoolBalance},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}

// Project DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub address: Option<String>,
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub phase: Option<Phase>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    pub estimated_cost: Option<BigDecimal>,
    pub actual_cost: Option<BigDecimal>,

    pub contractor_id: Option<Uuid>,
    pub contractor_name: Option<String>,
    pub designer_id: Option<Uuid>,
    pub designer_name: Option<String>,
    pub worker_ids: Option<Vec<Uuid>>,
    pub blueprint_urls: Option<Vec<String>>,
    pub progress_image_urls: Option<Vec<String>>,
}

/// Shallow merge: every field that is present replaces the stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Client name cannot be empty"))]
    pub client_name: Option<String>,

    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,

    pub address: Option<String>,
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub phase: Option<Phase>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    pub estimated_cost: Option<BigDecimal>,
    pub actual_cost: Option<BigDecimal>,

    pub contractor_id: Option<Uuid>,
    pub contractor_name: Option<String>,
    pub designer_id: Option<Uuid>,
    pub designer_name: Option<String>,
    pub worker_ids: Option<Vec<Uuid>>,
    pub blueprint_urls: Option<Vec<String>>,
    pub progress_image_urls: Option<Vec<String>>,

    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgressDto {
    pub project_id: Uuid,
    pub phase: Phase,
    pub progress_percent: u8,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskCountsDto {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummaryDto {
    pub project_id: Uuid,
    pub title: String,
    pub status: ProjectStatus,
    pub phase: Phase,
    pub progress_percent: u8,
    pub tasks: TaskCountsDto,
    pub materials_total: BigDecimal,
    pub payments_paid: BigDecimal,
    pub payments_outstanding: BigDecimal,
    pub pool: PoolBalance,
    pub version: i32,
}

// Task DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[validate(length(min = 1, max = 200, message = "Task title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub assignee_name: Option<String>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusDto {
    pub status: TaskStatus,
    pub expected_version: Option<i32>,
}

// Material DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInputDto {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "Material name is required"))]
    pub name: String,

    pub quantity: BigDecimal,

    #[serde(default)]
    pub unit: String,

    pub unit_cost: BigDecimal,

    pub supplier: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
}

impl MaterialInputDto {
    /// `total_cost` is left at zero; the ledger fills it in.
    pub fn into_material(self) -> Material {
        Material {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            unit_cost: self.unit_cost,
            total_cost: BigDecimal::zero(),
            supplier: self.supplier,
            purchase_date: self.purchase_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMaterialsDto {
    pub materials: Vec<MaterialInputDto>,
    pub expected_version: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MaterialsSummaryQuery {
    pub transportation: Option<BigDecimal>,
    pub admin: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialsResponseDto {
    pub materials: Vec<Material>,
    pub summary: MaterialsSummary,
    pub version: i32,
}

// Payment DTOs
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentInputDto {
    pub amount: BigDecimal,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentDto {
    /// Naira; checked and rounded to kobo by the pool.
    pub amount: BigDecimal,

    #[serde(rename = "type")]
    pub payment_type: PaymentType,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub installments: Vec<InstallmentInputDto>,

    pub expected_version: Option<i32>,
}

impl CreatePaymentDto {
    pub fn into_payment(self) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            amount: self.amount,
            payment_type: self.payment_type,
            status: PaymentStatus::Pending,
            due_date: self.due_date,
            paid_at: None,
            description: self.description,
            installments: self
                .installments
                .into_iter()
                .map(|i| Installment {
                    id: Uuid::new_v4(),
                    amount: i.amount,
                    due_date: i.due_date,
                    status: InstallmentStatus::Pending,
                    paid_at: None,
                })
                .collect(),
        }
    }
}

// Pool DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocatePaymentDto {
    #[validate(length(min = 1, max = 200, message = "Recipient is required"))]
    pub recipient: String,

    pub amount: BigDecimal,

    pub category: AllocationCategory,

    pub note: Option<String>,

    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResultDto {
    pub allocation: PoolAllocation,
    pub pool: PoolBalance,
}

// Embedded approval DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApprovalRequestDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub requested_by: Option<Uuid>,
}
