// models/constructionmodel.rs
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "project_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Residential,
    Commercial,
    Renovation,
    Interior,
}

impl ProjectType {
    pub fn to_str(&self) -> &str {
        match self {
            ProjectType::Residential => "residential",
            ProjectType::Commercial => "commercial",
            ProjectType::Renovation => "renovation",
            ProjectType::Interior => "interior",
        }
    }

    /// Maps free-text intake values onto a known type, case-insensitively.
    /// Anything unrecognised becomes `Residential`.
    pub fn from_request_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "commercial" => ProjectType::Commercial,
            "renovation" => ProjectType::Renovation,
            "interior" => ProjectType::Interior,
            _ => ProjectType::Residential,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "project_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(type_name = "project_phase", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Planning,
    Foundation,
    Structure,
    Interior,
    Finishing,
    Completed,
}

impl Phase {
    /// Canonical lifecycle order.
    pub const ALL: [Phase; 6] = [
        Phase::Planning,
        Phase::Foundation,
        Phase::Structure,
        Phase::Interior,
        Phase::Finishing,
        Phase::Completed,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            Phase::Planning => "planning",
            Phase::Foundation => "foundation",
            Phase::Structure => "structure",
            Phase::Interior => "interior",
            Phase::Finishing => "finishing",
            Phase::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.to_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn index(&self) -> usize {
        Phase::ALL
            .iter()
            .position(|phase| phase == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub assignee_id: Option<Uuid>,
    pub assignee_name: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub unit_cost: BigDecimal,
    /// Always `quantity * unit_cost`; recomputed by the ledger on every write.
    pub total_cost: BigDecimal,
    pub supplier: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Advance,
    Milestone,
    Final,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,
    pub amount: BigDecimal,
    pub due_date: Option<DateTime<Utc>>,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Money owed by the client to the project.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub amount: BigDecimal,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub description: String,
    #[serde(default)]
    pub installments: Vec<Installment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AllocationCategory {
    Salary,
    Expense,
    Equipment,
    Other,
}

/// Money paid out of the project pool to a named recipient.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolAllocation {
    pub id: Uuid,
    pub recipient: String,
    pub amount: BigDecimal,
    pub category: AllocationCategory,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requested_by: Option<Uuid>,
    pub status: crate::models::requestmodel::ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub location: String,
    pub address: Option<String>,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub phase: Phase,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Naira, `NUMERIC(18, 2)`.
    pub estimated_cost: BigDecimal,
    pub actual_cost: BigDecimal,
    pub contractor_id: Option<Uuid>,
    pub contractor_name: Option<String>,
    pub designer_id: Option<Uuid>,
    pub designer_name: Option<String>,
    pub worker_ids: Vec<Uuid>,
    pub blueprint_urls: Vec<String>,
    pub progress_image_urls: Vec<String>,
    pub tasks: Json<Vec<Task>>,
    pub materials: Json<Vec<Material>>,
    pub payments: Json<Vec<Payment>>,
    pub allocations: Json<Vec<PoolAllocation>>,
    pub approval_requests: Json<Vec<ApprovalRequest>>,
    /// Bumped on every successful write; used for compare-and-swap updates.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        title: String,
        client_name: String,
        location: String,
        project_type: ProjectType,
    ) -> Self {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            client_id: None,
            client_name,
            location,
            address: None,
            project_type,
            status: ProjectStatus::Pending,
            phase: Phase::Planning,
            start_date: None,
            end_date: None,
            estimated_cost: BigDecimal::zero(),
            actual_cost: BigDecimal::zero(),
            contractor_id: None,
            contractor_name: None,
            designer_id: None,
            designer_name: None,
            worker_ids: Vec::new(),
            blueprint_urls: Vec::new(),
            progress_image_urls: Vec::new(),
            tasks: Json(Vec::new()),
            materials: Json(Vec::new()),
            payments: Json(Vec::new()),
            allocations: Json(Vec::new()),
            approval_requests: Json(Vec::new()),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}
