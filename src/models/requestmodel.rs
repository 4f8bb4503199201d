// models/requestmodel.rs
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "repair_urgency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "applicant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicantRole {
    Worker,
    Contractor,
    Designer,
}

/// The intake record types that go through review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Construction,
    Repair,
    JobApplication,
}

impl RequestKind {
    pub fn table(&self) -> &'static str {
        match self {
            RequestKind::Construction => "construction_requests",
            RequestKind::Repair => "repair_requests",
            RequestKind::JobApplication => "job_applications",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Construction => "Construction request",
            RequestKind::Repair => "Repair request",
            RequestKind::JobApplication => "Job application",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionRequest {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free text as submitted; normalised only when a project is created.
    pub project_type: String,
    pub location: String,
    pub address: Option<String>,
    pub description: String,
    pub budget: Option<BigDecimal>,
    pub preferred_start: Option<DateTime<Utc>>,
    pub status: ApprovalStatus,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RepairRequest {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub property_address: String,
    pub repair_type: String,
    pub description: String,
    pub urgency: Urgency,
    pub attachments: Vec<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    pub applicant_id: Option<Uuid>,
    pub applicant_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: ApplicantRole,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub experience_years: i32,
    /// Role-specific structured fields (licence numbers, portfolio links, ...).
    pub details: Json<serde_json::Value>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Records that carry a review status.
pub trait Reviewable {
    fn status(&self) -> ApprovalStatus;
    fn set_status(&mut self, status: ApprovalStatus, at: DateTime<Utc>);
}

macro_rules! impl_reviewable {
    ($($record:ty),*) => {
        $(
            impl Reviewable for $record {
                fn status(&self) -> ApprovalStatus {
                    self.status
                }

                fn set_status(&mut self, status: ApprovalStatus, at: DateTime<Utc>) {
                    self.status = status;
                    self.updated_at = at;
                }
            }
        )*
    };
}

impl_reviewable!(ConstructionRequest, RepairRequest, JobApplication);
