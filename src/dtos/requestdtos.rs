use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{constructionmodel::Project, requestmodel::*};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConstructionRequestDto {
    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[serde(default)]
    pub project_type: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub address: Option<String>,

    #[serde(default)]
    pub description: String,

    pub budget: Option<BigDecimal>,

    pub preferred_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepairRequestDto {
    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,

    #[validate(length(min = 1, message = "Property address is required"))]
    pub property_address: String,

    #[validate(length(min = 1, message = "Repair type is required"))]
    pub repair_type: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be between 1 and 2000 characters"))]
    pub description: String,

    pub urgency: Option<Urgency>,

    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobApplicationDto {
    pub applicant_id: Option<Uuid>,

    #[validate(length(min = 1, message = "Applicant name is required"))]
    pub applicant_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub phone: Option<String>,

    pub role: ApplicantRole,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub certifications: Vec<String>,

    #[validate(range(min = 0, max = 60, message = "Experience must be between 0 and 60 years"))]
    #[serde(default)]
    pub experience_years: i32,

    #[serde(default)]
    pub details: serde_json::Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReviewFilterQuery {
    pub status: Option<ApprovalStatus>,
    pub role: Option<ApplicantRole>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResultDto {
    pub request: ConstructionRequest,
    pub project: Project,
}
