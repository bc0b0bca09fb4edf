use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wizard_flow::model::{Building, LegalStatus, Product, Traveler};
use wizard_flow::{ApplicationState, FieldError, Step};

/// Body for `POST /applications/{id}/product`.
#[derive(Debug, Deserialize)]
pub struct SelectProductRequest {
    pub product: Product,
}

/// Body for `PUT /applications/{id}/legal-status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalStatusRequest {
    pub legal_status: LegalStatus,
}

/// Position within the active step sequence.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    pub step: Step,
    pub title: &'static str,
    pub number: u32,
    pub total: u32,
}

/// Full session view returned by most endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub session_id: String,
    /// `None` while the product choice screen is showing or after submission.
    pub step: Option<StepInfo>,
    pub active_building: Option<usize>,
    pub active_traveler: Option<usize>,
    /// What still blocks advancing from the current step.
    pub step_errors: Vec<FieldError>,
    pub in_flight: bool,
    pub state: ApplicationState,
}

#[derive(Debug, Serialize)]
pub struct AddBuildingResponse {
    pub index: usize,
    pub building: Building,
}

#[derive(Debug, Serialize)]
pub struct AddTravelerResponse {
    pub index: usize,
    pub traveler: Traveler,
}

/// Receipt returned after a successful submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub session_id: String,
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
    pub message: String,
}
