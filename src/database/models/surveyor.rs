use serde::Serialize;

/// Stored field-surveyor account, keyed by the surveyor's chosen id.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyorAccount {
    pub id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
