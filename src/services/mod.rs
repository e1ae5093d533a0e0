pub mod auth_service;
pub mod error;
pub mod record_service;

pub use auth_service::{AdminLogin, AdminSignup, AuthService, DeveloperLogin, SurveyorCredentials};
pub use error::ServiceError;
pub use record_service::{RecordPage, RecordService};
