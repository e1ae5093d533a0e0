use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{self, Role};
use crate::config::AppConfig;
use crate::database::models::{AdminAccount, NewAdmin, SurveyorAccount};
use crate::database::{DatabaseError, IdentityStore};

use super::error::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSignup {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Admin login body. The identifier may arrive as `email`, `id` or
/// `username`; the first one present wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminLogin {
    pub email: Option<String>,
    pub id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AdminLogin {
    pub fn identifier(&self) -> Option<&str> {
        [&self.email, &self.id, &self.username]
            .into_iter()
            .find_map(|v| present(v.as_deref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeveloperLogin {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyorCredentials {
    pub id: Option<String>,
    pub password: Option<String>,
}

/// Non-empty values count as supplied. Values are used exactly as sent;
/// signup and login compare the same bytes.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Both required values, or a validation error naming only the absent ones.
fn required<'a>(
    message: &str,
    fields: [(&str, Option<&'a str>); 2],
) -> Result<(&'a str, &'a str), ServiceError> {
    match fields {
        [(_, Some(a)), (_, Some(b))] => Ok((a, b)),
        _ => {
            let missing: Vec<&str> = fields
                .iter()
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();
            Err(ServiceError::missing_fields(message, &missing))
        }
    }
}

/// Stateless credential checks for the three roles. Nothing is issued on
/// success; each request proves itself again.
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(identities: Arc<dyn IdentityStore>, config: Arc<AppConfig>) -> Self {
        Self { identities, config }
    }

    pub async fn admin_signup(&self, request: AdminSignup) -> Result<AdminAccount, ServiceError> {
        let (email, password) = required(
            "Email and password are required",
            [
                ("email", present(request.email.as_deref())),
                ("password", present(request.password.as_deref())),
            ],
        )?;
        let (email, password) = (email.to_string(), password.to_string());

        if self.identities.find_admin_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Admin with this email already exists".into()));
        }

        let password_hash = auth::hash_password(&password, self.config.security.bcrypt_cost).await?;
        let admin = NewAdmin {
            name: present(request.name.as_deref()).map(str::to_string),
            email,
            password_hash,
        };

        match self.identities.insert_admin(admin).await {
            Ok(account) => {
                info!("Admin registered: {}", account.email);
                Ok(account)
            }
            Err(DatabaseError::Duplicate(_)) => {
                Err(ServiceError::Conflict("Admin with this email already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stored accounts first, then the configured fallback credential.
    pub async fn admin_login(&self, request: AdminLogin) -> Result<Role, ServiceError> {
        let (identifier, password) = required(
            "Email and password are required",
            [("email", request.identifier()), ("password", present(request.password.as_deref()))],
        )?;
        let (identifier, password) = (identifier.to_string(), password.to_string());

        if let Some(admin) = self.identities.find_admin_by_email(&identifier).await? {
            if auth::verify_password(&password, &admin.password_hash).await? {
                info!("Admin login: {}", identifier);
                return Ok(Role::Admin);
            }
        }

        if let Some(fallback) = &self.config.security.admin_fallback {
            if auth::static_credential_matches(fallback, &identifier, &password) {
                info!("Admin login via configured credential: {}", identifier);
                return Ok(Role::Admin);
            }
        }

        warn!("Admin login rejected: {}", identifier);
        Err(ServiceError::Unauthorized)
    }

    pub async fn developer_login(&self, request: DeveloperLogin) -> Result<Role, ServiceError> {
        let (email, password) = required(
            "Email and password are required",
            [
                ("email", present(request.email.as_deref())),
                ("password", present(request.password.as_deref())),
            ],
        )?;

        match &self.config.security.developer {
            Some(cred) if auth::static_credential_matches(cred, email, password) => {
                info!("Developer login: {}", email);
                Ok(Role::Developer)
            }
            _ => {
                warn!("Developer login rejected: {}", email);
                Err(ServiceError::Unauthorized)
            }
        }
    }

    pub async fn surveyor_register(&self, request: SurveyorCredentials) -> Result<SurveyorAccount, ServiceError> {
        let (id, password) = Self::surveyor_fields(&request)?;

        if self.identities.find_surveyor(&id).await?.is_some() {
            return Err(ServiceError::Conflict("Surveyor already exists".into()));
        }

        let password_hash = auth::hash_password(&password, self.config.security.bcrypt_cost).await?;
        match self.identities.insert_surveyor(SurveyorAccount { id, password_hash }).await {
            Ok(account) => {
                info!("Surveyor registered: {}", account.id);
                Ok(account)
            }
            Err(DatabaseError::Duplicate(_)) => Err(ServiceError::Conflict("Surveyor already exists".into())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn surveyor_login(&self, request: SurveyorCredentials) -> Result<Role, ServiceError> {
        let (id, password) = Self::surveyor_fields(&request)?;

        let Some(surveyor) = self.identities.find_surveyor(&id).await? else {
            warn!("Surveyor login rejected: unknown id {}", id);
            return Err(ServiceError::Unauthorized);
        };
        if !auth::verify_password(&password, &surveyor.password_hash).await? {
            warn!("Surveyor login rejected: {}", id);
            return Err(ServiceError::Unauthorized);
        }

        info!("Surveyor login: {}", id);
        Ok(Role::Surveyor)
    }

    pub async fn list_admins(&self) -> Result<Vec<AdminAccount>, ServiceError> {
        Ok(self.identities.list_admins().await?)
    }

    pub async fn list_surveyors(&self) -> Result<Vec<SurveyorAccount>, ServiceError> {
        Ok(self.identities.list_surveyors().await?)
    }

    fn surveyor_fields(request: &SurveyorCredentials) -> Result<(String, String), ServiceError> {
        let (id, password) = required(
            "ID and password are required",
            [
                ("id", present(request.id.as_deref())),
                ("password", present(request.password.as_deref())),
            ],
        )?;
        Ok((id.to_string(), password.to_string()))
    }
}
