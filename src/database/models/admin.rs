use serde::Serialize;

use crate::database::object_id::ObjectId;

/// Stored administrator account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct AdminAccount {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}
