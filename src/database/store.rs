//! Storage contracts. The services only ever see these traits; the
//! PostgreSQL and in-memory back-ends implement them with identical
//! filter, sort and null semantics.

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AdminAccount, NewAdmin, Record, RecordFields, RecordPatch, SurveyorAccount,
};
use crate::database::object_id::ObjectId;
use crate::filter::{RecordFilter, RecordQuery, SortSpec};

/// Ordering and window for [`RecordStore::find`].
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub sort: SortSpec,
    pub skip: u64,
    pub limit: u64,
}

impl From<&RecordQuery> for FindOptions {
    fn from(query: &RecordQuery) -> Self {
        Self {
            sort: query.sort.clone(),
            skip: query.skip(),
            limit: query.limit(),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(
        &self,
        filter: &RecordFilter,
        options: &FindOptions,
    ) -> Result<Vec<Record>, DatabaseError>;

    /// Number of records matching `filter`, ignoring any window.
    async fn count(&self, filter: &RecordFilter) -> Result<u64, DatabaseError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Record>, DatabaseError>;

    async fn insert_one(&self, fields: RecordFields) -> Result<ObjectId, DatabaseError>;

    /// Returns how many records were actually persisted, which may be fewer
    /// than supplied.
    async fn insert_many(&self, records: Vec<RecordFields>) -> Result<u64, DatabaseError>;

    /// Apply `patch` atomically and return the updated record, or `None`
    /// when no record has this id.
    async fn find_one_and_update(
        &self,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, DatabaseError>;

    async fn delete_one(&self, id: &ObjectId) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Admin and surveyor credential collections.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, DatabaseError>;

    /// Fails with [`DatabaseError::Duplicate`] if the email is taken.
    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminAccount, DatabaseError>;

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, DatabaseError>;

    async fn find_surveyor(&self, id: &str) -> Result<Option<SurveyorAccount>, DatabaseError>;

    /// Fails with [`DatabaseError::Duplicate`] if the id is taken.
    async fn insert_surveyor(&self, surveyor: SurveyorAccount) -> Result<SurveyorAccount, DatabaseError>;

    async fn list_surveyors(&self) -> Result<Vec<SurveyorAccount>, DatabaseError>;
}
