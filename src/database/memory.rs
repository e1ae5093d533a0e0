use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AdminAccount, NewAdmin, Record, RecordFields, RecordPatch, SurveyorAccount,
};
use crate::database::object_id::ObjectId;
use crate::database::store::{FindOptions, IdentityStore, RecordStore};
use crate::filter::{FilterOrder, FilterWhere, RecordFilter};

/// Process-local record collection for development and tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<BTreeMap<ObjectId, RecordFields>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(
        &self,
        filter: &RecordFilter,
        options: &FindOptions,
    ) -> Result<Vec<Record>, DatabaseError> {
        let records = self.records.read().await;
        let mut matched: Vec<Record> = records
            .iter()
            .filter(|(_, fields)| FilterWhere::matches(filter, fields))
            .map(|(id, fields)| Record { id: *id, fields: fields.clone() })
            .collect();
        matched.sort_by(|a, b| FilterOrder::compare(&options.sort, a, b));

        Ok(matched
            .into_iter()
            .skip(to_usize(options.skip))
            .take(to_usize(options.limit))
            .collect())
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, DatabaseError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|fields| FilterWhere::matches(filter, fields))
            .count() as u64)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Record>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.get(id).map(|fields| Record { id: *id, fields: fields.clone() }))
    }

    async fn insert_one(&self, fields: RecordFields) -> Result<ObjectId, DatabaseError> {
        let id = ObjectId::new();
        self.records.write().await.insert(id, fields);
        Ok(id)
    }

    async fn insert_many(&self, records: Vec<RecordFields>) -> Result<u64, DatabaseError> {
        let mut store = self.records.write().await;
        let mut inserted = 0;
        for fields in records {
            store.insert(ObjectId::new(), fields);
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn find_one_and_update(
        &self,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, DatabaseError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(id).map(|fields| {
            patch.apply(fields);
            Record { id: *id, fields: fields.clone() }
        }))
    }

    async fn delete_one(&self, id: &ObjectId) -> Result<u64, DatabaseError> {
        Ok(self.records.write().await.remove(id).map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Process-local admin and surveyor collections.
#[derive(Default)]
pub struct MemoryIdentityStore {
    admins: RwLock<Vec<AdminAccount>>,
    surveyors: RwLock<BTreeMap<String, SurveyorAccount>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, DatabaseError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.email == email).cloned())
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminAccount, DatabaseError> {
        let mut admins = self.admins.write().await;
        if admins.iter().any(|a| a.email == admin.email) {
            return Err(DatabaseError::Duplicate("admins.email".to_string()));
        }
        let account = AdminAccount {
            id: ObjectId::new(),
            name: admin.name,
            email: admin.email,
            password_hash: admin.password_hash,
        };
        admins.push(account.clone());
        Ok(account)
    }

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, DatabaseError> {
        Ok(self.admins.read().await.clone())
    }

    async fn find_surveyor(&self, id: &str) -> Result<Option<SurveyorAccount>, DatabaseError> {
        Ok(self.surveyors.read().await.get(id).cloned())
    }

    async fn insert_surveyor(&self, surveyor: SurveyorAccount) -> Result<SurveyorAccount, DatabaseError> {
        let mut surveyors = self.surveyors.write().await;
        if surveyors.contains_key(&surveyor.id) {
            return Err(DatabaseError::Duplicate("surveyors.id".to_string()));
        }
        surveyors.insert(surveyor.id.clone(), surveyor.clone());
        Ok(surveyor)
    }

    async fn list_surveyors(&self) -> Result<Vec<SurveyorAccount>, DatabaseError> {
        Ok(self.surveyors.read().await.values().cloned().collect())
    }
}
