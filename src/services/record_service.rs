use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::models::{Record, RecordFields, RecordInput, RecordPatch, RecordPatchInput};
use crate::database::{FindOptions, ObjectId, RecordStore};
use crate::filter::QueryCompiler;

use super::error::ServiceError;

/// One page of a record listing. `total` counts every match, independent of
/// the page window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    pub data: Vec<Record>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Public read/write surface over the record store.
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_records(&self, params: &HashMap<String, String>) -> Result<RecordPage, ServiceError> {
        let query = QueryCompiler::compile(params);
        debug!(?query, "compiled record query");

        let options = FindOptions::from(&query);
        let (data, total) = tokio::try_join!(
            self.store.find(&query.filter, &options),
            self.store.count(&query.filter),
        )?;

        Ok(RecordPage {
            data,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }

    pub async fn get_record(&self, id: &str) -> Result<Record, ServiceError> {
        let id = ObjectId::parse_str(id)?;
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Record {} not found", id)))
    }

    pub async fn create_record(&self, input: RecordInput) -> Result<ObjectId, ServiceError> {
        let fields = RecordFields::from(input);
        let id = self.store.insert_one(fields).await?;
        debug!("created record {}", id);
        Ok(id)
    }

    /// Returns the number of records the store persisted.
    pub async fn create_records_bulk(&self, inputs: Vec<RecordInput>) -> Result<u64, ServiceError> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let requested = inputs.len();
        let records: Vec<RecordFields> = inputs.into_iter().map(RecordFields::from).collect();
        let invalid_ages = records.iter().filter(|r| r.age.is_none()).count();

        let inserted = self.store.insert_many(records).await?;
        if inserted < requested as u64 {
            warn!("bulk insert persisted {} of {} records", inserted, requested);
        } else {
            info!("bulk insert persisted {} records ({} without a readable age)", inserted, invalid_ages);
        }
        Ok(inserted)
    }

    /// Changes only the fields present in `input`.
    pub async fn update_record(&self, id: &str, input: RecordPatchInput) -> Result<Record, ServiceError> {
        let id = ObjectId::parse_str(id)?;
        let patch = RecordPatch::from(input);
        self.store
            .find_one_and_update(&id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Record {} not found", id)))
    }

    pub async fn delete_record(&self, id: &str) -> Result<(), ServiceError> {
        let id = ObjectId::parse_str(id)?;
        match self.store.delete_one(&id).await? {
            0 => Err(ServiceError::NotFound(format!("Record {} not found", id))),
            _ => Ok(()),
        }
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryRecordStore;
    use serde_json::json;

    fn service() -> RecordService {
        RecordService::new(Arc::new(MemoryRecordStore::new()))
    }

    fn input(v: serde_json::Value) -> RecordInput {
        serde_json::from_value(v).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn total_is_independent_of_page() {
        let svc = service();
        for name in ["a", "b", "c"] {
            svc.create_record(input(json!({ "name": name }))).await.unwrap();
        }

        let page = svc
            .list_records(&params(&[("page", "9999"), ("pageSize", "20")]))
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 9999);
        assert_eq!(page.page_size, 20);
    }

    #[tokio::test]
    async fn invalid_id_is_rejected_before_store_lookup() {
        let svc = service();
        let err = svc.update_record("not-a-valid-id", RecordPatchInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidId(_)));
        let err = svc.delete_record("xyz").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidId(_)));
    }

    #[tokio::test]
    async fn absent_id_is_not_found() {
        let svc = service();
        let absent = ObjectId::new().to_hex();
        assert!(matches!(
            svc.update_record(&absent, RecordPatchInput::default()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(svc.delete_record(&absent).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get_record(&absent).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn bulk_insert_keeps_unreadable_ages_as_null() {
        let svc = service();
        let inputs = vec![
            input(json!({"name": "a", "age": 20})),
            input(json!({"name": "b", "age": "31"})),
            input(json!({"name": "c", "age": "unknown"})),
            input(json!({"name": "d", "age": 0})),
            input(json!({"name": "e"})),
        ];
        assert_eq!(svc.create_records_bulk(inputs).await.unwrap(), 5);

        let page = svc.list_records(&params(&[("search", "c")])).await.unwrap();
        assert_eq!(page.data[0].fields.age, None);
        let page = svc.list_records(&params(&[("ageMax", "0")])).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].fields.name.as_deref(), Some("d"));
    }

    #[tokio::test]
    async fn empty_bulk_inserts_nothing() {
        assert_eq!(service().create_records_bulk(vec![]).await.unwrap(), 0);
    }
}
