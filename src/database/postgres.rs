use async_trait::async_trait;
use std::future::Future;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AdminAccount, NewAdmin, Record, RecordFields, RecordPatch, SurveyorAccount,
};
use crate::database::object_id::ObjectId;
use crate::database::query_builder::{bind_param_query, bind_param_query_as, bind_param_query_scalar};
use crate::database::store::{FindOptions, IdentityStore, RecordStore};
use crate::filter::{FilterOrder, FilterWhere, RecordFilter, SqlParam, SqlResult};

const RECORD_COLUMNS: &str =
    r#""id", "name", "age", "sex", "address", "part_no", "society", "caste""#;

/// Rows per multi-row INSERT; keeps each statement under the bind limit.
const INSERT_CHUNK: usize = 1000;

#[derive(Debug, FromRow)]
struct RecordRow {
    id: String,
    name: Option<String>,
    age: Option<i32>,
    sex: Option<String>,
    address: Option<String>,
    part_no: Option<String>,
    society: Option<String>,
    caste: Option<String>,
}

impl TryFrom<RecordRow> for Record {
    type Error = DatabaseError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let id = ObjectId::parse_str(&row.id).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Record {
            id,
            fields: RecordFields {
                name: row.name,
                age: row.age,
                sex: row.sex,
                address: row.address,
                part_no: row.part_no,
                society: row.society,
                caste: row.caste,
            },
        })
    }
}

#[derive(Debug, FromRow)]
struct AdminRow {
    id: String,
    name: Option<String>,
    email: String,
    password_hash: String,
}

impl TryFrom<AdminRow> for AdminAccount {
    type Error = DatabaseError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let id = ObjectId::parse_str(&row.id).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(AdminAccount {
            id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
        })
    }
}

#[derive(Debug, FromRow)]
struct SurveyorRow {
    id: String,
    password_hash: String,
}

impl From<SurveyorRow> for SurveyorAccount {
    fn from(row: SurveyorRow) -> Self {
        Self {
            id: row.id,
            password_hash: row.password_hash,
        }
    }
}

fn field_params(id: &ObjectId, fields: &RecordFields) -> [SqlParam; 8] {
    [
        SqlParam::Text(Some(id.to_hex())),
        SqlParam::Text(fields.name.clone()),
        SqlParam::Int(fields.age),
        SqlParam::Text(fields.sex.clone()),
        SqlParam::Text(fields.address.clone()),
        SqlParam::Text(fields.part_no.clone()),
        SqlParam::Text(fields.society.clone()),
        SqlParam::Text(fields.caste.clone()),
    ]
}

fn insert_sql(rows: usize) -> String {
    let values: Vec<String> = (0..rows)
        .map(|r| {
            let placeholders: Vec<String> = (1..=8).map(|c| format!("${}", r * 8 + c)).collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!("INSERT INTO \"records\" ({}) VALUES {}", RECORD_COLUMNS, values.join(", "))
}

fn update_sql(id: &ObjectId, patch: &RecordPatch) -> SqlResult {
    let mut sets = vec![];
    let mut params = vec![];
    let mut push = |column: &str, param: SqlParam| {
        params.push(param);
        sets.push(format!("\"{}\" = ${}", column, params.len()));
    };
    if let Some(v) = &patch.name { push("name", SqlParam::Text(v.clone())); }
    if let Some(v) = &patch.age { push("age", SqlParam::Int(*v)); }
    if let Some(v) = &patch.sex { push("sex", SqlParam::Text(v.clone())); }
    if let Some(v) = &patch.address { push("address", SqlParam::Text(v.clone())); }
    if let Some(v) = &patch.part_no { push("part_no", SqlParam::Text(v.clone())); }
    if let Some(v) = &patch.society { push("society", SqlParam::Text(v.clone())); }
    if let Some(v) = &patch.caste { push("caste", SqlParam::Text(v.clone())); }

    params.push(SqlParam::Text(Some(id.to_hex())));
    let query = format!(
        "UPDATE \"records\" SET {} WHERE \"id\" = ${} RETURNING {}",
        sets.join(", "),
        params.len(),
        RECORD_COLUMNS
    );
    SqlResult { query, params }
}

fn find_sql(filter: &RecordFilter, options: &FindOptions) -> SqlResult {
    let (where_clause, mut params) = FilterWhere::generate(filter, 0);
    let order_clause = FilterOrder::generate(&options.sort);
    params.push(SqlParam::BigInt(i64::try_from(options.limit).unwrap_or(i64::MAX)));
    let limit_index = params.len();
    params.push(SqlParam::BigInt(i64::try_from(options.skip).unwrap_or(i64::MAX)));
    let offset_index = params.len();

    let query = format!(
        "SELECT {} FROM \"records\" WHERE {} {} LIMIT ${} OFFSET ${}",
        RECORD_COLUMNS, where_clause, order_clause, limit_index, offset_index
    );
    SqlResult { query, params }
}

/// Runs `insert` over `rows` in chunks and sums the rows it reports. A
/// failure after some chunks committed ends the batch with the count so far;
/// a failure on the first chunk is an error.
async fn insert_chunked<'a, T, F, Fut>(rows: &'a [T], chunk_size: usize, mut insert: F) -> Result<u64, DatabaseError>
where
    F: FnMut(&'a [T]) -> Fut,
    Fut: Future<Output = Result<u64, sqlx::Error>>,
{
    let mut inserted = 0u64;
    for chunk in rows.chunks(chunk_size) {
        match insert(chunk).await {
            Ok(n) => inserted += n,
            Err(e) if inserted > 0 => {
                warn!("bulk insert stopped after {} records: {}", inserted, e);
                break;
            }
            Err(e) => return Err(DatabaseError::from_sqlx(e, "records.id")),
        }
    }
    Ok(inserted)
}

/// Record collection backed by the `records` table.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find(
        &self,
        filter: &RecordFilter,
        options: &FindOptions,
    ) -> Result<Vec<Record>, DatabaseError> {
        let sql_result = find_sql(filter, options);
        debug!("find: {}", sql_result.query);

        let mut q = sqlx::query_as::<_, RecordRow>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, DatabaseError> {
        let (where_clause, params) = FilterWhere::generate(filter, 0);
        let query = format!("SELECT COUNT(*) FROM \"records\" WHERE {}", where_clause);

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for p in params.iter() {
            q = bind_param_query_scalar(q, p);
        }
        let count = q.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Record>, DatabaseError> {
        let query = format!("SELECT {} FROM \"records\" WHERE \"id\" = $1", RECORD_COLUMNS);
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Record::try_from).transpose()
    }

    async fn insert_one(&self, fields: RecordFields) -> Result<ObjectId, DatabaseError> {
        let id = ObjectId::new();
        let params = field_params(&id, &fields);
        let query = insert_sql(1);

        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        q.execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, "records.id"))?;
        Ok(id)
    }

    async fn insert_many(&self, records: Vec<RecordFields>) -> Result<u64, DatabaseError> {
        let pool = &self.pool;
        insert_chunked(&records, INSERT_CHUNK, |chunk| async move {
            let params: Vec<SqlParam> = chunk
                .iter()
                .flat_map(|fields| field_params(&ObjectId::new(), fields))
                .collect();
            let query = insert_sql(chunk.len());

            let mut q = sqlx::query(&query);
            for p in params.iter() {
                q = bind_param_query(q, p);
            }
            q.execute(pool).await.map(|result| result.rows_affected())
        })
        .await
    }

    async fn find_one_and_update(
        &self,
        id: &ObjectId,
        patch: &RecordPatch,
    ) -> Result<Option<Record>, DatabaseError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let sql_result = update_sql(id, patch);
        let mut q = sqlx::query_as::<_, RecordRow>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        row.map(Record::try_from).transpose()
    }

    async fn delete_one(&self, id: &ObjectId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM \"records\" WHERE \"id\" = $1")
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// Credential collections backed by the `admins` and `surveyors` tables.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, DatabaseError> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, email, password_hash FROM admins WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AdminAccount::try_from).transpose()
    }

    async fn insert_admin(&self, admin: NewAdmin) -> Result<AdminAccount, DatabaseError> {
        let id = ObjectId::new();
        sqlx::query("INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(id.to_hex())
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, "admins.email"))?;

        Ok(AdminAccount {
            id,
            name: admin.name,
            email: admin.email,
            password_hash: admin.password_hash,
        })
    }

    async fn list_admins(&self) -> Result<Vec<AdminAccount>, DatabaseError> {
        let rows = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, email, password_hash FROM admins ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(AdminAccount::try_from).collect()
    }

    async fn find_surveyor(&self, id: &str) -> Result<Option<SurveyorAccount>, DatabaseError> {
        let row = sqlx::query_as::<_, SurveyorRow>(
            "SELECT id, password_hash FROM surveyors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SurveyorAccount::from))
    }

    async fn insert_surveyor(&self, surveyor: SurveyorAccount) -> Result<SurveyorAccount, DatabaseError> {
        sqlx::query("INSERT INTO surveyors (id, password_hash) VALUES ($1, $2)")
            .bind(&surveyor.id)
            .bind(&surveyor.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, "surveyors.id"))?;
        Ok(surveyor)
    }

    async fn list_surveyors(&self) -> Result<Vec<SurveyorAccount>, DatabaseError> {
        let rows = sqlx::query_as::<_, SurveyorRow>(
            "SELECT id, password_hash FROM surveyors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SurveyorAccount::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Predicate, RecordField, SortDirection, SortSpec};

    #[test]
    fn find_sql_appends_window_params_after_filter() {
        let filter = RecordFilter {
            predicates: vec![Predicate::Equals { field: RecordField::Sex, value: "F".into() }],
        };
        let options = FindOptions {
            sort: SortSpec { field: "age".into(), direction: SortDirection::Asc },
            skip: 40,
            limit: 20,
        };
        let sql = find_sql(&filter, &options);
        assert!(sql.query.ends_with("WHERE \"sex\" = $1 ORDER BY \"age\" ASC NULLS FIRST, \"id\" ASC LIMIT $2 OFFSET $3"));
        assert_eq!(sql.params[1], SqlParam::BigInt(20));
        assert_eq!(sql.params[2], SqlParam::BigInt(40));
    }

    fn failing_after(calls: usize) -> impl FnMut(&[u32]) -> std::future::Ready<Result<u64, sqlx::Error>> {
        let mut seen = 0;
        move |chunk: &[u32]| {
            seen += 1;
            std::future::ready(if seen > calls {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(chunk.len() as u64)
            })
        }
    }

    #[tokio::test]
    async fn chunked_insert_reports_rows_committed_before_a_failure() {
        let rows: Vec<u32> = (0..5).collect();
        assert_eq!(insert_chunked(&rows, 2, failing_after(usize::MAX)).await.unwrap(), 5);
        assert_eq!(insert_chunked(&rows, 2, failing_after(1)).await.unwrap(), 2);
        assert_eq!(insert_chunked(&rows, 2, failing_after(2)).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn chunked_insert_fails_when_nothing_committed() {
        let rows: Vec<u32> = (0..5).collect();
        assert!(insert_chunked(&rows, 2, failing_after(0)).await.is_err());
        assert_eq!(insert_chunked(&Vec::<u32>::new(), 2, failing_after(0)).await.unwrap(), 0);
    }

    #[test]
    fn insert_sql_numbers_placeholders_per_row() {
        let sql = insert_sql(2);
        assert!(sql.contains("($1, $2, $3, $4, $5, $6, $7, $8), ($9, $10, $11, $12, $13, $14, $15, $16)"));
    }

    #[test]
    fn update_sql_sets_only_present_fields() {
        let id = ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap();
        let patch = RecordPatch {
            age: Some(None),
            caste: Some(Some("OBC".into())),
            ..Default::default()
        };
        let sql = update_sql(&id, &patch);
        assert!(sql.query.starts_with("UPDATE \"records\" SET \"age\" = $1, \"caste\" = $2 WHERE \"id\" = $3"));
        assert_eq!(sql.params[0], SqlParam::Int(None));
        assert_eq!(sql.params[2], SqlParam::Text(Some("65a1b2c3d4e5f60718293a4b".into())));
    }
}
