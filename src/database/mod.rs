pub mod manager;
pub mod memory;
pub mod models;
pub mod object_id;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryIdentityStore, MemoryRecordStore};
pub use object_id::{ObjectId, ObjectIdError};
pub use postgres::{PgIdentityStore, PgRecordStore};
pub use store::{FindOptions, IdentityStore, RecordStore};
