pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::get as records_get;
pub use collection::post as records_post;
pub use collection::bulk as records_bulk;

pub use record::get as record_get;
pub use record::put as record_put;
pub use record::delete as record_delete;
