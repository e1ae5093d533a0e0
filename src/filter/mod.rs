pub mod types;
pub mod compiler;
pub mod filter_where;
pub mod filter_order;

pub use types::*;
pub use compiler::QueryCompiler;
pub use filter_where::FilterWhere;
pub use filter_order::{FilterOrder, SortTarget};
