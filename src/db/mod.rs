pub mod ddl;
pub mod error;
pub mod pool;
pub mod retry;
pub mod schema;

pub use error::{ConstraintKind, IntegrityViolation, StoreError};
pub use pool::create_pool;
