// Core engine components
pub mod column_catalog;
pub mod field_resolver;
pub mod scalar;
pub mod predicate_compiler;
pub mod projector;
pub mod query_executor;
pub mod stats;
pub mod engine;

pub use column_catalog::*;
pub use field_resolver::*;
pub use scalar::*;
pub use predicate_compiler::*;
pub use projector::*;
pub use query_executor::*;
pub use stats::*;
pub use engine::*;
