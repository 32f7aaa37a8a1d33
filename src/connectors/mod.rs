// Record sources and the store they load into
pub mod connector_trait;
pub mod mock_connector;
pub mod file_connector;
pub mod record_store;

pub use connector_trait::*;
pub use mock_connector::*;
pub use file_connector::*;
pub use record_store::*;
