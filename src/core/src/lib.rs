pub mod configuration;
pub mod error_handling;
pub mod session_management;
pub mod storage;

pub use error_handling::types::DbError;
pub use session_management::connection::Connection;
pub use session_management::repository::ConnectionRepository;
pub use storage::{new_public_id, RequestContext, Writer};
