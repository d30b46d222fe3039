//! Operation configuration
//!
//! Process-wide settings (header timeout, client certificate material, hosts
//! that demand X.509 auth, the connection broker, page size) live in an
//! explicit [`OperationConfig`] that is handed to every operation through an
//! [`OperationContext`]. Operations never consult the environment themselves.

pub mod context;
pub mod credentials;
pub mod operation;
pub mod validation;

pub use context::OperationContext;
pub use credentials::ClientCertConfig;
pub use operation::{DEFAULT_HEADER_TIMEOUT, DEFAULT_PAGE_SIZE, OperationConfig};
pub use validation::{ConfigError, ConfigResult};
