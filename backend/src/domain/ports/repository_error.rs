//! Error shared by the entity store ports.

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by entity store adapters.
    pub enum RepositoryError {
        /// Store connection could not be established.
        Connection { message: String } => "entity store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "entity store query failed: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Connection { message } => {
                Error::service_unavailable(format!("entity store unavailable: {message}"))
            }
            RepositoryError::Query { message } => {
                Error::internal(format!("entity store error: {message}"))
            }
        }
    }
}
