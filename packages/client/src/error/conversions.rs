use super::constructors;
use super::types::Error;
use crate::broker::BrokerError;
use crate::config::ConfigError;
use crate::transport::TransportError;

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        constructors::transport(error)
    }
}

impl From<BrokerError> for Error {
    fn from(error: BrokerError) -> Self {
        let message = error.to_string();
        constructors::broker(message, error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        constructors::builder(message).with(error)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        constructors::builder(format!("invalid URL: {error}")).with(error)
    }
}
