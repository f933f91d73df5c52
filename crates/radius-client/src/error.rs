//! Client error types

use crate::config::ConfigError;
use radius_proto::PacketError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request/response exchange
#[derive(Error, Debug)]
pub enum TransactionError {
    /// Outbound data could not be encoded; nothing was sent
    #[error("Encoding error: {0}")]
    Encoding(PacketError),

    /// The matching response could not be parsed
    #[error("Malformed response: {0}")]
    Malformed(PacketError),

    /// The matching response was not signed with our shared secret
    #[error("Response failed authentication: {0}")]
    AuthenticationMismatch(PacketError),

    /// No matching response after the initial send and every retransmission
    #[error("No response after {attempts} attempts (last wait {last_wait:?})")]
    Timeout { attempts: u16, last_wait: Duration },

    /// Socket-level failure
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),
}

impl TransactionError {
    /// Classify a codec error raised while building a request
    pub fn encoding(error: PacketError) -> Self {
        TransactionError::Encoding(error)
    }

    /// Classify a codec error raised while reading a response
    pub fn decoding(error: PacketError) -> Self {
        if error.is_authentication_failure() {
            TransactionError::AuthenticationMismatch(error)
        } else {
            TransactionError::Malformed(error)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransactionError::Timeout { .. })
    }

    pub fn is_authentication_mismatch(&self) -> bool {
        matches!(self, TransactionError::AuthenticationMismatch(_))
    }
}

/// Result type for transaction operations
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors surfaced by [`RadiusClient`](crate::RadiusClient)
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Socket setup failed before any request was made
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// An exchange failed; carries the session context it failed in
    #[error("RADIUS server {server} (identifier {identifier}): {source}")]
    Transaction {
        server: SocketAddr,
        identifier: u8,
        #[source]
        source: TransactionError,
    },
}

impl ClientError {
    /// The underlying transaction failure, if this error came from an exchange
    pub fn transaction(&self) -> Option<&TransactionError> {
        match self {
            ClientError::Transaction { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.transaction().is_some_and(TransactionError::is_timeout)
    }

    pub fn is_authentication_mismatch(&self) -> bool {
        self.transaction()
            .is_some_and(TransactionError::is_authentication_mismatch)
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
