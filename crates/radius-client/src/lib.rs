//! RADIUS Client Implementation
//!
//! This crate provides an async RADIUS authentication client built on top of
//! the `radius-proto` protocol implementation.
//!
//! # Features
//!
//! - Async I/O with Tokio, one connected UDP socket per session
//! - PAP and CHAP authentication, Access-Challenge continuation
//! - Status-Server probes (RFC 5997)
//! - Retransmission with fixed or exponential backoff
//! - Response Authenticator and Message-Authenticator verification
//! - JSON configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_client::{AuthOutcome, RadiusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RadiusClient::new("172.20.2.2:1812".parse()?, "10testing").await?;
//!
//!     let response = client.authenticate_pap("xeraph", "qooguevara").await?;
//!     match response.outcome {
//!         AuthOutcome::Accept => println!("accepted"),
//!         AuthOutcome::Reject => println!("rejected"),
//!         AuthOutcome::Challenge => println!("challenged"),
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod transaction;
pub mod transport;

pub use client::{AuthOutcome, AuthResponse, RadiusClient};
pub use config::{ClientConfig, ConfigError, RADIUS_AUTH_PORT};
pub use error::{ClientError, ClientResult, TransactionError, TransactionResult};
pub use retry::{Backoff, RetryPolicy};
pub use transaction::{Transaction, TransactionState};
pub use transport::Transport;
