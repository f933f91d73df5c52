//! Request/response transaction state machine
//!
//! ```text
//! Idle --send--> Sent --matching response--> Matched
//!                  |  \
//!                  |   '--timeout, retries left--> Sent (retransmit)
//!                  '--timeout, retries exhausted--> TimedOut
//! ```
//!
//! Retransmissions reuse the exact request bytes, so the identifier and the
//! Request Authenticator stay the same and a response to any copy is valid.

use crate::error::{TransactionError, TransactionResult};
use crate::retry::RetryPolicy;
use crate::transport::Transport;
use radius_proto::{Authenticator, Packet};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    Sent,
    Matched,
    TimedOut,
    /// Ended by a decode, authentication or socket error
    Failed,
}

/// One outstanding request
#[derive(Debug)]
pub struct Transaction {
    request: Vec<u8>,
    identifier: u8,
    request_authenticator: Authenticator,
    state: TransactionState,
    attempts: u16,
    deadline: Option<Instant>,
}

impl Transaction {
    /// Wrap an encoded request; identifier and authenticator are read from it
    pub fn new(request: Vec<u8>) -> TransactionResult<Self> {
        if request.len() < Packet::MIN_PACKET_SIZE {
            return Err(TransactionError::Encoding(
                radius_proto::PacketError::InvalidLength(request.len()),
            ));
        }

        let mut request_authenticator = [0u8; 16];
        request_authenticator.copy_from_slice(&request[4..Packet::MIN_PACKET_SIZE]);

        Ok(Transaction {
            identifier: request[1],
            request_authenticator,
            request,
            state: TransactionState::Idle,
            attempts: 0,
            deadline: None,
        })
    }

    pub fn identifier(&self) -> u8 {
        self.identifier
    }

    pub fn request_authenticator(&self) -> &Authenticator {
        &self.request_authenticator
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Number of times the request has been put on the wire
    pub fn attempts(&self) -> u16 {
        self.attempts
    }

    /// When the current wait expires, while the transaction is `Sent`
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive the transaction to completion
    ///
    /// Timeouts are retried according to `policy`; every other failure ends
    /// the transaction immediately. Executing again starts a fresh round of
    /// sends of the same request.
    pub async fn execute(
        &mut self,
        transport: &mut Transport,
        policy: &RetryPolicy,
        secret: &[u8],
    ) -> TransactionResult<Packet> {
        self.state = TransactionState::Idle;
        self.attempts = 0;

        let result = self.run(transport, policy, secret).await;
        if result.is_err() && self.state != TransactionState::TimedOut {
            self.state = TransactionState::Failed;
        }
        self.deadline = None;
        result
    }

    async fn run(
        &mut self,
        transport: &mut Transport,
        policy: &RetryPolicy,
        secret: &[u8],
    ) -> TransactionResult<Packet> {
        let mut wait = Duration::ZERO;

        while self.attempts < policy.max_attempts() {
            wait = policy.timeout_for_attempt(self.attempts);

            transport.send(&self.request).await?;
            self.attempts += 1;
            self.state = TransactionState::Sent;
            self.deadline = Some(Instant::now() + wait);

            debug!(
                server = %transport.server(),
                identifier = self.identifier,
                attempt = self.attempts,
                wait_ms = wait.as_millis() as u64,
                "Request sent"
            );

            if let Some(datagram) = transport.await_response(self.identifier, wait).await? {
                let packet =
                    Packet::decode_response(&datagram, secret, &self.request_authenticator)
                        .map_err(|e| {
                            warn!(
                                server = %transport.server(),
                                identifier = self.identifier,
                                error = %e,
                                "Rejecting response"
                            );
                            TransactionError::decoding(e)
                        })?;

                self.state = TransactionState::Matched;
                debug!(
                    server = %transport.server(),
                    identifier = self.identifier,
                    code = %packet.code,
                    attempts = self.attempts,
                    "Response matched"
                );
                return Ok(packet);
            }
        }

        self.state = TransactionState::TimedOut;
        warn!(
            server = %transport.server(),
            identifier = self.identifier,
            attempts = self.attempts,
            "No response from RADIUS server"
        );
        Err(TransactionError::Timeout {
            attempts: self.attempts,
            last_wait: wait,
        })
    }
}
