//! RADIUS client session
//!
//! A [`RadiusClient`] owns one UDP socket, the shared secret and the
//! identifier counter for a single server. Every request method takes
//! `&mut self`, so a session never has two transactions in flight and
//! identifiers are only reused after 256 requests have completed.
//!
//! Sessions are independent: open one per server (or per task) rather than
//! sharing one behind a lock if requests should run concurrently.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransactionError};
use crate::retry::RetryPolicy;
use crate::transaction::Transaction;
use crate::transport::Transport;
use radius_proto::auth::{encrypt_user_password, generate_request_authenticator_with};
use radius_proto::{
    Attribute, AttributeType, Authenticator, ChapChallenge, ChapResponse, Code, Packet,
    PacketError,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::net::{Ipv4Addr, SocketAddr};
use tracing::{debug, info};

/// How the server answered an authentication request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accept,
    Reject,
    Challenge,
}

impl AuthOutcome {
    fn from_code(code: Code) -> Option<Self> {
        match code {
            Code::AccessAccept => Some(AuthOutcome::Accept),
            Code::AccessReject => Some(AuthOutcome::Reject),
            Code::AccessChallenge => Some(AuthOutcome::Challenge),
            _ => None,
        }
    }
}

/// Verified response to an Access-Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub outcome: AuthOutcome,
    /// The decoded response, including every attribute the server returned
    pub packet: Packet,
}

impl AuthResponse {
    fn from_packet(packet: Packet) -> Result<Self, PacketError> {
        let outcome =
            AuthOutcome::from_code(packet.code).ok_or(PacketError::UnexpectedCode(packet.code))?;
        Ok(AuthResponse { outcome, packet })
    }

    pub fn code(&self) -> Code {
        self.packet.code
    }

    pub fn is_accept(&self) -> bool {
        self.outcome == AuthOutcome::Accept
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.packet.attributes
    }

    /// Reply-Message attributes, lossily decoded as text
    pub fn reply_messages(&self) -> Vec<String> {
        self.packet
            .find_all_attributes(AttributeType::ReplyMessage.as_u8())
            .into_iter()
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
            .collect()
    }

    /// State attribute to echo back when answering a challenge
    pub fn state(&self) -> Option<&[u8]> {
        self.packet
            .find_attribute(AttributeType::State.as_u8())
            .map(|a| a.value.as_slice())
    }
}

/// A RADIUS client session bound to one server
pub struct RadiusClient {
    transport: Transport,
    secret: Vec<u8>,
    next_identifier: u8,
    retry: RetryPolicy,
    nas_identifier: Option<String>,
    nas_ip_address: Option<Ipv4Addr>,
    message_authenticator: bool,
    rng: Box<dyn RngCore + Send>,
}

impl RadiusClient {
    /// Open a session with default retry policy and no NAS attributes
    pub async fn new(server: SocketAddr, secret: impl Into<Vec<u8>>) -> ClientResult<Self> {
        let transport = Transport::connect(server).await?;
        info!(server = %server, "RADIUS client session opened");

        Ok(RadiusClient {
            transport,
            secret: secret.into(),
            next_identifier: 0,
            retry: RetryPolicy::default(),
            nas_identifier: None,
            nas_ip_address: None,
            message_authenticator: false,
            rng: Box::new(StdRng::from_os_rng()),
        })
    }

    /// Open a session from a validated configuration
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let server = config.server_addr().await?;

        let mut client = Self::new(server, config.secret.as_bytes()).await?;
        client.retry = config.retry.clone();
        client.nas_identifier = config.nas_identifier.clone();
        client.nas_ip_address = config.nas_ip_address;
        client.message_authenticator = config.message_authenticator;
        Ok(client)
    }

    /// Replace the source of Request Authenticators
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start the identifier counter at `identifier`
    pub fn with_initial_identifier(mut self, identifier: u8) -> Self {
        self.next_identifier = identifier;
        self
    }

    pub fn with_message_authenticator(mut self, enabled: bool) -> Self {
        self.message_authenticator = enabled;
        self
    }

    pub fn server(&self) -> SocketAddr {
        self.transport.server()
    }

    pub fn local_addr(&self) -> ClientResult<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    /// Identifier the next request will use
    pub fn next_identifier(&self) -> u8 {
        self.next_identifier
    }

    /// PAP authentication (RFC 2865 Section 5.2)
    pub async fn authenticate_pap(
        &mut self,
        username: &str,
        password: &str,
    ) -> ClientResult<AuthResponse> {
        self.pap_request(username, password, None).await
    }

    /// Answer an Access-Challenge, echoing its State attribute
    pub async fn continue_challenge(
        &mut self,
        username: &str,
        response: &str,
        state: &[u8],
    ) -> ClientResult<AuthResponse> {
        self.pap_request(username, response, Some(state)).await
    }

    /// CHAP authentication using the Request Authenticator as the challenge
    pub async fn authenticate_chap(
        &mut self,
        username: &str,
        password: &str,
    ) -> ClientResult<AuthResponse> {
        let (identifier, authenticator) = self.allocate();

        let build = || -> Result<Packet, PacketError> {
            let challenge = ChapChallenge::from_authenticator(&authenticator);
            let chap = ChapResponse::compute(identifier, password, &challenge);

            let mut packet = Packet::new(Code::AccessRequest, identifier, authenticator);
            packet.add_attribute(Attribute::string(
                AttributeType::UserName.as_u8(),
                username,
            )?);
            packet.add_attribute(Attribute::new(
                AttributeType::ChapPassword.as_u8(),
                chap.to_bytes(),
            )?);
            Ok(packet)
        };
        let packet = build().map_err(|e| self.encoding_error(identifier, e))?;

        debug!(username = %username, identifier, "Sending CHAP Access-Request");
        self.authenticate(packet).await
    }

    /// Status-Server probe (RFC 5997)
    ///
    /// Returns the server's reply, normally an Access-Accept.
    pub async fn status_server(&mut self) -> ClientResult<Packet> {
        let (identifier, authenticator) = self.allocate();

        let mut packet = Packet::new(Code::StatusServer, identifier, authenticator);
        self.add_nas_attributes(&mut packet)
            .map_err(|e| self.encoding_error(identifier, e))?;
        // Mandatory for Status-Server regardless of configuration
        packet.add_attribute(Attribute {
            attr_type: AttributeType::MessageAuthenticator.as_u8(),
            value: vec![0u8; 16],
        });

        self.exchange(packet).await
    }

    /// Release the socket
    pub fn close(self) {
        info!(server = %self.server(), "RADIUS client session closed");
    }

    async fn pap_request(
        &mut self,
        username: &str,
        password: &str,
        state: Option<&[u8]>,
    ) -> ClientResult<AuthResponse> {
        let (identifier, authenticator) = self.allocate();

        let build = || -> Result<Packet, PacketError> {
            let hidden = encrypt_user_password(password, &self.secret, &authenticator)?;

            let mut packet = Packet::new(Code::AccessRequest, identifier, authenticator);
            packet.add_attribute(Attribute::string(
                AttributeType::UserName.as_u8(),
                username,
            )?);
            packet.add_attribute(Attribute::new(AttributeType::UserPassword.as_u8(), hidden)?);
            if let Some(state) = state {
                packet.add_attribute(Attribute::new(
                    AttributeType::State.as_u8(),
                    state.to_vec(),
                )?);
            }
            Ok(packet)
        };
        let packet = build().map_err(|e| self.encoding_error(identifier, e))?;

        debug!(
            username = %username,
            identifier,
            challenge_response = state.is_some(),
            "Sending PAP Access-Request"
        );
        self.authenticate(packet).await
    }

    /// Add session-wide attributes and run an Access-Request exchange
    async fn authenticate(&mut self, mut packet: Packet) -> ClientResult<AuthResponse> {
        let identifier = packet.identifier;
        self.add_nas_attributes(&mut packet)
            .map_err(|e| self.encoding_error(identifier, e))?;
        if self.message_authenticator {
            packet.add_attribute(Attribute {
                attr_type: AttributeType::MessageAuthenticator.as_u8(),
                value: vec![0u8; 16],
            });
        }

        let response = self.exchange(packet).await?;
        let response = AuthResponse::from_packet(response)
            .map_err(|e| self.context(identifier, TransactionError::Malformed(e)))?;

        info!(
            server = %self.server(),
            identifier,
            outcome = ?response.outcome,
            "Authentication completed"
        );
        Ok(response)
    }

    async fn exchange(&mut self, mut packet: Packet) -> ClientResult<Packet> {
        let identifier = packet.identifier;
        let bytes = packet
            .encode_request(&self.secret)
            .map_err(|e| self.encoding_error(identifier, e))?;
        let mut transaction =
            Transaction::new(bytes).map_err(|e| self.context(identifier, e))?;

        transaction
            .execute(&mut self.transport, &self.retry, &self.secret)
            .await
            .map_err(|e| self.context(identifier, e))
    }

    /// Take the next identifier and a fresh Request Authenticator
    fn allocate(&mut self) -> (u8, Authenticator) {
        let identifier = self.next_identifier;
        self.next_identifier = identifier.wrapping_add(1);
        let authenticator = generate_request_authenticator_with(&mut *self.rng);
        (identifier, authenticator)
    }

    fn add_nas_attributes(&self, packet: &mut Packet) -> Result<(), PacketError> {
        if let Some(ref nas_id) = self.nas_identifier {
            packet.add_attribute(Attribute::string(
                AttributeType::NasIdentifier.as_u8(),
                nas_id.as_str(),
            )?);
        }
        if let Some(addr) = self.nas_ip_address {
            packet.add_attribute(Attribute::ipv4(AttributeType::NasIpAddress.as_u8(), addr)?);
        }
        Ok(())
    }

    fn encoding_error(&self, identifier: u8, error: PacketError) -> ClientError {
        self.context(identifier, TransactionError::encoding(error))
    }

    fn context(&self, identifier: u8, source: TransactionError) -> ClientError {
        ClientError::Transaction {
            server: self.server(),
            identifier,
            source,
        }
    }
}

impl std::fmt::Debug for RadiusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadiusClient")
            .field("server", &self.server())
            .field("next_identifier", &self.next_identifier)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: Code) -> Packet {
        let mut packet = Packet::new(code, 1, [0u8; 16]);
        packet.add_attribute(Attribute::string(18, "line one").unwrap());
        packet.add_attribute(Attribute::string(18, "line two").unwrap());
        packet.add_attribute(Attribute::new(24, vec![0xde, 0xad]).unwrap());
        packet
    }

    #[test]
    fn test_outcome_from_code() {
        let accept = AuthResponse::from_packet(response(Code::AccessAccept)).unwrap();
        assert!(accept.is_accept());

        let challenge = AuthResponse::from_packet(response(Code::AccessChallenge)).unwrap();
        assert_eq!(challenge.outcome, AuthOutcome::Challenge);
        assert_eq!(challenge.state(), Some(&[0xde, 0xad][..]));
        assert_eq!(challenge.reply_messages(), vec!["line one", "line two"]);

        assert_eq!(
            AuthResponse::from_packet(response(Code::AccountingResponse)),
            Err(PacketError::UnexpectedCode(Code::AccountingResponse))
        );
    }

    #[tokio::test]
    async fn test_identifiers_are_sequential_and_wrap() {
        let mut client = RadiusClient::new("127.0.0.1:1812".parse().unwrap(), "s")
            .await
            .unwrap()
            .with_initial_identifier(254);

        assert_eq!(client.allocate().0, 254);
        assert_eq!(client.allocate().0, 255);
        assert_eq!(client.allocate().0, 0);
        assert_eq!(client.next_identifier(), 1);
    }

    #[tokio::test]
    async fn test_injected_rng_drives_authenticators() {
        let server: SocketAddr = "127.0.0.1:1812".parse().unwrap();
        let mut a = RadiusClient::new(server, "s")
            .await
            .unwrap()
            .with_rng(StdRng::seed_from_u64(42));
        let mut b = RadiusClient::new(server, "s")
            .await
            .unwrap()
            .with_rng(StdRng::seed_from_u64(42));

        let (_, first) = a.allocate();
        assert_eq!(first, b.allocate().1);
        assert_ne!(first, a.allocate().1);
    }

    #[tokio::test]
    async fn test_oversized_username_is_encoding_error() {
        let mut client = RadiusClient::new("127.0.0.1:1812".parse().unwrap(), "s")
            .await
            .unwrap();
        let username = "u".repeat(254);

        let err = client.authenticate_pap(&username, "pw").await.unwrap_err();
        assert!(matches!(
            err.transaction(),
            Some(TransactionError::Encoding(PacketError::AttributeTooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn test_oversized_password_is_encoding_error() {
        let mut client = RadiusClient::new("127.0.0.1:1812".parse().unwrap(), "s")
            .await
            .unwrap();
        let password = "p".repeat(129);

        let err = client.authenticate_pap("xeraph", &password).await.unwrap_err();
        assert!(matches!(
            err.transaction(),
            Some(TransactionError::Encoding(PacketError::PasswordTooLong(129)))
        ));
    }
}
