use super::Code;
use crate::attributes::{Attribute, AttributeType, decode_attributes};
use crate::auth::{self, AUTHENTICATOR_LENGTH, Authenticator};
use crate::message_auth;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Invalid packet length: {0}")]
    InvalidLength(usize),
    #[error("Length field says {declared} bytes but datagram has {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("Invalid packet code: {0}")]
    InvalidCode(u8),
    #[error("Unexpected packet code: {0}")]
    UnexpectedCode(Code),
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
    #[error("Attribute {attr_type} value too long: {length} bytes (max 253)")]
    AttributeTooLong { attr_type: u8, length: usize },
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),
    #[error("User-Password too long: {0} bytes (max 128)")]
    PasswordTooLong(usize),
    #[error("Response Authenticator does not match")]
    AuthenticatorMismatch,
    #[error("Message-Authenticator does not match")]
    MessageAuthenticatorMismatch,
}

impl PacketError {
    /// Errors raised while building outbound data
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            PacketError::PacketTooLarge(_)
                | PacketError::AttributeTooLong { .. }
                | PacketError::PasswordTooLong(_)
        )
    }

    /// Integrity failures: the packet parsed but was not produced with our secret
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            PacketError::AuthenticatorMismatch | PacketError::MessageAuthenticatorMismatch
        )
    }
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet type (1 byte)
    pub code: Code,
    /// Packet identifier for matching requests/responses (1 byte)
    pub identifier: u8,
    /// Request or Response Authenticator (16 bytes)
    pub authenticator: Authenticator,
    /// List of attributes, in wire order
    pub attributes: Vec<Attribute>,
}

impl Packet {
    /// Minimum RADIUS packet size (20 bytes: 1 code + 1 id + 2 length + 16 authenticator)
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    const AUTHENTICATOR_RANGE: std::ops::Range<usize> = 4..4 + AUTHENTICATOR_LENGTH;

    pub fn new(code: Code, identifier: u8, authenticator: Authenticator) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Encode packet to bytes, using `authenticator` as is
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let total_length = self.length();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total_length));
        }

        let mut buffer = Vec::with_capacity(total_length);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        buffer.extend_from_slice(&(total_length as u16).to_be_bytes());
        buffer.extend_from_slice(&self.authenticator);

        for attr in &self.attributes {
            attr.encode_into(&mut buffer)?;
        }

        Ok(buffer)
    }

    /// Encode a client request
    ///
    /// If the packet carries a Message-Authenticator attribute its value is
    /// recomputed over the final bytes (RFC 3579 Section 3.2) and written back
    /// into both the packet and the returned buffer.
    pub fn encode_request(&mut self, secret: &[u8]) -> Result<Vec<u8>, PacketError> {
        let index = self.zero_message_authenticator();
        let mut buffer = self.encode()?;

        if let Some(index) = index {
            let offset = self.value_offset(index);
            let mac = message_auth::calculate_message_authenticator(&buffer, secret);
            buffer[offset..offset + AUTHENTICATOR_LENGTH].copy_from_slice(&mac);
            self.attributes[index].value = mac.to_vec();
        }

        Ok(buffer)
    }

    /// Encode a response to the request whose authenticator is `request_authenticator`
    ///
    /// Computes the Response Authenticator
    /// `MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)`,
    /// stores it in `self.authenticator` and returns the wire bytes. A
    /// Message-Authenticator attribute, if present, is signed first with the
    /// request authenticator in the header, as RFC 3579 requires.
    pub fn encode_response(
        &mut self,
        request_authenticator: &Authenticator,
        secret: &[u8],
    ) -> Result<Vec<u8>, PacketError> {
        let index = self.zero_message_authenticator();
        self.authenticator = *request_authenticator;
        let mut buffer = self.encode()?;

        if let Some(index) = index {
            let offset = self.value_offset(index);
            let mac = message_auth::calculate_message_authenticator(&buffer, secret);
            buffer[offset..offset + AUTHENTICATOR_LENGTH].copy_from_slice(&mac);
            self.attributes[index].value = mac.to_vec();
        }

        let response_auth =
            auth::response_authenticator_for_bytes(&buffer, request_authenticator, secret);
        buffer[Self::AUTHENTICATOR_RANGE].copy_from_slice(&response_auth);
        self.authenticator = response_auth;

        Ok(buffer)
    }

    /// Decode packet from bytes
    ///
    /// The datagram must be exactly as long as its length field says.
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::MIN_PACKET_SIZE {
            return Err(PacketError::InvalidLength(data.len()));
        }
        if data.len() > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(data.len()));
        }

        let code = Code::from_u8(data[0]).ok_or(PacketError::InvalidCode(data[0]))?;
        let identifier = data[1];
        let length = u16::from_be_bytes([data[2], data[3]]) as usize;

        if !(Self::MIN_PACKET_SIZE..=Self::MAX_PACKET_SIZE).contains(&length) {
            return Err(PacketError::InvalidLength(length));
        }

        if data.len() != length {
            return Err(PacketError::LengthMismatch {
                declared: length,
                actual: data.len(),
            });
        }

        let mut authenticator = [0u8; AUTHENTICATOR_LENGTH];
        authenticator.copy_from_slice(&data[Self::AUTHENTICATOR_RANGE]);

        let attributes = decode_attributes(&data[Self::MIN_PACKET_SIZE..length])?;

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
        })
    }

    /// Decode and authenticate a response
    ///
    /// The Response Authenticator is recomputed over the received bytes and
    /// compared with the one in the header; a Message-Authenticator, when
    /// present, is verified as well.
    pub fn decode_response(
        data: &[u8],
        secret: &[u8],
        request_authenticator: &Authenticator,
    ) -> Result<Self, PacketError> {
        let packet = Self::decode(data)?;

        if !auth::verify_response_authenticator(data, request_authenticator, secret) {
            return Err(PacketError::AuthenticatorMismatch);
        }

        if let Some(index) = packet
            .attributes
            .iter()
            .position(|a| a.is(AttributeType::MessageAuthenticator))
        {
            let length = packet.attributes[index].value.len();
            if length != AUTHENTICATOR_LENGTH {
                return Err(PacketError::MalformedAttribute(format!(
                    "Message-Authenticator must be {} bytes, got {}",
                    AUTHENTICATOR_LENGTH, length
                )));
            }

            let offset = packet.value_offset(index);
            let mut scratch = data.to_vec();
            scratch[Self::AUTHENTICATOR_RANGE].copy_from_slice(request_authenticator);
            if !message_auth::verify_message_authenticator(&scratch, secret, offset) {
                return Err(PacketError::MessageAuthenticatorMismatch);
            }
        }

        Ok(packet)
    }

    /// Get the length of the encoded packet
    pub fn length(&self) -> usize {
        Self::MIN_PACKET_SIZE
            + self
                .attributes
                .iter()
                .map(Attribute::encoded_length)
                .sum::<usize>()
    }

    /// Find first attribute by type
    pub fn find_attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }

    /// Find all attributes by type
    pub fn find_all_attributes(&self, attr_type: u8) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.attr_type == attr_type)
            .collect()
    }

    /// Ensure a Message-Authenticator exists with a zeroed value; returns its index
    fn zero_message_authenticator(&mut self) -> Option<usize> {
        let index = self
            .attributes
            .iter()
            .position(|a| a.is(AttributeType::MessageAuthenticator))?;
        self.attributes[index].value = vec![0u8; AUTHENTICATOR_LENGTH];
        Some(index)
    }

    /// Byte offset of the value of the attribute at `index` in the encoded packet
    fn value_offset(&self, index: usize) -> usize {
        Self::MIN_PACKET_SIZE
            + self.attributes[..index]
                .iter()
                .map(Attribute::encoded_length)
                .sum::<usize>()
            + Attribute::MIN_LENGTH
    }
}
