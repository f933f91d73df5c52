//! RADIUS Protocol Codec
//!
//! This crate implements the client-facing half of the RADIUS protocol
//! as defined in RFC 2865, with the Message-Authenticator extension from
//! RFC 3579 and the Status-Server probe from RFC 5997.
//!
//! # Features
//!
//! - Packet encoding and strict decoding (length field must match the datagram)
//! - Attribute-value pair (AVP) serialization
//! - PAP User-Password hiding (MD5 block chaining)
//! - Request and Response Authenticator calculation and verification
//! - CHAP-Password computation
//! - HMAC-MD5 Message-Authenticator
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Packet, Code, Attribute, AttributeType};
//! use radius_proto::auth::{generate_request_authenticator, encrypt_user_password};
//!
//! let req_auth = generate_request_authenticator();
//! let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);
//!
//! packet.add_attribute(
//!     Attribute::string(AttributeType::UserName.as_u8(), "alice").unwrap()
//! );
//!
//! let hidden = encrypt_user_password("password", b"secret", &req_auth).unwrap();
//! packet.add_attribute(
//!     Attribute::new(AttributeType::UserPassword.as_u8(), hidden).unwrap()
//! );
//!
//! let bytes = packet.encode().unwrap();
//! assert_eq!(bytes.len(), packet.length());
//! ```

pub mod attributes;
pub mod auth;
pub mod chap;
pub mod message_auth;
pub mod packet;

pub use attributes::{Attribute, AttributeType, decode_attributes, encode_attributes};
pub use auth::{
    AUTHENTICATOR_LENGTH, Authenticator, calculate_response_authenticator,
    decrypt_user_password, decrypt_user_password_string, encrypt_user_password,
    generate_request_authenticator, generate_request_authenticator_with,
    verify_response_authenticator,
};
pub use chap::{ChapChallenge, ChapError, ChapResponse, compute_chap_response, verify_chap_response};
pub use message_auth::{calculate_message_authenticator, verify_message_authenticator};
pub use packet::{Code, Packet, PacketError};
