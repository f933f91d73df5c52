//! Message-Authenticator Support (RFC 3579 Section 3.2)
//!
//! HMAC-MD5 keyed with the shared secret, computed over the whole packet with
//! the Message-Authenticator value zeroed. For requests the header carries the
//! Request Authenticator; for responses it carries the Request Authenticator of
//! the request being answered, not the Response Authenticator.
//!
//! Status-Server requests must carry one (RFC 5997); clients may add one to
//! every Access-Request.

use crate::auth::{AUTHENTICATOR_LENGTH, constant_time_eq};
use hmac::{Hmac, Mac};
use md5_digest::Md5;

type HmacMd5 = Hmac<Md5>;

/// Calculate Message-Authenticator over `packet_bytes`
///
/// The caller is responsible for zeroing the Message-Authenticator value
/// inside `packet_bytes` before calling.
pub fn calculate_message_authenticator(packet_bytes: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(packet_bytes);

    let mut output = [0u8; 16];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// Verify the Message-Authenticator whose value starts at `message_auth_offset`
pub fn verify_message_authenticator(
    packet_bytes: &[u8],
    secret: &[u8],
    message_auth_offset: usize,
) -> bool {
    let end = message_auth_offset + AUTHENTICATOR_LENGTH;
    if end > packet_bytes.len() {
        return false;
    }

    let mut packet_copy = packet_bytes.to_vec();
    packet_copy[message_auth_offset..end].fill(0);

    let expected = calculate_message_authenticator(&packet_copy, secret);
    constant_time_eq(&packet_bytes[message_auth_offset..end], &expected)
}
