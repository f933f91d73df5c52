//! Authenticators and PAP password hiding (RFC 2865 Sections 3 and 5.2)

use crate::packet::{Packet, PacketError};
use rand::RngCore;

/// Size of the Request/Response Authenticator field
pub const AUTHENTICATOR_LENGTH: usize = 16;

/// Longest User-Password RFC 2865 allows before hiding
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// A 16-byte Request or Response Authenticator
pub type Authenticator = [u8; AUTHENTICATOR_LENGTH];

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
pub fn generate_request_authenticator() -> Authenticator {
    generate_request_authenticator_with(&mut rand::rng())
}

/// Generate a Request Authenticator from a caller-supplied random source
pub fn generate_request_authenticator_with<R: RngCore + ?Sized>(rng: &mut R) -> Authenticator {
    let mut authenticator = [0u8; AUTHENTICATOR_LENGTH];
    rng.fill_bytes(&mut authenticator);
    authenticator
}

/// Response Authenticator over already-encoded packet bytes
///
/// `MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)`;
/// whatever sits in the authenticator field of `encoded` is ignored.
pub(crate) fn response_authenticator_for_bytes(
    encoded: &[u8],
    request_authenticator: &Authenticator,
    secret: &[u8],
) -> Authenticator {
    let mut context = md5::Context::new();
    context.consume(&encoded[..4]);
    context.consume(request_authenticator);
    context.consume(&encoded[Packet::MIN_PACKET_SIZE..]);
    context.consume(secret);
    context.compute().0
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// This is used for Access-Accept, Access-Reject, and Access-Challenge packets.
pub fn calculate_response_authenticator(
    packet: &Packet,
    request_authenticator: &Authenticator,
    secret: &[u8],
) -> Result<Authenticator, PacketError> {
    let encoded = packet.encode()?;
    Ok(response_authenticator_for_bytes(
        &encoded,
        request_authenticator,
        secret,
    ))
}

/// Verify the Response Authenticator of a received datagram
///
/// Works on the raw bytes so that attribute order and encoding are exactly
/// what the server hashed. Datagrams shorter than a header never verify.
pub fn verify_response_authenticator(
    response: &[u8],
    request_authenticator: &Authenticator,
    secret: &[u8],
) -> bool {
    if response.len() < Packet::MIN_PACKET_SIZE {
        return false;
    }
    let calculated = response_authenticator_for_bytes(response, request_authenticator, secret);
    constant_time_eq(&response[4..Packet::MIN_PACKET_SIZE], &calculated)
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Pad a password with zero bytes to a multiple of 16 (at least one block)
pub fn pad_password(password: &[u8]) -> Vec<u8> {
    let blocks = password.len().div_ceil(AUTHENTICATOR_LENGTH).max(1);
    let mut padded = password.to_vec();
    padded.resize(blocks * AUTHENTICATOR_LENGTH, 0);
    padded
}

/// XOR each 16-byte block with `MD5(secret + previous)`, where `previous`
/// starts as the authenticator and then follows the ciphertext chain.
fn pap_transform(input: &[u8], secret: &[u8], authenticator: &Authenticator, hiding: bool) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut previous: Authenticator = *authenticator;

    for chunk in input.chunks(AUTHENTICATOR_LENGTH) {
        let mut context = md5::Context::new();
        context.consume(secret);
        context.consume(previous);
        let pad = context.compute().0;

        let mut block = [0u8; AUTHENTICATOR_LENGTH];
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = chunk[i] ^ pad[i];
        }

        // The chain always runs on ciphertext
        previous = if hiding {
            block
        } else {
            let mut cipher = [0u8; AUTHENTICATOR_LENGTH];
            cipher.copy_from_slice(chunk);
            cipher
        };
        output.extend_from_slice(&block);
    }

    output
}

/// Hide a User-Password per RFC 2865 Section 5.2
///
/// The password is first padded to a multiple of 16 bytes, then XORed with
/// MD5(secret + request_authenticator) for the first 16 bytes, and
/// MD5(secret + previous_block) for subsequent blocks.
pub fn encrypt_user_password(
    password: impl AsRef<[u8]>,
    secret: &[u8],
    authenticator: &Authenticator,
) -> Result<Vec<u8>, PacketError> {
    let password = password.as_ref();
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PacketError::PasswordTooLong(password.len()));
    }
    Ok(pap_transform(&pad_password(password), secret, authenticator, true))
}

/// Reverse [`encrypt_user_password`], returning the padded plaintext
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &Authenticator,
) -> Result<Vec<u8>, PacketError> {
    if encrypted.is_empty() || encrypted.len() % AUTHENTICATOR_LENGTH != 0 {
        return Err(PacketError::MalformedAttribute(format!(
            "hidden User-Password must be a non-zero multiple of 16 bytes, got {}",
            encrypted.len()
        )));
    }
    if encrypted.len() > MAX_PASSWORD_LENGTH {
        return Err(PacketError::PasswordTooLong(encrypted.len()));
    }
    Ok(pap_transform(encrypted, secret, authenticator, false))
}

/// Reverse [`encrypt_user_password`] and strip the zero padding
pub fn decrypt_user_password_string(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &Authenticator,
) -> Result<String, PacketError> {
    let mut plain = decrypt_user_password(encrypted, secret, authenticator)?;
    while plain.last() == Some(&0) {
        plain.pop();
    }
    String::from_utf8(plain)
        .map_err(|e| PacketError::MalformedAttribute(format!("User-Password is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use crate::packet::Code;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Fixed authenticator used as a known-answer vector
    const DEMO_AUTH: Authenticator = [
        0x34, 0x65, 0xa0, 0x8e, 0x9e, 0x7a, 0x9c, 0xb1, 0x50, 0x42, 0x25, 0x28, 0xb0, 0x83, 0x40,
        0x86,
    ];

    #[test]
    fn test_generate_authenticator() {
        let auth1 = generate_request_authenticator();
        let auth2 = generate_request_authenticator();
        assert_ne!(auth1, auth2);
    }

    #[test]
    fn test_seeded_authenticator_is_deterministic() {
        let a = generate_request_authenticator_with(&mut StdRng::seed_from_u64(7));
        let b = generate_request_authenticator_with(&mut StdRng::seed_from_u64(7));
        let c = generate_request_authenticator_with(&mut StdRng::seed_from_u64(8));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_first_block_matches_rfc_formula() {
        let secret = b"10testing";
        let hidden = encrypt_user_password("qooguevara", secret, &DEMO_AUTH).unwrap();

        let mut input = secret.to_vec();
        input.extend_from_slice(&DEMO_AUTH);
        let pad = md5::compute(&input).0;
        let padded = pad_password(b"qooguevara");

        let expected: Vec<u8> = padded.iter().zip(pad.iter()).map(|(p, b)| p ^ b).collect();
        assert_eq!(hidden, expected);
    }

    #[test]
    fn test_second_block_chains_on_ciphertext() {
        let secret = b"sharedsecret";
        let password = "a-password-longer-than-sixteen-bytes";
        let hidden = encrypt_user_password(password, secret, &DEMO_AUTH).unwrap();
        assert_eq!(hidden.len(), 48);

        let mut input = secret.to_vec();
        input.extend_from_slice(&hidden[..16]);
        let pad = md5::compute(&input).0;
        let padded = pad_password(password.as_bytes());
        for i in 0..16 {
            assert_eq!(hidden[16 + i], padded[16 + i] ^ pad[i]);
        }
    }

    #[test]
    fn test_password_hide_reveal() {
        let secret = b"sharedsecret";
        let authenticator = [1u8; 16];

        for password in ["", "x", "mysecretpassword", "seventeen bytes!!", "qooguevara"] {
            let hidden = encrypt_user_password(password, secret, &authenticator).unwrap();
            let revealed = decrypt_user_password(&hidden, secret, &authenticator).unwrap();
            assert_eq!(revealed, pad_password(password.as_bytes()));

            let text = decrypt_user_password_string(&hidden, secret, &authenticator).unwrap();
            assert_eq!(text, password);
        }
    }

    #[test]
    fn test_padding() {
        assert_eq!(pad_password(b"").len(), 16);
        assert_eq!(pad_password(&[1u8; 16]).len(), 16);
        assert_eq!(pad_password(&[1u8; 17]).len(), 32);
        assert_eq!(&pad_password(b"abc")[3..], &[0u8; 13]);
    }

    #[test]
    fn test_password_length_limits() {
        let auth = [0u8; 16];
        assert_eq!(encrypt_user_password([b'p'; 128], b"s", &auth).unwrap().len(), 128);
        assert_eq!(
            encrypt_user_password([b'p'; 129], b"s", &auth),
            Err(PacketError::PasswordTooLong(129))
        );
        assert!(decrypt_user_password(&[0u8; 15], b"s", &auth).is_err());
        assert!(decrypt_user_password(&[], b"s", &auth).is_err());
    }

    #[test]
    fn test_wrong_secret_reveals_garbage() {
        let hidden = encrypt_user_password("qooguevara", b"10testing", &DEMO_AUTH).unwrap();
        let revealed = decrypt_user_password(&hidden, b"10testinG", &DEMO_AUTH).unwrap();
        assert_ne!(revealed, pad_password(b"qooguevara"));
    }

    #[test]
    fn test_response_authenticator() {
        let secret = b"sharedsecret";
        let request_auth = [1u8; 16];
        let mut packet = Packet::new(Code::AccessAccept, 42, [0u8; 16]);
        packet.add_attribute(Attribute::string(18, "ok").unwrap());

        let response_auth =
            calculate_response_authenticator(&packet, &request_auth, secret).unwrap();
        packet.authenticator = response_auth;
        let encoded = packet.encode().unwrap();

        assert!(verify_response_authenticator(&encoded, &request_auth, secret));
        assert!(!verify_response_authenticator(&encoded, &[2u8; 16], secret));
        assert!(!verify_response_authenticator(&encoded[..19], &request_auth, secret));
    }
}
