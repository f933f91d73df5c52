//! CHAP (Challenge-Handshake Authentication Protocol) Support
//!
//! CHAP-Password as defined in RFC 2865 Section 5.3. The client hashes the
//! password with a challenge instead of sending it hidden; the challenge is
//! the Request Authenticator unless a CHAP-Challenge attribute is sent.

/// CHAP response structure
///
/// A CHAP response consists of:
/// - CHAP Identifier (1 byte)
/// - CHAP Response (16 bytes MD5 hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapResponse {
    /// CHAP identifier (must match the challenge)
    pub ident: u8,
    /// MD5 hash of (ident + password + challenge)
    pub response: [u8; 16],
}

impl ChapResponse {
    pub const LENGTH: usize = 17;

    /// Compute the response for `password` against `challenge`
    pub fn compute(ident: u8, password: &str, challenge: &ChapChallenge) -> Self {
        ChapResponse {
            ident,
            response: compute_chap_response(ident, password, challenge.as_bytes()),
        }
    }

    /// Parse a CHAP-Password attribute value (exactly 17 bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChapError> {
        if bytes.len() != Self::LENGTH {
            return Err(ChapError::InvalidLength(bytes.len()));
        }

        let mut response = [0u8; 16];
        response.copy_from_slice(&bytes[1..]);

        Ok(ChapResponse {
            ident: bytes[0],
            response,
        })
    }

    /// Wire form for the CHAP-Password attribute
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        bytes.push(self.ident);
        bytes.extend_from_slice(&self.response);
        bytes
    }
}

/// CHAP challenge
///
/// Per RFC 2865 Section 5.3: If the CHAP-Challenge attribute is present,
/// it is used. Otherwise, the Request Authenticator is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapChallenge {
    pub challenge: Vec<u8>,
}

impl ChapChallenge {
    pub fn new(challenge: Vec<u8>) -> Self {
        ChapChallenge { challenge }
    }

    pub fn from_authenticator(authenticator: &[u8; 16]) -> Self {
        ChapChallenge {
            challenge: authenticator.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.challenge
    }
}

/// MD5(CHAP_Identifier + Password + Challenge)
pub fn compute_chap_response(ident: u8, password: &str, challenge: &[u8]) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume([ident]);
    context.consume(password.as_bytes());
    context.consume(challenge);
    context.compute().0
}

/// Check a received CHAP response against the known password
pub fn verify_chap_response(
    chap_response: &ChapResponse,
    password: &str,
    challenge: &ChapChallenge,
) -> bool {
    let expected = compute_chap_response(chap_response.ident, password, challenge.as_bytes());
    crate::auth::constant_time_eq(&chap_response.response, &expected)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChapError {
    #[error("Invalid CHAP-Password length: expected 17 bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chap_response_bytes() {
        let response = ChapResponse {
            ident: 9,
            response: [0xaa; 16],
        };
        let bytes = response.to_bytes();
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], 9);
        assert_eq!(ChapResponse::from_bytes(&bytes).unwrap(), response);
    }

    #[test]
    fn test_chap_response_invalid_length() {
        assert_eq!(
            ChapResponse::from_bytes(&[0u8; 16]),
            Err(ChapError::InvalidLength(16))
        );
    }

    #[test]
    fn test_compute_matches_manual_md5() {
        let challenge = ChapChallenge::from_authenticator(&[3u8; 16]);
        let response = ChapResponse::compute(5, "qooguevara", &challenge);

        let mut input = vec![5u8];
        input.extend_from_slice(b"qooguevara");
        input.extend_from_slice(&[3u8; 16]);
        assert_eq!(response.response, md5::compute(&input).0);
    }

    #[test]
    fn test_verify_chap_response() {
        let challenge = ChapChallenge::new(b"0123456789abcdef".to_vec());
        let response = ChapResponse::compute(1, "secret", &challenge);

        assert!(verify_chap_response(&response, "secret", &challenge));
        assert!(!verify_chap_response(&response, "Secret", &challenge));
        assert!(!verify_chap_response(
            &response,
            "secret",
            &ChapChallenge::new(b"fedcba9876543210".to_vec())
        ));
    }
}
