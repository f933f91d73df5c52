use proptest::prelude::*;
use radius_proto::auth::pad_password;
use radius_proto::{
    Attribute, Code, Packet, PacketError, decode_attributes, decrypt_user_password,
    encode_attributes, encrypt_user_password,
};

const MESSAGE_AUTHENTICATOR: u8 = 80;

fn arb_attribute() -> impl Strategy<Value = Attribute> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..=253))
        .prop_map(|(attr_type, value)| Attribute::new(attr_type, value).unwrap())
}

/// Attributes that carry no signature of their own
fn arb_plain_attribute() -> impl Strategy<Value = Attribute> {
    arb_attribute().prop_filter("not a Message-Authenticator", |a| {
        a.attr_type != MESSAGE_AUTHENTICATOR
    })
}

fn arb_code() -> impl Strategy<Value = Code> {
    prop::sample::select(vec![
        Code::AccessRequest,
        Code::AccessAccept,
        Code::AccessReject,
        Code::AccountingRequest,
        Code::AccountingResponse,
        Code::AccessChallenge,
        Code::StatusServer,
        Code::StatusClient,
    ])
}

/// Any packet that fits in 4096 bytes
fn arb_packet(attribute: impl Strategy<Value = Attribute>) -> impl Strategy<Value = Packet> {
    (
        arb_code(),
        any::<u8>(),
        any::<[u8; 16]>(),
        prop::collection::vec(attribute, 0..=16),
    )
        .prop_map(|(code, identifier, authenticator, attributes)| Packet {
            code,
            identifier,
            authenticator,
            attributes,
        })
        .prop_filter("fits in one datagram", |p| {
            p.length() <= Packet::MAX_PACKET_SIZE
        })
}

proptest! {
    #[test]
    fn attribute_list_roundtrip(attributes in prop::collection::vec(arb_attribute(), 0..16)) {
        let encoded = encode_attributes(&attributes).unwrap();
        let decoded = decode_attributes(&encoded).unwrap();
        prop_assert_eq!(decoded, attributes);
    }

    #[test]
    fn packet_roundtrip(packet in arb_packet(arb_attribute())) {
        let encoded = packet.encode().unwrap();
        prop_assert_eq!(encoded.len(), packet.length());
        let decoded = Packet::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, packet);
    }

    #[test]
    fn password_hiding_roundtrip(
        password in prop::collection::vec(any::<u8>(), 0..=128),
        secret in prop::collection::vec(any::<u8>(), 1..64),
        authenticator in any::<[u8; 16]>(),
    ) {
        let hidden = encrypt_user_password(&password, &secret, &authenticator).unwrap();
        prop_assert_eq!(hidden.len() % 16, 0);
        let revealed = decrypt_user_password(&hidden, &secret, &authenticator).unwrap();
        prop_assert_eq!(revealed, pad_password(&password));
    }

    /// A length field that disagrees with the datagram never decodes
    #[test]
    fn mutated_length_field_is_rejected(
        packet in arb_packet(arb_attribute()),
        declared in any::<u16>(),
    ) {
        let mut encoded = packet.encode().unwrap();
        prop_assume!(declared as usize != encoded.len());
        encoded[2..4].copy_from_slice(&declared.to_be_bytes());

        let result = Packet::decode(&encoded);
        prop_assert!(
            matches!(
                result,
                Err(PacketError::LengthMismatch { .. }) | Err(PacketError::InvalidLength(_))
            ),
            "unexpected result: {:?}",
            result
        );
    }

    /// Any change to the Response Authenticator is detected
    #[test]
    fn flipped_authenticator_byte_is_rejected(
        packet in arb_packet(arb_plain_attribute()),
        request_authenticator in any::<[u8; 16]>(),
        secret in prop::collection::vec(any::<u8>(), 1..64),
        position in 4usize..20,
        mask in 1u8..=255,
    ) {
        let mut packet = packet;
        let mut encoded = packet.encode_response(&request_authenticator, &secret).unwrap();
        encoded[position] ^= mask;

        prop_assert_eq!(
            Packet::decode_response(&encoded, &secret, &request_authenticator),
            Err(PacketError::AuthenticatorMismatch)
        );
    }
}
