use super::AttributeType;
use crate::packet::PacketError;
use std::net::Ipv4Addr;

/// RADIUS Attribute structure as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute type (1 byte)
    pub attr_type: u8,
    /// Attribute value (0-253 bytes)
    pub value: Vec<u8>,
}

impl Attribute {
    /// Minimum attribute length (type + length fields = 2 bytes)
    pub const MIN_LENGTH: usize = 2;
    /// Maximum attribute length (255 bytes including type and length)
    pub const MAX_LENGTH: usize = 255;
    /// Maximum value length (253 bytes)
    pub const MAX_VALUE_LENGTH: usize = 253;

    pub fn new(attr_type: u8, value: Vec<u8>) -> Result<Self, PacketError> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(PacketError::AttributeTooLong {
                attr_type,
                length: value.len(),
            });
        }
        Ok(Attribute { attr_type, value })
    }

    /// Create a string attribute
    pub fn string(attr_type: u8, value: impl Into<String>) -> Result<Self, PacketError> {
        Self::new(attr_type, value.into().into_bytes())
    }

    /// Create an integer attribute (32-bit big-endian)
    pub fn integer(attr_type: u8, value: u32) -> Result<Self, PacketError> {
        Self::new(attr_type, value.to_be_bytes().to_vec())
    }

    /// Create an IPv4 address attribute
    pub fn ipv4(attr_type: u8, value: Ipv4Addr) -> Result<Self, PacketError> {
        Self::new(attr_type, value.octets().to_vec())
    }

    /// Symbolic type, if this is a known RFC 2865 attribute
    pub fn known_type(&self) -> Option<AttributeType> {
        AttributeType::from_u8(self.attr_type)
    }

    pub fn is(&self, attr_type: AttributeType) -> bool {
        self.attr_type == attr_type.as_u8()
    }

    /// Encode attribute to bytes
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let mut buffer = Vec::with_capacity(self.encoded_length());
        self.encode_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Append the wire form of this attribute to `buffer`
    ///
    /// The value is checked again here because `value` is a public field
    /// and may have been grown after construction.
    pub fn encode_into(&self, buffer: &mut Vec<u8>) -> Result<(), PacketError> {
        if self.value.len() > Self::MAX_VALUE_LENGTH {
            return Err(PacketError::AttributeTooLong {
                attr_type: self.attr_type,
                length: self.value.len(),
            });
        }

        buffer.push(self.attr_type);
        buffer.push(self.encoded_length() as u8);
        buffer.extend_from_slice(&self.value);
        Ok(())
    }

    /// Decode a single attribute from the start of `data`
    ///
    /// Trailing bytes after the attribute are left for the caller; use
    /// [`Attribute::encoded_length`] to advance.
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::MIN_LENGTH {
            return Err(PacketError::MalformedAttribute(format!(
                "attribute header truncated: {} bytes",
                data.len()
            )));
        }

        let attr_type = data[0];
        let length = data[1] as usize;

        if length < Self::MIN_LENGTH {
            return Err(PacketError::MalformedAttribute(format!(
                "attribute {} declares length {}",
                attr_type, length
            )));
        }

        if data.len() < length {
            return Err(PacketError::MalformedAttribute(format!(
                "attribute {} declares length {} but only {} bytes remain",
                attr_type,
                length,
                data.len()
            )));
        }

        Ok(Attribute {
            attr_type,
            value: data[Self::MIN_LENGTH..length].to_vec(),
        })
    }

    /// Get the encoded length of this attribute
    pub fn encoded_length(&self) -> usize {
        Self::MIN_LENGTH + self.value.len()
    }

    /// Try to interpret value as a string
    pub fn as_string(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.value.clone())
    }

    /// Try to interpret value as an integer (32-bit big-endian)
    pub fn as_integer(&self) -> Result<u32, PacketError> {
        let bytes: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            PacketError::MalformedAttribute(format!(
                "expected 4 bytes for integer attribute {}, got {}",
                self.attr_type,
                self.value.len()
            ))
        })?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Try to interpret value as an IPv4 address
    pub fn as_ipv4(&self) -> Result<Ipv4Addr, PacketError> {
        let octets: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            PacketError::MalformedAttribute(format!(
                "expected 4 bytes for address attribute {}, got {}",
                self.attr_type,
                self.value.len()
            ))
        })?;
        Ok(Ipv4Addr::from(octets))
    }
}

/// Encode a list of attributes back to back, preserving order
pub fn encode_attributes(attributes: &[Attribute]) -> Result<Vec<u8>, PacketError> {
    let capacity = attributes.iter().map(Attribute::encoded_length).sum();
    let mut buffer = Vec::with_capacity(capacity);
    for attr in attributes {
        attr.encode_into(&mut buffer)?;
    }
    Ok(buffer)
}

/// Decode consecutive attributes until `data` is exhausted
pub fn decode_attributes(mut data: &[u8]) -> Result<Vec<Attribute>, PacketError> {
    let mut attributes = Vec::new();
    while !data.is_empty() {
        let attr = Attribute::decode(data)?;
        data = &data[attr.encoded_length()..];
        attributes.push(attr);
    }
    Ok(attributes)
}
