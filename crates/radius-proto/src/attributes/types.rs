use std::fmt;

macro_rules! attribute_types {
    ($($(#[$meta:meta])* $variant:ident = $value:literal => $name:literal,)+) => {
        /// RADIUS Attribute Types used by an authenticating client
        ///
        /// Covers the RFC 2865 attribute space plus Message-Authenticator
        /// (RFC 3579). Values outside this list still decode as raw
        /// [`Attribute`](super::Attribute)s; they simply have no symbolic name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum AttributeType {
            $($(#[$meta])* $variant = $value,)+
        }

        impl AttributeType {
            pub fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(AttributeType::$variant),)+
                    _ => None,
                }
            }

            /// Dictionary name, e.g. `User-Name`
            pub fn name(self) -> &'static str {
                match self {
                    $(AttributeType::$variant => $name,)+
                }
            }
        }
    };
}

attribute_types! {
    UserName = 1 => "User-Name",
    /// Hidden with the PAP algorithm, see [`crate::auth::encrypt_user_password`]
    UserPassword = 2 => "User-Password",
    ChapPassword = 3 => "CHAP-Password",
    NasIpAddress = 4 => "NAS-IP-Address",
    NasPort = 5 => "NAS-Port",
    ServiceType = 6 => "Service-Type",
    FramedProtocol = 7 => "Framed-Protocol",
    FramedIpAddress = 8 => "Framed-IP-Address",
    FramedIpNetmask = 9 => "Framed-IP-Netmask",
    FramedRouting = 10 => "Framed-Routing",
    FilterId = 11 => "Filter-Id",
    FramedMtu = 12 => "Framed-MTU",
    FramedCompression = 13 => "Framed-Compression",
    LoginIpHost = 14 => "Login-IP-Host",
    LoginService = 15 => "Login-Service",
    LoginTcpPort = 16 => "Login-TCP-Port",
    ReplyMessage = 18 => "Reply-Message",
    CallbackNumber = 19 => "Callback-Number",
    CallbackId = 20 => "Callback-Id",
    FramedRoute = 22 => "Framed-Route",
    FramedIpxNetwork = 23 => "Framed-IPX-Network",
    /// Opaque value echoed back to the server when answering an Access-Challenge
    State = 24 => "State",
    Class = 25 => "Class",
    VendorSpecific = 26 => "Vendor-Specific",
    SessionTimeout = 27 => "Session-Timeout",
    IdleTimeout = 28 => "Idle-Timeout",
    TerminationAction = 29 => "Termination-Action",
    CalledStationId = 30 => "Called-Station-Id",
    CallingStationId = 31 => "Calling-Station-Id",
    NasIdentifier = 32 => "NAS-Identifier",
    ProxyState = 33 => "Proxy-State",
    LoginLatService = 34 => "Login-LAT-Service",
    LoginLatNode = 35 => "Login-LAT-Node",
    LoginLatGroup = 36 => "Login-LAT-Group",
    FramedAppleTalkLink = 37 => "Framed-AppleTalk-Link",
    FramedAppleTalkNetwork = 38 => "Framed-AppleTalk-Network",
    FramedAppleTalkZone = 39 => "Framed-AppleTalk-Zone",
    ChapChallenge = 60 => "CHAP-Challenge",
    NasPortType = 61 => "NAS-Port-Type",
    PortLimit = 62 => "Port-Limit",
    LoginLatPort = 63 => "Login-LAT-Port",
    /// HMAC-MD5 over the whole packet (RFC 3579 Section 3.2)
    MessageAuthenticator = 80 => "Message-Authenticator",
}

impl AttributeType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<AttributeType> for u8 {
    fn from(value: AttributeType) -> Self {
        value as u8
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_value() {
        assert_eq!(AttributeType::from_u8(1), Some(AttributeType::UserName));
        assert_eq!(AttributeType::from_u8(80), Some(AttributeType::MessageAuthenticator));
        assert_eq!(AttributeType::from_u8(17), None);
        assert_eq!(AttributeType::from_u8(255), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(AttributeType::UserPassword.name(), "User-Password");
        assert_eq!(AttributeType::State.to_string(), "State");
        assert_eq!(u8::from(AttributeType::ReplyMessage), 18);
    }
}
