//! MQTT control packet types, QoS levels and reason codes

use std::fmt;

use super::{Error, Result};

/// MQTT control packet types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PacketType {
    /// Client request to connect to a server
    Connect = 1,
    /// Connect acknowledgment
    Connack = 2,
    /// Publish message
    Publish = 3,
    /// Publish acknowledgment (QoS 1)
    Puback = 4,
    /// Publish received (QoS 2 delivery part 1)
    Pubrec = 5,
    /// Publish release (QoS 2 delivery part 2)
    Pubrel = 6,
    /// Publish complete (QoS 2 delivery part 3)
    Pubcomp = 7,
    /// Subscribe request
    Subscribe = 8,
    /// Subscribe acknowledgment
    Suback = 9,
    /// Unsubscribe request
    Unsubscribe = 10,
    /// Unsubscribe acknowledgment
    Unsuback = 11,
    /// PING request
    Pingreq = 12,
    /// PING response
    Pingresp = 13,
    /// Disconnect notification
    Disconnect = 14,
    /// Authentication exchange
    Auth = 15,
}

impl PacketType {
    /// Convert from the high nibble of the first header byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Connect),
            2 => Some(Self::Connack),
            3 => Some(Self::Publish),
            4 => Some(Self::Puback),
            5 => Some(Self::Pubrec),
            6 => Some(Self::Pubrel),
            7 => Some(Self::Pubcomp),
            8 => Some(Self::Subscribe),
            9 => Some(Self::Suback),
            10 => Some(Self::Unsubscribe),
            11 => Some(Self::Unsuback),
            12 => Some(Self::Pingreq),
            13 => Some(Self::Pingresp),
            14 => Some(Self::Disconnect),
            15 => Some(Self::Auth),
            _ => None,
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case packet name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connack => "CONNACK",
            Self::Publish => "PUBLISH",
            Self::Puback => "PUBACK",
            Self::Pubrec => "PUBREC",
            Self::Pubrel => "PUBREL",
            Self::Pubcomp => "PUBCOMP",
            Self::Subscribe => "SUBSCRIBE",
            Self::Suback => "SUBACK",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Unsuback => "UNSUBACK",
            Self::Pingreq => "PINGREQ",
            Self::Pingresp => "PINGRESP",
            Self::Disconnect => "DISCONNECT",
            Self::Auth => "AUTH",
        }
    }

    /// Flags the fixed header must carry, or `None` when the flags carry data
    #[must_use]
    pub const fn required_flags(self) -> Option<u8> {
        match self {
            Self::Publish => None,
            Self::Pubrel | Self::Subscribe | Self::Unsubscribe => Some(0b0010),
            _ => Some(0),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quality of service level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum QoS {
    /// At most once delivery
    #[default]
    AtMostOnce = 0,
    /// At least once delivery
    AtLeastOnce = 1,
    /// Exactly once delivery
    ExactlyOnce = 2,
}

impl QoS {
    /// Convert from the two QoS bits; 3 is rejected
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(Error::InvalidQoS(other)),
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value)
    }
}

macro_rules! reason_codes {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$doc:meta])* $code:ident = $value:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u8);

        impl $name {
            $($(#[$doc])* pub const $code: Self = Self($value);)*

            /// Name of the reason code, if it is one the protocol defines
            #[must_use]
            pub const fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($code)),)*
                    _ => None,
                }
            }

            /// Reason codes of 0x80 and above indicate failure
            #[must_use]
            pub const fn is_error(self) -> bool {
                self.0 >= 0x80
            }

            /// Convert to byte
            #[must_use]
            pub const fn as_u8(self) -> u8 {
                self.0
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{name} ({:#04x})", self.0),
                    None => write!(f, "{:#04x}", self.0),
                }
            }
        }
    };
}

reason_codes! {
    /// CONNACK reason code
    ConnectReason {
        /// The connection is accepted
        SUCCESS = 0x00,
        /// The server does not wish to reveal the reason for the failure
        UNSPECIFIED_ERROR = 0x80,
        /// Data within the CONNECT packet could not be correctly parsed
        MALFORMED_PACKET = 0x81,
        /// Data in the CONNECT packet does not conform to the protocol
        PROTOCOL_ERROR = 0x82,
        /// The CONNECT is valid but is not accepted by this server
        IMPLEMENTATION_SPECIFIC_ERROR = 0x83,
        /// The server does not support the requested protocol version
        UNSUPPORTED_PROTOCOL_VERSION = 0x84,
        /// The client identifier is valid but not allowed
        CLIENT_IDENTIFIER_NOT_VALID = 0x85,
        /// The user name or password is not accepted
        BAD_USER_NAME_OR_PASSWORD = 0x86,
        /// The client is not authorized to connect
        NOT_AUTHORIZED = 0x87,
        /// The server is not available
        SERVER_UNAVAILABLE = 0x88,
        /// The server is busy
        SERVER_BUSY = 0x89,
        /// The client has been banned by administrative action
        BANNED = 0x8A,
        /// The authentication method is not supported
        BAD_AUTHENTICATION_METHOD = 0x8C,
        /// The will topic name is not accepted
        TOPIC_NAME_INVALID = 0x90,
        /// The CONNECT packet exceeded the maximum permissible size
        PACKET_TOO_LARGE = 0x95,
        /// An implementation or administrative limit has been exceeded
        QUOTA_EXCEEDED = 0x97,
        /// The will payload does not match the payload format indicator
        PAYLOAD_FORMAT_INVALID = 0x99,
        /// Retained messages are not supported
        RETAIN_NOT_SUPPORTED = 0x9A,
        /// The will QoS is not supported
        QOS_NOT_SUPPORTED = 0x9B,
        /// The client should temporarily use another server
        USE_ANOTHER_SERVER = 0x9C,
        /// The client should permanently use another server
        SERVER_MOVED = 0x9D,
        /// The connection rate limit has been exceeded
        CONNECTION_RATE_EXCEEDED = 0x9F,
    }
}

reason_codes! {
    /// DISCONNECT reason code
    DisconnectReason {
        /// Close the connection normally without sending the will message
        NORMAL_DISCONNECTION = 0x00,
        /// Disconnect and publish the will message
        DISCONNECT_WITH_WILL_MESSAGE = 0x04,
        /// Unspecified error
        UNSPECIFIED_ERROR = 0x80,
        /// The received packet does not conform to the protocol
        MALFORMED_PACKET = 0x81,
        /// An unexpected or out of order packet was received
        PROTOCOL_ERROR = 0x82,
        /// The packet is valid but cannot be processed by this implementation
        IMPLEMENTATION_SPECIFIC_ERROR = 0x83,
        /// The request is not authorized
        NOT_AUTHORIZED = 0x87,
        /// The server is busy
        SERVER_BUSY = 0x89,
        /// The server is shutting down
        SERVER_SHUTTING_DOWN = 0x8B,
        /// No packet received for 1.5 times the keep alive time
        KEEP_ALIVE_TIMEOUT = 0x8D,
        /// Another connection using the same client id has connected
        SESSION_TAKEN_OVER = 0x8E,
        /// The topic filter is well formed but not accepted
        TOPIC_FILTER_INVALID = 0x8F,
        /// The topic name is well formed but not accepted
        TOPIC_NAME_INVALID = 0x90,
        /// More publications in flight than receive maximum allows
        RECEIVE_MAXIMUM_EXCEEDED = 0x93,
        /// Topic alias greater than the announced maximum
        TOPIC_ALIAS_INVALID = 0x94,
        /// The packet exceeds the maximum packet size
        PACKET_TOO_LARGE = 0x95,
        /// The received data rate is too high
        MESSAGE_RATE_TOO_HIGH = 0x96,
        /// An implementation or administrative limit has been exceeded
        QUOTA_EXCEEDED = 0x97,
        /// Closed due to an administrative action
        ADMINISTRATIVE_ACTION = 0x98,
        /// The payload does not match the payload format indicator
        PAYLOAD_FORMAT_INVALID = 0x99,
        /// Retained messages are not supported
        RETAIN_NOT_SUPPORTED = 0x9A,
        /// QoS greater than the announced maximum QoS
        QOS_NOT_SUPPORTED = 0x9B,
        /// The client should temporarily change its server
        USE_ANOTHER_SERVER = 0x9C,
        /// The server has moved permanently
        SERVER_MOVED = 0x9D,
        /// Shared subscriptions are not supported
        SHARED_SUBSCRIPTIONS_NOT_SUPPORTED = 0x9E,
        /// The connection rate is too high
        CONNECTION_RATE_EXCEEDED = 0x9F,
        /// The maximum connection time has been exceeded
        MAXIMUM_CONNECT_TIME = 0xA0,
        /// Subscription identifiers are not supported
        SUBSCRIPTION_IDENTIFIERS_NOT_SUPPORTED = 0xA1,
        /// Wildcard subscriptions are not supported
        WILDCARD_SUBSCRIPTIONS_NOT_SUPPORTED = 0xA2,
    }
}

reason_codes! {
    /// SUBACK reason code, one per requested topic filter
    SubackReason {
        /// Subscription accepted with maximum QoS 0
        GRANTED_QOS_0 = 0x00,
        /// Subscription accepted with maximum QoS 1
        GRANTED_QOS_1 = 0x01,
        /// Subscription accepted with maximum QoS 2
        GRANTED_QOS_2 = 0x02,
        /// Subscription not accepted, reason not revealed
        UNSPECIFIED_ERROR = 0x80,
        /// The SUBSCRIBE is valid but the server does not accept it
        IMPLEMENTATION_SPECIFIC_ERROR = 0x83,
        /// The client is not authorized to make this subscription
        NOT_AUTHORIZED = 0x87,
        /// The topic filter is well formed but not allowed
        TOPIC_FILTER_INVALID = 0x8F,
        /// The packet identifier is already in use
        PACKET_IDENTIFIER_IN_USE = 0x91,
        /// An implementation or administrative limit has been exceeded
        QUOTA_EXCEEDED = 0x97,
        /// Shared subscriptions are not supported
        SHARED_SUBSCRIPTIONS_NOT_SUPPORTED = 0x9E,
        /// Subscription identifiers are not supported
        SUBSCRIPTION_IDENTIFIERS_NOT_SUPPORTED = 0xA1,
        /// Wildcard subscriptions are not supported
        WILDCARD_SUBSCRIPTIONS_NOT_SUPPORTED = 0xA2,
    }
}

impl Default for DisconnectReason {
    fn default() -> Self {
        Self::NORMAL_DISCONNECTION
    }
}

impl Default for ConnectReason {
    fn default() -> Self {
        Self::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_roundtrip() {
        for value in 1..=15 {
            let packet_type = PacketType::from_u8(value).unwrap();
            assert_eq!(packet_type.as_u8(), value);
        }
        assert_eq!(PacketType::from_u8(0), None);
        assert_eq!(PacketType::from_u8(16), None);
    }

    #[test]
    fn test_required_flags() {
        assert_eq!(PacketType::Connect.required_flags(), Some(0));
        assert_eq!(PacketType::Subscribe.required_flags(), Some(2));
        assert_eq!(PacketType::Publish.required_flags(), None);
    }

    #[test]
    fn test_qos() {
        assert_eq!(QoS::from_u8(2).unwrap(), QoS::ExactlyOnce);
        assert!(matches!(QoS::from_u8(3), Err(Error::InvalidQoS(3))));
        assert_eq!(QoS::AtLeastOnce.as_u8(), 1);
    }

    #[test]
    fn test_reason_code_names() {
        assert_eq!(ConnectReason::SUCCESS.name(), Some("SUCCESS"));
        assert_eq!(DisconnectReason(0xA2).name(), Some("WILDCARD_SUBSCRIPTIONS_NOT_SUPPORTED"));
        assert_eq!(SubackReason(0x42).name(), None);
        assert!(SubackReason::QUOTA_EXCEEDED.is_error());
        assert!(!SubackReason::GRANTED_QOS_2.is_error());
        assert_eq!(DisconnectReason::default(), DisconnectReason::NORMAL_DISCONNECTION);
        assert_eq!(ConnectReason::BANNED.to_string(), "BANNED (0x8a)");
    }
}
