//! MQTT 5.0 control packet codec
//!
//! This library turns in-memory MQTT 5.0 control packets into the exact byte
//! stream the protocol specifies and parses byte streams back into packets,
//! rejecting anything that violates the wire format.
//!
//! # Quick Start
//!
//! ```rust
//! use mqtt5::{Connect, Packet, Properties, Property, PropertyId, PropertyValue};
//!
//! let mut properties = Properties::new();
//! properties.push(Property::new(
//!     PropertyId::SessionExpiryInterval,
//!     PropertyValue::UInt32(10),
//! )?);
//!
//! let connect = Connect {
//!     clean_start: true,
//!     keep_alive: 10,
//!     properties,
//!     ..Connect::default()
//! };
//!
//! let mut bytes = mqtt5::encode(&Packet::Connect(connect.clone()))?;
//! let decoded = mqtt5::decode(&mut bytes)?;
//! assert_eq!(decoded, Packet::Connect(connect));
//! # Ok::<(), mqtt5::Error>(())
//! ```
//!
//! # Supported packets
//!
//! - **CONNECT / CONNACK** - session establishment, including will messages
//! - **PUBLISH** - application messages
//! - **SUBSCRIBE / SUBACK** - subscription requests and acknowledgements
//! - **DISCONNECT** - including the zero/one byte short forms
//!
//! All other packet types are recognised in the fixed header and reported as
//! [`Error::UnsupportedPacketType`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod protocol;
pub mod topic;

pub use protocol::{
    Connack, Connect, ConnectReason, Disconnect, DisconnectReason, Error, ErrorKind,
    FixedHeader, MAX_CLIENT_ID_LEN, MAX_STRING_LEN, MAX_VAR_INT, Packet, PacketPart,
    PacketType, PayloadKind, Properties, Property, PropertyId, PropertyValue, Publish, QoS,
    Result, RetainHandling, StringPair, Suback, SubackReason, Subscribe, SubscriptionFilter,
    SubscriptionOptions, UNLIMITED, Will, allowed, decode, encode, read_packet, write_packet,
};
pub use topic::Topic;

/// MQTT protocol version implemented by this crate
pub const VERSION: &str = "5.0";

/// Default MQTT port (unencrypted)
pub const DEFAULT_PORT: u16 = 1883;
