//! MQTT 5.0 protocol core implementation
//!
//! This module provides the wire primitives, the property system, fixed
//! header framing and the packet codecs.

mod codec;
mod error;
mod header;
pub mod metrics;
mod packets;
mod permitted;
pub mod primitives;
mod property;
mod types;

pub use codec::{Packet, decode, encode, read_packet, write_packet};
pub use error::{Error, ErrorKind, Result};
pub use header::FixedHeader;
pub use packets::{
    Connack, Connect, Disconnect, Publish, RetainHandling, Suback, Subscribe,
    SubscriptionFilter, SubscriptionOptions, Will,
};
pub use permitted::{PacketPart, UNLIMITED, allowed};
pub use primitives::StringPair;
pub use property::{PayloadKind, Properties, Property, PropertyId, PropertyValue};
pub use types::{ConnectReason, DisconnectReason, PacketType, QoS, SubackReason};

/// Largest value a variable byte integer can carry (four 7-bit groups)
pub const MAX_VAR_INT: u32 = 268_435_455;

/// Largest length a two-byte length prefix can describe
pub const MAX_STRING_LEN: usize = 65_535;

/// Longest client identifier accepted in CONNECT, in bytes
pub const MAX_CLIENT_ID_LEN: usize = 23;

/// Protocol name carried in the CONNECT variable header
pub const PROTOCOL_NAME: &[u8; 4] = b"MQTT";

/// Protocol level for MQTT 5.0
pub const PROTOCOL_LEVEL: u8 = 5;
