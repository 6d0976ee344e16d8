//! SUBSCRIBE packet

use bytes::{BufMut, Bytes, BytesMut};

use super::debug_assert_written;
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::{
    read_string, read_u8, read_u16, string_size, write_string, write_u16,
};
use crate::protocol::{Error, FixedHeader, PacketType, Properties, QoS, Result};

const MAX_QOS_MASK: u8 = 0b11;
const NO_LOCAL: u8 = 1 << 2;
const RETAIN_AS_PUBLISHED: u8 = 1 << 3;
const RETAIN_HANDLING_SHIFT: u8 = 4;
const RESERVED_MASK: u8 = 0b1100_0000;

/// When retained messages are sent for a new subscription
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RetainHandling {
    /// Send retained messages at the time of the subscribe
    #[default]
    SendAtSubscribe = 0,
    /// Send retained messages only if the subscription does not already exist
    SendIfNew = 1,
    /// Do not send retained messages
    DoNotSend = 2,
}

impl RetainHandling {
    /// Convert from the two option bits
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::SendAtSubscribe),
            1 => Ok(Self::SendIfNew),
            2 => Ok(Self::DoNotSend),
            other => Err(Error::InvalidRetainHandling(other)),
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Options byte following each topic filter
///
/// ```text
///  7   6   5   4   3   2   1   0
/// +---+---+---+---+---+---+---+---+
/// | reserved | RH    |RAP|NL |  QoS  |
/// +---+---+---+---+---+---+---+---+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionOptions {
    /// Maximum QoS the server may deliver with
    pub max_qos: QoS,
    /// Do not forward messages published by this client
    pub no_local: bool,
    /// Keep the retain flag when forwarding
    pub retain_as_published: bool,
    /// Retained message behaviour
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    /// Pack into the options byte
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        let mut byte = self.max_qos.as_u8();
        if self.no_local {
            byte |= NO_LOCAL;
        }
        if self.retain_as_published {
            byte |= RETAIN_AS_PUBLISHED;
        }
        byte | self.retain_handling.as_u8() << RETAIN_HANDLING_SHIFT
    }

    /// Unpack the options byte
    pub fn from_u8(byte: u8) -> Result<Self> {
        if byte & RESERVED_MASK != 0 {
            return Err(Error::ReservedBitsSet {
                field: "subscription options",
                value: byte,
            });
        }
        Ok(Self {
            max_qos: QoS::from_u8(byte & MAX_QOS_MASK)?,
            no_local: byte & NO_LOCAL != 0,
            retain_as_published: byte & RETAIN_AS_PUBLISHED != 0,
            retain_handling: RetainHandling::from_u8(byte >> RETAIN_HANDLING_SHIFT & 0b11)?,
        })
    }
}

/// Topic filter and its options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionFilter {
    /// Topic filter, may contain wildcards
    pub filter: String,
    /// Subscription options
    pub options: SubscriptionOptions,
}

impl SubscriptionFilter {
    /// Create a filter with default options at the given maximum QoS
    pub fn new(filter: impl Into<String>, max_qos: QoS) -> Self {
        Self {
            filter: filter.into(),
            options: SubscriptionOptions {
                max_qos,
                ..SubscriptionOptions::default()
            },
        }
    }

    fn size(&self) -> usize {
        string_size(&self.filter) + 1
    }
}

/// SUBSCRIBE packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [PACKET ID (2)] [PROPERTIES] ([TOPIC FILTER] [OPTIONS (1)])*
/// ```
///
/// Filters are read until the remaining length is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subscribe {
    /// Packet identifier
    pub packet_id: u16,
    /// Subscribe properties
    pub properties: Properties,
    /// Requested subscriptions, in order
    pub filters: Vec<SubscriptionFilter>,
}

impl Subscribe {
    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        2 + self.properties.encoded_len()
            + self.filters.iter().map(SubscriptionFilter::size).sum::<usize>()
    }

    /// Write the packet, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        let start = buf.len();
        let remaining = self.remaining_length();
        let flags = PacketType::Subscribe.required_flags().unwrap_or(0b0010);
        let header_len = write_fixed_header(buf, PacketType::Subscribe, flags, remaining)?;

        write_u16(buf, self.packet_id);
        self.properties.write(buf).context("properties")?;
        for filter in &self.filters {
            write_string(buf, &filter.filter).context("topic filter")?;
            buf.put_u8(filter.options.as_u8());
        }

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header and payload
    pub fn read(_header: FixedHeader, mut body: Bytes) -> Result<Self> {
        let packet_id = read_u16(&mut body).context("packet id")?;
        let properties = Properties::read(&mut body).context("properties")?;

        let mut filters = Vec::new();
        while !body.is_empty() {
            let filter = read_string(&mut body).context("topic filter")?;
            let options = read_u8(&mut body).context("subscription options")?;
            let options = SubscriptionOptions::from_u8(options).context("subscription options")?;
            filters.push(SubscriptionFilter { filter, options });
        }

        Ok(Self {
            packet_id,
            properties,
            filters,
        })
    }
}
