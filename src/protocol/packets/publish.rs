//! PUBLISH packet

use bytes::{Bytes, BytesMut};

use super::debug_assert_written;
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::{read_string, read_u16, write_string, write_u16};
use crate::protocol::{Error, FixedHeader, MAX_STRING_LEN, PacketType, Properties, QoS, Result};
use crate::topic::Topic;

const RETAIN: u8 = 1 << 0;
const QOS_SHIFT: u8 = 1;
const DUP: u8 = 1 << 3;

/// PUBLISH packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [TOPIC NAME] [PACKET ID (2)] [PROPERTIES] [PAYLOAD]
/// ```
///
/// The fixed header flags carry retain (bit 0), QoS (bits 1-2) and dup
/// (bit 3). The payload is everything after the properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Publish {
    /// Redelivery of an earlier attempt
    pub dup: bool,
    /// Delivery guarantee
    pub qos: QoS,
    /// Retain the message on the server
    pub retain: bool,
    /// Topic name
    pub topic: Topic,
    /// Packet identifier, never zero
    pub packet_id: u16,
    /// Publish properties
    pub properties: Properties,
    /// Application message
    pub payload: Bytes,
}

impl Publish {
    /// Create a QoS 0 PUBLISH
    pub fn new(topic: Topic, packet_id: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            topic,
            packet_id,
            payload: payload.into(),
            ..Self::default()
        }
    }

    /// Fixed header flag bits
    #[must_use]
    pub fn flags(&self) -> u8 {
        let mut flags = self.qos.as_u8() << QOS_SHIFT;
        if self.retain {
            flags |= RETAIN;
        }
        if self.dup {
            flags |= DUP;
        }
        flags
    }

    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        2 + self.topic.len() + 2 + self.properties.encoded_len() + self.payload.len()
    }

    /// Write the packet, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        if self.packet_id == 0 {
            return Err(Error::ZeroPacketId);
        }
        if self.topic.len() > MAX_STRING_LEN {
            return Err(Error::TooLong {
                field: "topic",
                len: self.topic.len(),
                max: MAX_STRING_LEN,
            });
        }

        let start = buf.len();
        let remaining = self.remaining_length();
        let header_len = write_fixed_header(buf, PacketType::Publish, self.flags(), remaining)?;

        write_string(buf, &self.topic.name()).context("topic")?;
        write_u16(buf, self.packet_id);
        self.properties.write(buf).context("properties")?;
        buf.extend_from_slice(&self.payload);

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header and payload
    pub fn read(header: FixedHeader, mut body: Bytes) -> Result<Self> {
        let flags = header.flags();
        let qos = QoS::from_u8((flags >> QOS_SHIFT) & 0b11)?;

        let topic = read_string(&mut body).context("topic")?;
        let topic = Topic::parse(&topic)?;
        let packet_id = read_u16(&mut body).context("packet id")?;
        if packet_id == 0 {
            return Err(Error::ZeroPacketId).context("packet id");
        }
        let properties = Properties::read(&mut body).context("properties")?;
        let payload = body;

        Ok(Self {
            dup: flags & DUP != 0,
            qos,
            retain: flags & RETAIN != 0,
            topic,
            packet_id,
            properties,
            payload,
        })
    }
}
