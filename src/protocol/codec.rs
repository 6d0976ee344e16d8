//! Packet encode/decode dispatch
//!
//! This module ties the fixed header to the per-packet codecs, both for
//! in-memory buffers and for blocking readers and writers.

use std::io::{self, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use super::error::Context;
use super::metrics::{self, Direction};
use super::primitives::ensure;
use super::{
    Connack, Connect, Disconnect, Error, FixedHeader, PacketType, Publish, Result, Suback,
    Subscribe,
};

/// Supported MQTT 5.0 control packets
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Packet {
    /// CONNECT
    Connect(Connect),
    /// CONNACK
    Connack(Connack),
    /// PUBLISH
    Publish(Publish),
    /// SUBSCRIBE
    Subscribe(Subscribe),
    /// SUBACK
    Suback(Suback),
    /// DISCONNECT
    Disconnect(Disconnect),
}

impl Packet {
    /// Get packet type
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::Connect(_) => PacketType::Connect,
            Self::Connack(_) => PacketType::Connack,
            Self::Publish(_) => PacketType::Publish,
            Self::Subscribe(_) => PacketType::Subscribe,
            Self::Suback(_) => PacketType::Suback,
            Self::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        match self {
            Self::Connect(p) => p.remaining_length(),
            Self::Connack(p) => p.remaining_length(),
            Self::Publish(p) => p.remaining_length(),
            Self::Subscribe(p) => p.remaining_length(),
            Self::Suback(p) => p.remaining_length(),
            Self::Disconnect(p) => p.remaining_length(),
        }
    }

    /// Append the encoded packet to `buf`, returning the number of bytes written
    ///
    /// On error `buf` may hold a partially written packet.
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        let written = match self {
            Self::Connect(p) => p.write(buf),
            Self::Connack(p) => p.write(buf),
            Self::Publish(p) => p.write(buf),
            Self::Subscribe(p) => p.write(buf),
            Self::Suback(p) => p.write(buf),
            Self::Disconnect(p) => p.write(buf),
        };
        written.context(self.packet_type().name())
    }

    /// Decode the body of a packet whose fixed header has been read
    ///
    /// `body` must hold exactly the remaining length.
    pub fn read(header: FixedHeader, body: Bytes) -> Result<Self> {
        let packet_type = header.packet_type();
        header.validate_flags()?;

        let packet = match packet_type {
            PacketType::Connect => Connect::read(header, body).map(Self::Connect),
            PacketType::Connack => Connack::read(header, body).map(Self::Connack),
            PacketType::Publish => Publish::read(header, body).map(Self::Publish),
            PacketType::Subscribe => Subscribe::read(header, body).map(Self::Subscribe),
            PacketType::Suback => Suback::read(header, body).map(Self::Suback),
            PacketType::Disconnect => Disconnect::read(header, body).map(Self::Disconnect),
            other => return Err(Error::UnsupportedPacketType(other)),
        };
        packet.context(packet_type.name())
    }
}

impl From<Connect> for Packet {
    fn from(packet: Connect) -> Self {
        Self::Connect(packet)
    }
}

impl From<Connack> for Packet {
    fn from(packet: Connack) -> Self {
        Self::Connack(packet)
    }
}

impl From<Publish> for Packet {
    fn from(packet: Publish) -> Self {
        Self::Publish(packet)
    }
}

impl From<Subscribe> for Packet {
    fn from(packet: Subscribe) -> Self {
        Self::Subscribe(packet)
    }
}

impl From<Suback> for Packet {
    fn from(packet: Suback) -> Self {
        Self::Suback(packet)
    }
}

impl From<Disconnect> for Packet {
    fn from(packet: Disconnect) -> Self {
        Self::Disconnect(packet)
    }
}

/// Encode a packet to bytes
///
/// # Format
///
/// ```text
/// [TYPE | FLAGS (1)] [REMAINING LENGTH (1-4)] [VARIABLE HEADER] [PAYLOAD]
/// ```
///
/// # Errors
///
/// Returns an error if a field cannot be represented on the wire, such as a
/// string longer than 65535 bytes, a client identifier longer than 23 bytes
/// or a PUBLISH with packet identifier zero.
pub fn encode(packet: &Packet) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(packet.remaining_length() + 5);
    match packet.write(&mut buf) {
        Ok(len) => {
            metrics::record_packet(Direction::Encode, packet.packet_type(), len);
            trace!(packet_type = %packet.packet_type(), len, "encoded packet");
            Ok(buf.freeze())
        }
        Err(err) => {
            metrics::record_error(Direction::Encode);
            debug!(packet_type = %packet.packet_type(), error = %err, "failed to encode packet");
            Err(err)
        }
    }
}

/// Decode one packet from the front of `bytes`
///
/// On success the packet's bytes are consumed and anything after them is
/// left in `bytes`. On error `bytes` is left untouched, so a
/// [`Error::BufferTooSmall`] can be retried once more data has arrived.
///
/// # Errors
///
/// Returns an error if:
/// - The buffer ends before the packet does
/// - The packet type or fixed header flags are invalid
/// - The packet type has no codec
/// - Any field of the packet is malformed
pub fn decode(bytes: &mut Bytes) -> Result<Packet> {
    let mut cursor = bytes.clone();
    match decode_from(&mut cursor) {
        Ok((packet, len)) => {
            *bytes = cursor;
            metrics::record_packet(Direction::Decode, packet.packet_type(), len);
            trace!(packet_type = %packet.packet_type(), len, "decoded packet");
            Ok(packet)
        }
        Err(err) => {
            metrics::record_error(Direction::Decode);
            debug!(error = %err, "failed to decode packet");
            Err(err)
        }
    }
}

fn decode_from(cursor: &mut Bytes) -> Result<(Packet, usize)> {
    let header = FixedHeader::read(cursor)?;
    let remaining = header.remaining_length() as usize;
    ensure(cursor, remaining)?;
    let body = cursor.split_to(remaining);
    let packet = Packet::read(header, body)?;
    Ok((packet, header.encoded_len() + remaining))
}

/// Read one packet from a blocking reader
///
/// Exactly the packet's bytes are consumed from `reader`.
pub fn read_packet<R: Read>(reader: &mut R) -> Result<Packet> {
    let result = FixedHeader::read_from(reader).and_then(|header| {
        // grow with the bytes that actually arrive, not the declared length
        let remaining = header.remaining_length() as usize;
        let mut body = Vec::new();
        reader.by_ref().take(u64::from(header.remaining_length())).read_to_end(&mut body)?;
        if body.len() < remaining {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        let len = header.encoded_len() + remaining;
        Packet::read(header, Bytes::from(body)).map(|packet| (packet, len))
    });

    match result {
        Ok((packet, len)) => {
            metrics::record_packet(Direction::Decode, packet.packet_type(), len);
            trace!(packet_type = %packet.packet_type(), len, "read packet");
            Ok(packet)
        }
        Err(err) => {
            metrics::record_error(Direction::Decode);
            debug!(error = %err, "failed to read packet");
            Err(err)
        }
    }
}

/// Encode a packet and write it to a blocking writer
///
/// Nothing is written if encoding fails.
pub fn write_packet<W: Write>(writer: &mut W, packet: &Packet) -> Result<usize> {
    let bytes = encode(packet)?;
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}
