//! MQTT fixed header
//!
//! Every control packet starts with a fixed header of two to five bytes.

use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use super::primitives::{decode_var_int, read_u8, read_var_int, var_int_size, write_length};
use super::{Error, PacketType, Result};

/// MQTT fixed header
///
/// # Wire Format
///
/// ```text
///  7   6   5   4   3   2   1   0
/// +---+---+---+---+---+---+---+---+
/// |  Packet Type  |     Flags     |
/// +---+---+---+---+---+---+---+---+
/// |  Remaining Length (1-4 bytes) |
/// +---+---+---+---+---+---+---+---+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    packet_type: PacketType,
    flags: u8,
    remaining_length: u32,
}

impl FixedHeader {
    /// Create a new fixed header
    #[must_use]
    pub const fn new(packet_type: PacketType, flags: u8, remaining_length: u32) -> Self {
        Self {
            packet_type,
            flags: flags & 0x0F,
            remaining_length,
        }
    }

    /// Get packet type
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Get the four flag bits
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Number of bytes following the fixed header
    #[must_use]
    pub const fn remaining_length(&self) -> u32 {
        self.remaining_length
    }

    /// Size of the fixed header itself
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        1 + var_int_size(self.remaining_length)
    }

    /// Check the flags against the packet type's required pattern
    pub fn validate_flags(&self) -> Result<()> {
        match self.packet_type.required_flags() {
            Some(expected) if expected != self.flags => Err(Error::InvalidFlags {
                packet_type: self.packet_type,
                flags: self.flags,
                expected,
            }),
            _ => Ok(()),
        }
    }

    /// Parse from the front of a buffer
    pub fn read(buf: &mut Bytes) -> Result<Self> {
        let first = read_u8(buf)?;
        let packet_type = parse_type(first)?;
        let remaining_length = read_var_int(buf)?;
        Ok(Self::parsed(packet_type, first, remaining_length))
    }

    /// Parse from a blocking reader, consuming only the header bytes
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let first = read_byte(reader)?;
        let packet_type = parse_type(first)?;
        let remaining_length = decode_var_int(|| read_byte(reader))?;
        Ok(Self::parsed(packet_type, first, remaining_length))
    }

    /// Write the fixed header, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        write_fixed_header(
            buf,
            self.packet_type,
            self.flags,
            self.remaining_length as usize,
        )
    }

    fn parsed(packet_type: PacketType, first: u8, remaining_length: u32) -> Self {
        let header = Self::new(packet_type, first & 0x0F, remaining_length);
        trace!(
            packet_type = %header.packet_type,
            flags = header.flags,
            remaining_length,
            "decoded fixed header"
        );
        header
    }
}

/// Write a fixed header for a packet whose body is `remaining_length` bytes
pub(crate) fn write_fixed_header(
    buf: &mut BytesMut,
    packet_type: PacketType,
    flags: u8,
    remaining_length: usize,
) -> Result<usize> {
    buf.put_u8(packet_type.as_u8() << 4 | (flags & 0x0F));
    Ok(1 + write_length(buf, remaining_length)?)
}

fn parse_type(first: u8) -> Result<PacketType> {
    let type_byte = first >> 4;
    PacketType::from_u8(type_byte).ok_or(Error::InvalidPacketType { type_byte })
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = FixedHeader::new(PacketType::Subscribe, 0b0010, 321);
        let mut buf = BytesMut::new();
        let written = header.write(&mut buf).unwrap();
        assert_eq!(written, 3);
        assert_eq!(written, header.encoded_len());
        assert_eq!(buf.as_ref(), &[0x82, 0xC1, 0x02]);

        let mut bytes = buf.freeze();
        let decoded = FixedHeader::read(&mut bytes).unwrap();
        assert_eq!(decoded, header);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_invalid_packet_type() {
        let mut bytes = Bytes::from_static(&[0x00, 0x00]);
        assert!(matches!(
            FixedHeader::read(&mut bytes),
            Err(Error::InvalidPacketType { type_byte: 0 })
        ));
    }

    #[test]
    fn test_validate_flags() {
        assert!(FixedHeader::new(PacketType::Connect, 0, 0).validate_flags().is_ok());
        assert!(matches!(
            FixedHeader::new(PacketType::Connect, 1, 0).validate_flags(),
            Err(Error::InvalidFlags { expected: 0, flags: 1, .. })
        ));
        assert!(matches!(
            FixedHeader::new(PacketType::Subscribe, 0, 0).validate_flags(),
            Err(Error::InvalidFlags { expected: 2, .. })
        ));
        assert!(FixedHeader::new(PacketType::Publish, 0b1011, 0).validate_flags().is_ok());
    }

    #[test]
    fn test_read_from_stream() {
        let mut reader: &[u8] = &[0xE0, 0x80, 0x01, 0xFF];
        let header = FixedHeader::read_from(&mut reader).unwrap();
        assert_eq!(header.packet_type(), PacketType::Disconnect);
        assert_eq!(header.remaining_length(), 128);
        assert_eq!(reader, &[0xFF]);
    }

    #[test]
    fn test_read_from_truncated_stream() {
        let mut reader: &[u8] = &[0x10];
        assert!(matches!(
            FixedHeader::read_from(&mut reader),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_malformed_remaining_length() {
        let mut bytes = Bytes::from_static(&[0x10, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert!(matches!(
            FixedHeader::read(&mut bytes),
            Err(Error::MalformedVarInt)
        ));
    }
}
