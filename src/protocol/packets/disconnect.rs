//! DISCONNECT packet

use bytes::{BufMut, Bytes, BytesMut};

use super::{debug_assert_written, ensure_consumed};
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::read_u8;
use crate::protocol::{DisconnectReason, FixedHeader, PacketType, Properties, Result};

/// DISCONNECT packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [REASON CODE (1)] [PROPERTIES]
/// ```
///
/// The reason code is omitted when it is a normal disconnection without
/// properties, and the property block is omitted when it would be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Disconnect {
    /// Disconnect reason code
    pub reason_code: DisconnectReason,
    /// Disconnect properties
    pub properties: Properties,
}

impl Disconnect {
    /// Create a DISCONNECT with the given reason and no properties
    #[must_use]
    pub fn new(reason_code: DisconnectReason) -> Self {
        Self {
            reason_code,
            properties: Properties::new(),
        }
    }

    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        if !self.properties.is_empty() {
            1 + self.properties.encoded_len()
        } else if self.reason_code != DisconnectReason::NORMAL_DISCONNECTION {
            1
        } else {
            0
        }
    }

    /// Write the packet in its shortest form
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        let start = buf.len();
        let remaining = self.remaining_length();
        let header_len = write_fixed_header(buf, PacketType::Disconnect, 0, remaining)?;

        if remaining > 0 {
            buf.put_u8(self.reason_code.as_u8());
        }
        if remaining > 1 {
            self.properties.write(buf).context("properties")?;
        }

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header
    ///
    /// A zero remaining length means a normal disconnection, and a remaining
    /// length of one means no properties.
    pub fn read(header: FixedHeader, mut body: Bytes) -> Result<Self> {
        let mut disconnect = Self::default();
        if header.remaining_length() < 1 {
            ensure_consumed(&body)?;
            return Ok(disconnect);
        }

        disconnect.reason_code = DisconnectReason::from(read_u8(&mut body).context("reason code")?);
        if header.remaining_length() >= 2 {
            disconnect.properties = Properties::read(&mut body).context("properties")?;
        }
        ensure_consumed(&body)?;
        Ok(disconnect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Error, Property, PropertyId, PropertyValue};

    fn read(bytes: &[u8]) -> Result<Disconnect> {
        let body = Bytes::copy_from_slice(&bytes[2..]);
        Disconnect::read(
            FixedHeader::new(PacketType::Disconnect, 0, body.len() as u32),
            body,
        )
    }

    fn write(disconnect: &Disconnect) -> BytesMut {
        let mut buf = BytesMut::new();
        let written = disconnect.write(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        buf
    }

    #[test]
    fn test_normal_disconnect_is_two_bytes() {
        let buf = write(&Disconnect::default());
        assert_eq!(buf.as_ref(), &[0xE0, 0]);
        assert_eq!(read(&buf).unwrap(), Disconnect::default());
    }

    #[test]
    fn test_reason_without_properties() {
        let disconnect = Disconnect::new(DisconnectReason::SERVER_SHUTTING_DOWN);
        let buf = write(&disconnect);
        assert_eq!(buf.as_ref(), &[0xE0, 1, 0x8B]);
        assert_eq!(read(&buf).unwrap(), disconnect);
    }

    #[test]
    fn test_normal_reason_with_properties_keeps_reason_byte() {
        let disconnect = Disconnect {
            reason_code: DisconnectReason::NORMAL_DISCONNECTION,
            properties: [Property::new(
                PropertyId::SessionExpiryInterval,
                PropertyValue::UInt32(100),
            )
            .unwrap()]
            .into_iter()
            .collect(),
        };
        let buf = write(&disconnect);
        assert_eq!(buf.as_ref(), &[0xE0, 7, 0, 5, 17, 0, 0, 0, 100]);
        assert_eq!(read(&buf).unwrap(), disconnect);
    }

    #[test]
    fn test_full_form() {
        let disconnect = Disconnect {
            reason_code: DisconnectReason::IMPLEMENTATION_SPECIFIC_ERROR,
            properties: [
                Property::new(PropertyId::ReasonString, PropertyValue::String("error".into()))
                    .unwrap(),
                Property::new(PropertyId::SessionExpiryInterval, PropertyValue::UInt32(100))
                    .unwrap(),
            ]
            .into_iter()
            .collect(),
        };
        let buf = write(&disconnect);
        assert_eq!(
            buf.as_ref(),
            &[
                0xE0, 15, 0x83, 13, 17, 0, 0, 0, 100, 31, 0, 5, b'e', b'r', b'r', b'o', b'r'
            ]
        );
        assert_eq!(read(&buf).unwrap(), disconnect);
    }

    #[test]
    fn test_short_forms_decode() {
        assert_eq!(read(&[0xE0, 0]).unwrap(), Disconnect::default());
        assert_eq!(read(&[0xE0, 1, 0]).unwrap(), Disconnect::default());
        assert_eq!(read(&[0xE0, 2, 0, 0]).unwrap(), Disconnect::default());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(matches!(
            read(&[0xE0, 3, 0, 0, 0]),
            Err(Error::TrailingBytes { remaining: 1 })
        ));
    }
}
