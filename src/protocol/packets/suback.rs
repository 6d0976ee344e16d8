//! SUBACK packet

use bytes::{BufMut, Bytes, BytesMut};

use super::debug_assert_written;
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::{read_u16, write_u16};
use crate::protocol::{FixedHeader, PacketType, Properties, Result, SubackReason};

/// SUBACK packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [PACKET ID (2)] [PROPERTIES] [REASON CODE (1)]*
/// ```
///
/// One reason code per filter of the SUBSCRIBE being acknowledged, in the
/// same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suback {
    /// Packet identifier of the SUBSCRIBE
    pub packet_id: u16,
    /// Suback properties
    pub properties: Properties,
    /// Reason codes
    pub reasons: Vec<SubackReason>,
}

impl Suback {
    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        2 + self.properties.encoded_len() + self.reasons.len()
    }

    /// Write the packet, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        let start = buf.len();
        let remaining = self.remaining_length();
        let header_len = write_fixed_header(buf, PacketType::Suback, 0, remaining)?;

        write_u16(buf, self.packet_id);
        self.properties.write(buf).context("properties")?;
        for reason in &self.reasons {
            buf.put_u8(reason.as_u8());
        }

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header and payload
    pub fn read(_header: FixedHeader, mut body: Bytes) -> Result<Self> {
        let packet_id = read_u16(&mut body).context("packet id")?;
        let properties = Properties::read(&mut body).context("properties")?;
        let reasons = body.iter().copied().map(SubackReason::from).collect();

        Ok(Self {
            packet_id,
            properties,
            reasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Error, Property, PropertyId, PropertyValue};

    fn read(bytes: &[u8]) -> Result<Suback> {
        let body = Bytes::copy_from_slice(&bytes[2..]);
        Suback::read(
            FixedHeader::new(PacketType::Suback, 0, body.len() as u32),
            body,
        )
    }

    #[test]
    fn test_suback_layout() {
        let suback = Suback {
            packet_id: 1000,
            properties: [Property::new(
                PropertyId::SubscriptionIdentifier,
                PropertyValue::VarInt(1000),
            )
            .unwrap()]
            .into_iter()
            .collect(),
            reasons: vec![
                SubackReason::GRANTED_QOS_0,
                SubackReason::IMPLEMENTATION_SPECIFIC_ERROR,
            ],
        };

        let mut buf = BytesMut::new();
        assert_eq!(suback.write(&mut buf).unwrap(), 10);
        assert_eq!(buf.as_ref(), &[0x90, 8, 3, 232, 3, 11, 232, 7, 0, 0x83]);
        assert_eq!(read(&buf).unwrap(), suback);
    }

    #[test]
    fn test_reasons_consume_rest() {
        let suback = read(&[0x90, 6, 0, 100, 0, 2, 0, 0x97]).unwrap();
        assert_eq!(
            suback.reasons,
            [
                SubackReason::GRANTED_QOS_2,
                SubackReason::GRANTED_QOS_0,
                SubackReason::QUOTA_EXCEEDED
            ]
        );
        assert!(suback.reasons[2].is_error());
    }

    #[test]
    fn test_unknown_reason_is_kept() {
        let suback = read(&[0x90, 4, 0, 1, 0, 0x42]).unwrap();
        assert_eq!(suback.reasons, [SubackReason(0x42)]);
        assert_eq!(suback.reasons[0].name(), None);
    }

    #[test]
    fn test_truncated_properties() {
        let err = read(&[0x90, 4, 0, 1, 5, 2]).unwrap_err();
        assert!(matches!(err.root(), Error::BufferTooSmall { .. }));
    }
}
