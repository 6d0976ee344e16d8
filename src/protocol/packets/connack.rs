//! CONNACK packet

use bytes::{BufMut, Bytes, BytesMut};

use super::{debug_assert_written, ensure_consumed};
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::read_u8;
use crate::protocol::{ConnectReason, Error, FixedHeader, PacketType, Properties, Result};

const SESSION_PRESENT: u8 = 1 << 0;

/// CONNACK packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [ACK FLAGS (1)] [REASON CODE (1)] [PROPERTIES]
/// ```
///
/// Only bit 0 of the acknowledge flags is defined, the rest are reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connack {
    /// Server resumed an existing session
    pub session_present: bool,
    /// Connect reason code
    pub reason_code: ConnectReason,
    /// Connack properties
    pub properties: Properties,
}

impl Connack {
    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        2 + self.properties.encoded_len()
    }

    /// Write the packet, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        let start = buf.len();
        let remaining = self.remaining_length();
        let header_len = write_fixed_header(buf, PacketType::Connack, 0, remaining)?;

        buf.put_u8(if self.session_present { SESSION_PRESENT } else { 0 });
        buf.put_u8(self.reason_code.as_u8());
        self.properties.write(buf).context("properties")?;

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header
    pub fn read(_header: FixedHeader, mut body: Bytes) -> Result<Self> {
        let flags = read_u8(&mut body).context("acknowledge flags")?;
        if flags & !SESSION_PRESENT != 0 {
            return Err(Error::ReservedBitsSet {
                field: "acknowledge flags",
                value: flags,
            });
        }
        let reason_code = ConnectReason::from(read_u8(&mut body).context("reason code")?);
        let properties = Properties::read(&mut body).context("properties")?;
        ensure_consumed(&body)?;

        Ok(Self {
            session_present: flags & SESSION_PRESENT != 0,
            reason_code,
            properties,
        })
    }
}
