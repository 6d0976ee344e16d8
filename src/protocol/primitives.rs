//! Primitive wire encodings
//!
//! Fixed-width big-endian integers, the variable byte integer, and
//! length-prefixed UTF-8 strings, binary data and string pairs.
//!
//! Every writer has a matching `*_size` function. Packet writers compute the
//! remaining length from the size functions before writing any field, so the
//! two families must always agree.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Error, MAX_STRING_LEN, MAX_VAR_INT, Result};

/// Fail with [`Error::BufferTooSmall`] unless `needed` bytes remain
#[inline]
pub(crate) fn ensure(buf: &Bytes, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            got: buf.remaining(),
        });
    }
    Ok(())
}

/// Read a single byte
pub fn read_u8(buf: &mut Bytes) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

/// Write a big-endian two byte integer
#[inline]
pub fn write_u16(buf: &mut BytesMut, value: u16) {
    buf.put_u16(value);
}

/// Read a big-endian two byte integer
pub fn read_u16(buf: &mut Bytes) -> Result<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

/// Write a big-endian four byte integer
#[inline]
pub fn write_u32(buf: &mut BytesMut, value: u32) {
    buf.put_u32(value);
}

/// Read a big-endian four byte integer
pub fn read_u32(buf: &mut Bytes) -> Result<u32> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

/// Number of bytes `value` occupies as a variable byte integer
#[must_use]
pub const fn var_int_size(value: u32) -> usize {
    if value < 1 << 7 {
        1
    } else if value < 1 << 14 {
        2
    } else if value < 1 << 21 {
        3
    } else {
        4
    }
}

/// Write a variable byte integer, returning the number of bytes written
///
/// # Format
///
/// ```text
/// 7 data bits per byte, least significant group first,
/// high bit set on every byte except the last
/// ```
pub fn write_var_int(buf: &mut BytesMut, value: u32) -> Result<usize> {
    if value > MAX_VAR_INT {
        return Err(Error::VarIntOverflow {
            value: u64::from(value),
        });
    }

    let mut remaining = value;
    let mut count = 0;
    loop {
        let mut byte = (remaining % 128) as u8;
        remaining /= 128;
        if remaining > 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        count += 1;

        if remaining == 0 {
            return Ok(count);
        }
    }
}

/// Write a `usize` length as a variable byte integer
pub(crate) fn write_length(buf: &mut BytesMut, len: usize) -> Result<usize> {
    let value = u32::try_from(len).map_err(|_| Error::VarIntOverflow { value: len as u64 })?;
    write_var_int(buf, value)
}

/// Read a variable byte integer
pub fn read_var_int(buf: &mut Bytes) -> Result<u32> {
    decode_var_int(|| read_u8(buf))
}

/// Decode a variable byte integer from a byte source
///
/// At most four bytes are consumed; a fourth byte that still carries the
/// continuation bit is [`Error::MalformedVarInt`].
pub(crate) fn decode_var_int(mut next_byte: impl FnMut() -> Result<u8>) -> Result<u32> {
    let mut value: u32 = 0;
    for position in 0..4 {
        let byte = next_byte()?;
        value += u32::from(byte & 0x7F) << (7 * position);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::MalformedVarInt)
}

/// Encoded size of a length-prefixed UTF-8 string
#[must_use]
pub fn string_size(value: &str) -> usize {
    2 + value.len()
}

/// Encoded size of length-prefixed binary data
#[must_use]
pub fn binary_size(value: &[u8]) -> usize {
    2 + value.len()
}

/// Write a length-prefixed UTF-8 string
pub fn write_string(buf: &mut BytesMut, value: &str) -> Result<()> {
    write_prefixed(buf, value.as_bytes(), "string")
}

/// Read a length-prefixed UTF-8 string
pub fn read_string(buf: &mut Bytes) -> Result<String> {
    let raw = read_prefixed(buf)?;
    Ok(String::from_utf8(raw.to_vec())?)
}

/// Write length-prefixed binary data
pub fn write_binary(buf: &mut BytesMut, value: &[u8]) -> Result<()> {
    write_prefixed(buf, value, "binary data")
}

/// Read length-prefixed binary data
pub fn read_binary(buf: &mut Bytes) -> Result<Bytes> {
    read_prefixed(buf)
}

fn write_prefixed(buf: &mut BytesMut, value: &[u8], field: &'static str) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| Error::TooLong {
        field,
        len: value.len(),
        max: MAX_STRING_LEN,
    })?;
    buf.put_u16(len);
    buf.extend_from_slice(value);
    Ok(())
}

fn read_prefixed(buf: &mut Bytes) -> Result<Bytes> {
    let len = usize::from(read_u16(buf)?);
    if len == 0 {
        return Ok(Bytes::new());
    }
    ensure(buf, len)?;
    Ok(buf.split_to(len))
}

/// Two consecutive length-prefixed strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringPair {
    /// Key
    pub key: String,
    /// Value
    pub value: String,
}

impl StringPair {
    /// Create a new string pair
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Encoded size of the pair
    #[must_use]
    pub fn size(&self) -> usize {
        string_size(&self.key) + string_size(&self.value)
    }

    /// Write key then value
    pub fn write(&self, buf: &mut BytesMut) -> Result<()> {
        write_string(buf, &self.key)?;
        write_string(buf, &self.value)
    }

    /// Read key then value
    pub fn read(buf: &mut Bytes) -> Result<Self> {
        let key = read_string(buf)?;
        let value = read_string(buf)?;
        Ok(Self { key, value })
    }
}
