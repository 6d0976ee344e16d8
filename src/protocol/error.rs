//! MQTT codec error types

use thiserror::Error;

use super::{PacketPart, PacketType, PayloadKind, PropertyId};

/// MQTT codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// IO error from the underlying reader or writer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A field extends past the end of the available bytes
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Bytes were left unread within the remaining length
    #[error("{remaining} trailing bytes left unread")]
    TrailingBytes {
        /// Number of unread bytes
        remaining: usize,
    },

    /// A value is too long for its length prefix
    #[error("{field} too long: {len} bytes (max {max})")]
    TooLong {
        /// Field being encoded
        field: &'static str,
        /// Actual length
        len: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Continuation bit still set after four varint bytes
    #[error("malformed varint: exceeds maximum")]
    MalformedVarInt,

    /// Value cannot be encoded as a variable byte integer
    #[error("varint overflow: {value} exceeds maximum 268435455")]
    VarIntOverflow {
        /// Value that was too large
        value: u64,
    },

    /// Invalid UTF-8 in a string field
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Packet type nibble outside 1..=15
    #[error("invalid packet type: {type_byte}")]
    InvalidPacketType {
        /// Raw packet type nibble
        type_byte: u8,
    },

    /// Packet type is known but has no codec
    #[error("unsupported packet type: {0}")]
    UnsupportedPacketType(PacketType),

    /// Property identifier with no registered payload type
    #[error("unknown property identifier: {id}")]
    UnknownProperty {
        /// Raw property identifier
        id: u32,
    },

    /// Property payload does not match the identifier's payload type
    #[error("property {id} expects {expected} payload, got {found}")]
    PropertyKindMismatch {
        /// Property identifier
        id: PropertyId,
        /// Payload type fixed by the identifier
        expected: PayloadKind,
        /// Payload type supplied
        found: PayloadKind,
    },

    /// Property appears more often than its packet part permits
    #[error("property {id} not permitted {count} times in {part:?}")]
    PropertyNotPermitted {
        /// Property identifier
        id: PropertyId,
        /// Packet part being validated
        part: PacketPart,
        /// Number of occurrences found
        count: usize,
    },

    /// Fixed header flags do not match the required pattern
    #[error("invalid flags for {packet_type}: expected {expected:#06b}, got {flags:#06b}")]
    InvalidFlags {
        /// Packet type
        packet_type: PacketType,
        /// Flags found
        flags: u8,
        /// Flags required
        expected: u8,
    },

    /// QoS value 3
    #[error("invalid QoS value: {0}")]
    InvalidQoS(u8),

    /// Reserved bits are non-zero
    #[error("reserved bits set in {field}: {value:#010b}")]
    ReservedBitsSet {
        /// Field containing the reserved bits
        field: &'static str,
        /// Raw field value
        value: u8,
    },

    /// Protocol name in CONNECT is not "MQTT"
    #[error("unsupported protocol name: {0:?}")]
    InvalidProtocolName(Vec<u8>),

    /// Protocol level in CONNECT is not 5
    #[error("unsupported protocol level: {0}")]
    UnsupportedProtocolLevel(u8),

    /// Client identifier longer than 23 bytes
    #[error("client id too long: {len} bytes (max 23)")]
    ClientIdTooLong {
        /// Client identifier length in bytes
        len: usize,
    },

    /// Packet identifier of zero
    #[error("packet identifier must be non-zero")]
    ZeroPacketId,

    /// Will QoS or will retain set while the will flag is clear
    #[error("will {field} set without will flag")]
    WillFlagsWithoutWill {
        /// Offending flag
        field: &'static str,
    },

    /// Retain handling value 3
    #[error("invalid retain handling: {0}")]
    InvalidRetainHandling(u8),

    /// Topic name that cannot be published to
    #[error("invalid topic name: {0:?}")]
    InvalidTopic(String),

    /// Error annotated with the packet or field being processed
    #[error("{context}: {source}")]
    Context {
        /// Packet or field being processed
        context: &'static str,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },
}

/// Broad classification of codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Underlying read or write failed
    Io,
    /// Value does not fit its length prefix, or a bound was violated
    Length,
    /// Variable byte integer with too many continuation bytes
    MalformedVarInt,
    /// Well-formed bytes that break a protocol rule
    Protocol,
    /// Packet type or property identifier without a codec
    Unsupported,
}

impl Error {
    /// Innermost error, with all context layers removed
    #[must_use]
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Self::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::Io(_) => ErrorKind::Io,
            Self::BufferTooSmall { .. }
            | Self::TrailingBytes { .. }
            | Self::TooLong { .. }
            | Self::VarIntOverflow { .. } => ErrorKind::Length,
            Self::MalformedVarInt => ErrorKind::MalformedVarInt,
            Self::UnsupportedPacketType(_) | Self::UnknownProperty { .. } => {
                ErrorKind::Unsupported
            }
            _ => ErrorKind::Protocol,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Attach packet or field context to an error
pub(crate) trait Context<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[inline]
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Context {
            context,
            source: Box::new(source),
        })
    }
}
