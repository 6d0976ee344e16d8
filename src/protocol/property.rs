//! MQTT 5.0 properties
//!
//! A property is an identifier followed by a payload whose type is fixed by
//! the identifier. [`PropertyId::kind`] is the identifier to payload-type
//! table used by the decoder; [`Properties`] is the multimap carried by
//! packets and will messages.

use std::collections::BTreeMap;
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::permitted::{PacketPart, allowed};
use super::primitives::{
    StringPair, binary_size, ensure, read_binary, read_string, read_u8, read_u16, read_u32,
    read_var_int, string_size, var_int_size, write_binary, write_length, write_string,
    write_u16, write_u32, write_var_int,
};
use super::{Error, MAX_VAR_INT, Result};

/// Property identifiers defined by MQTT 5.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PropertyId {
    /// Payload is UTF-8 (1) or unspecified bytes (0)
    PayloadFormatIndicator = 1,
    /// Lifetime of an application message in seconds
    MessageExpiryInterval = 2,
    /// MIME type of the application message
    ContentType = 3,
    /// Topic name for a response message
    ResponseTopic = 8,
    /// Correlates a response with its request
    CorrelationData = 9,
    /// Identifier of a subscription
    SubscriptionIdentifier = 11,
    /// Session lifetime after the network connection closes, in seconds
    SessionExpiryInterval = 17,
    /// Client identifier assigned by the server
    AssignedClientIdentifier = 18,
    /// Keep alive time assigned by the server
    ServerKeepAlive = 19,
    /// Name of the authentication method
    AuthenticationMethod = 21,
    /// Authentication data
    AuthenticationData = 22,
    /// Whether reason strings and user properties may be sent on failures
    RequestProblemInformation = 23,
    /// Delay before the will message is published, in seconds
    WillDelayInterval = 24,
    /// Whether the server may return response information
    RequestResponseInformation = 25,
    /// Basis for creating a response topic
    ResponseInformation = 26,
    /// Another server the client may use
    ServerReference = 28,
    /// Human readable diagnostic string
    ReasonString = 31,
    /// Maximum number of concurrent QoS 1 and QoS 2 publications
    ReceiveMaximum = 33,
    /// Highest topic alias value accepted
    TopicAliasMaximum = 34,
    /// Integer standing in for the topic name
    TopicAlias = 35,
    /// Maximum QoS the server supports
    MaximumQoS = 36,
    /// Whether the server supports retained messages
    RetainAvailable = 37,
    /// Application defined name/value pair
    UserProperty = 38,
    /// Maximum packet size accepted
    MaximumPacketSize = 39,
    /// Whether wildcard subscriptions are supported
    WildcardSubscriptionAvailable = 40,
    /// Whether subscription identifiers are supported
    SubscriptionIdentifierAvailable = 41,
    /// Whether shared subscriptions are supported
    SharedSubscriptionAvailable = 42,
}

impl PropertyId {
    /// Every defined identifier, in ascending order
    pub const ALL: [Self; 27] = [
        Self::PayloadFormatIndicator,
        Self::MessageExpiryInterval,
        Self::ContentType,
        Self::ResponseTopic,
        Self::CorrelationData,
        Self::SubscriptionIdentifier,
        Self::SessionExpiryInterval,
        Self::AssignedClientIdentifier,
        Self::ServerKeepAlive,
        Self::AuthenticationMethod,
        Self::AuthenticationData,
        Self::RequestProblemInformation,
        Self::WillDelayInterval,
        Self::RequestResponseInformation,
        Self::ResponseInformation,
        Self::ServerReference,
        Self::ReasonString,
        Self::ReceiveMaximum,
        Self::TopicAliasMaximum,
        Self::TopicAlias,
        Self::MaximumQoS,
        Self::RetainAvailable,
        Self::UserProperty,
        Self::MaximumPacketSize,
        Self::WildcardSubscriptionAvailable,
        Self::SubscriptionIdentifierAvailable,
        Self::SharedSubscriptionAvailable,
    ];

    /// Convert from a decoded identifier
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_u32() == value)
    }

    /// Convert to the wire identifier
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Payload type carried by this identifier
    #[must_use]
    pub const fn kind(self) -> PayloadKind {
        match self {
            Self::PayloadFormatIndicator
            | Self::RequestProblemInformation
            | Self::RequestResponseInformation
            | Self::MaximumQoS
            | Self::RetainAvailable
            | Self::WildcardSubscriptionAvailable
            | Self::SubscriptionIdentifierAvailable
            | Self::SharedSubscriptionAvailable => PayloadKind::Byte,
            Self::ServerKeepAlive
            | Self::ReceiveMaximum
            | Self::TopicAliasMaximum
            | Self::TopicAlias => PayloadKind::UInt16,
            Self::MessageExpiryInterval
            | Self::SessionExpiryInterval
            | Self::WillDelayInterval
            | Self::MaximumPacketSize => PayloadKind::UInt32,
            Self::SubscriptionIdentifier => PayloadKind::VarInt,
            Self::ContentType
            | Self::ResponseTopic
            | Self::AssignedClientIdentifier
            | Self::AuthenticationMethod
            | Self::ResponseInformation
            | Self::ServerReference
            | Self::ReasonString => PayloadKind::String,
            Self::UserProperty => PayloadKind::KeyValue,
            Self::CorrelationData | Self::AuthenticationData => PayloadKind::Binary,
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.as_u32())
    }
}

/// Wire shape of a property payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Single byte
    Byte,
    /// Two byte integer
    UInt16,
    /// Four byte integer
    UInt32,
    /// Variable byte integer
    VarInt,
    /// UTF-8 string
    String,
    /// UTF-8 string pair
    KeyValue,
    /// Binary data
    Binary,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Byte => "byte",
            Self::UInt16 => "two byte integer",
            Self::UInt32 => "four byte integer",
            Self::VarInt => "variable byte integer",
            Self::String => "UTF-8 string",
            Self::KeyValue => "UTF-8 string pair",
            Self::Binary => "binary data",
        };
        write!(f, "{name}")
    }
}

/// Property payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    /// Single byte
    Byte(u8),
    /// Two byte integer
    UInt16(u16),
    /// Four byte integer
    UInt32(u32),
    /// Variable byte integer
    VarInt(u32),
    /// UTF-8 string
    String(String),
    /// UTF-8 string pair
    KeyValue(StringPair),
    /// Binary data
    Binary(Bytes),
}

impl PropertyValue {
    /// Wire shape of this payload
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::Byte(_) => PayloadKind::Byte,
            Self::UInt16(_) => PayloadKind::UInt16,
            Self::UInt32(_) => PayloadKind::UInt32,
            Self::VarInt(_) => PayloadKind::VarInt,
            Self::String(_) => PayloadKind::String,
            Self::KeyValue(_) => PayloadKind::KeyValue,
            Self::Binary(_) => PayloadKind::Binary,
        }
    }

    /// Encoded size of the payload
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Byte(_) => 1,
            Self::UInt16(_) => 2,
            Self::UInt32(_) => 4,
            Self::VarInt(value) => var_int_size(*value),
            Self::String(value) => string_size(value),
            Self::KeyValue(pair) => pair.size(),
            Self::Binary(value) => binary_size(value),
        }
    }

    fn write(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            Self::Byte(value) => buf.put_u8(*value),
            Self::UInt16(value) => write_u16(buf, *value),
            Self::UInt32(value) => write_u32(buf, *value),
            Self::VarInt(value) => {
                write_var_int(buf, *value)?;
            }
            Self::String(value) => write_string(buf, value)?,
            Self::KeyValue(pair) => pair.write(buf)?,
            Self::Binary(value) => write_binary(buf, value)?,
        }
        Ok(())
    }

    fn read(kind: PayloadKind, buf: &mut Bytes) -> Result<Self> {
        Ok(match kind {
            PayloadKind::Byte => Self::Byte(read_u8(buf)?),
            PayloadKind::UInt16 => Self::UInt16(read_u16(buf)?),
            PayloadKind::UInt32 => Self::UInt32(read_u32(buf)?),
            PayloadKind::VarInt => Self::VarInt(read_var_int(buf)?),
            PayloadKind::String => Self::String(read_string(buf)?),
            PayloadKind::KeyValue => Self::KeyValue(StringPair::read(buf)?),
            PayloadKind::Binary => Self::Binary(read_binary(buf)?),
        })
    }
}

/// Identifier and payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    id: PropertyId,
    value: PropertyValue,
}

impl Property {
    /// Create a property, checking the payload against the identifier
    pub fn new(id: PropertyId, value: PropertyValue) -> Result<Self> {
        if value.kind() != id.kind() {
            return Err(Error::PropertyKindMismatch {
                id,
                expected: id.kind(),
                found: value.kind(),
            });
        }
        if let PropertyValue::VarInt(raw) = value {
            if raw > MAX_VAR_INT {
                return Err(Error::VarIntOverflow {
                    value: u64::from(raw),
                });
            }
        }
        Ok(Self { id, value })
    }

    /// Create a user property
    pub fn user(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: PropertyId::UserProperty,
            value: PropertyValue::KeyValue(StringPair::new(key, value)),
        }
    }

    /// Get identifier
    #[must_use]
    pub const fn id(&self) -> PropertyId {
        self.id
    }

    /// Get payload
    #[must_use]
    pub const fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Encoded size of identifier and payload
    #[must_use]
    pub fn size(&self) -> usize {
        entry_size(self.id, &self.value)
    }
}

fn entry_size(id: PropertyId, value: &PropertyValue) -> usize {
    var_int_size(id.as_u32()) + value.size()
}

/// Properties of a packet or will message
///
/// Values for the same identifier keep their insertion order. Identifiers
/// are written in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawProperties")
)]
pub struct Properties {
    entries: BTreeMap<PropertyId, Vec<PropertyValue>>,
}

/// Deserialized property map, not yet checked against the kind table
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawProperties {
    entries: BTreeMap<PropertyId, Vec<PropertyValue>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawProperties> for Properties {
    type Error = Error;

    fn try_from(raw: RawProperties) -> Result<Self> {
        let mut properties = Self::new();
        for (id, values) in raw.entries {
            for value in values {
                properties.insert(id, value)?;
            }
        }
        Ok(properties)
    }
}

impl Properties {
    /// Create an empty property set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no property is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of properties, counting repeated identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Append a property
    pub fn push(&mut self, property: Property) {
        self.entries
            .entry(property.id)
            .or_default()
            .push(property.value);
    }

    /// Append a payload for an identifier, checking its type
    pub fn insert(&mut self, id: PropertyId, value: PropertyValue) -> Result<()> {
        self.push(Property::new(id, value)?);
        Ok(())
    }

    /// All payloads for an identifier, in insertion order
    #[must_use]
    pub fn get(&self, id: PropertyId) -> &[PropertyValue] {
        self.entries.get(&id).map_or(&[], Vec::as_slice)
    }

    /// First payload for an identifier
    #[must_use]
    pub fn first(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.get(id).first()
    }

    /// Iterate over all properties in write order
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue)> {
        self.entries
            .iter()
            .flat_map(|(id, values)| values.iter().map(move |value| (*id, value)))
    }

    /// Size of the property block content, excluding its length prefix
    #[must_use]
    pub fn size(&self) -> usize {
        self.iter().map(|(id, value)| entry_size(id, value)).sum()
    }

    /// Encoded size including the length prefix
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let size = self.size();
        var_int_size(u32::try_from(size).unwrap_or(u32::MAX)) + size
    }

    /// Write the length prefix followed by every property
    pub fn write(&self, buf: &mut BytesMut) -> Result<()> {
        write_length(buf, self.size())?;
        for (id, value) in self.iter() {
            write_var_int(buf, id.as_u32())?;
            value.write(buf)?;
        }
        Ok(())
    }

    /// Read a length-prefixed property block
    ///
    /// The block must be consumed exactly: a property that runs past the
    /// declared length fails with [`Error::BufferTooSmall`].
    pub fn read(buf: &mut Bytes) -> Result<Self> {
        let len = read_var_int(buf)? as usize;
        let mut properties = Self::new();
        if len == 0 {
            return Ok(properties);
        }

        ensure(buf, len)?;
        let mut block = buf.split_to(len);
        while !block.is_empty() {
            let raw = read_var_int(&mut block)?;
            let id = PropertyId::from_u32(raw).ok_or(Error::UnknownProperty { id: raw })?;
            let value = PropertyValue::read(id.kind(), &mut block)?;
            properties.entries.entry(id).or_default().push(value);
        }
        Ok(properties)
    }

    /// Check every identifier against the allowed-property matrix
    ///
    /// Decoding does not apply this check; callers wanting strict validation
    /// run it on the decoded packet.
    pub fn validate_for(&self, part: PacketPart) -> Result<()> {
        for (id, values) in &self.entries {
            if values.len() > allowed(part, *id) {
                return Err(Error::PropertyNotPermitted {
                    id: *id,
                    part,
                    count: values.len(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        let mut properties = Self::new();
        properties.extend(iter);
        properties
    }
}

impl Extend<Property> for Properties {
    fn extend<I: IntoIterator<Item = Property>>(&mut self, iter: I) {
        for property in iter {
            self.push(property);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(id: PropertyId, value: PropertyValue) -> Property {
        Property::new(id, value).unwrap()
    }

    #[test]
    fn test_every_identifier_roundtrips() {
        for id in PropertyId::ALL {
            assert_eq!(PropertyId::from_u32(id.as_u32()), Some(id));
        }
        assert_eq!(PropertyId::from_u32(0), None);
        assert_eq!(PropertyId::from_u32(4), None);
        assert_eq!(PropertyId::from_u32(43), None);
    }

    #[test]
    fn test_kind_table() {
        assert_eq!(PropertyId::SessionExpiryInterval.kind(), PayloadKind::UInt32);
        assert_eq!(PropertyId::UserProperty.kind(), PayloadKind::KeyValue);
        assert_eq!(PropertyId::SubscriptionIdentifier.kind(), PayloadKind::VarInt);
        assert_eq!(PropertyId::MaximumQoS.kind(), PayloadKind::Byte);
        assert_eq!(PropertyId::AssignedClientIdentifier.kind(), PayloadKind::String);
        assert_eq!(PropertyId::CorrelationData.kind(), PayloadKind::Binary);
        assert_eq!(PropertyId::TopicAlias.kind(), PayloadKind::UInt16);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let result = Property::new(PropertyId::SessionExpiryInterval, PropertyValue::UInt16(10));
        assert!(matches!(
            result,
            Err(Error::PropertyKindMismatch {
                expected: PayloadKind::UInt32,
                found: PayloadKind::UInt16,
                ..
            })
        ));
    }

    #[test]
    fn test_var_int_payload_overflow_rejected() {
        let result = Property::new(
            PropertyId::SubscriptionIdentifier,
            PropertyValue::VarInt(MAX_VAR_INT + 1),
        );
        assert!(matches!(result, Err(Error::VarIntOverflow { .. })));
    }

    #[test]
    fn test_empty_block() {
        let properties = Properties::new();
        let mut buf = BytesMut::new();
        properties.write(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0]);
        assert_eq!(properties.encoded_len(), 1);

        let mut bytes = buf.freeze();
        assert!(Properties::read(&mut bytes).unwrap().is_empty());
    }

    #[test]
    fn test_write_known_layout() {
        let properties: Properties = [
            Property::user("key", "value"),
            prop(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(10_000)),
        ]
        .into_iter()
        .collect();

        let mut buf = BytesMut::new();
        properties.write(&mut buf).unwrap();
        assert_eq!(
            buf.as_ref(),
            &[
                16, 11, 144, 78, 38, 0, 3, b'k', b'e', b'y', 0, 5, b'v', b'a', b'l', b'u', b'e'
            ]
        );
        assert_eq!(buf.len(), properties.encoded_len());
    }

    #[test]
    fn test_repeated_identifier_keeps_order() {
        let properties: Properties = [
            Property::user("b", "2"),
            prop(PropertyId::SessionExpiryInterval, PropertyValue::UInt32(100)),
            Property::user("a", "1"),
        ]
        .into_iter()
        .collect();
        assert_eq!(properties.len(), 3);

        let mut buf = BytesMut::new();
        properties.write(&mut buf).unwrap();
        let mut bytes = buf.freeze();
        let decoded = Properties::read(&mut bytes).unwrap();

        assert_eq!(decoded, properties);
        assert_eq!(
            decoded.get(PropertyId::UserProperty),
            &[
                PropertyValue::KeyValue(StringPair::new("b", "2")),
                PropertyValue::KeyValue(StringPair::new("a", "1")),
            ]
        );
    }

    #[test]
    fn test_read_consumes_exactly_declared_length() {
        let mut bytes = Bytes::from_static(&[2, 36, 1, 0xAA]);
        let properties = Properties::read(&mut bytes).unwrap();
        assert_eq!(
            properties.first(PropertyId::MaximumQoS),
            Some(&PropertyValue::Byte(1))
        );
        assert_eq!(bytes.as_ref(), &[0xAA]);
    }

    #[test]
    fn test_property_past_declared_length() {
        // declared length 3, but SessionExpiryInterval needs 1 + 4 bytes
        let mut bytes = Bytes::from_static(&[3, 17, 0, 0, 0, 10]);
        assert!(matches!(
            Properties::read(&mut bytes),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_block_longer_than_buffer() {
        let mut bytes = Bytes::from_static(&[10, 36, 1]);
        assert!(Properties::read(&mut bytes).is_err());
    }

    #[test]
    fn test_unknown_identifier() {
        let mut bytes = Bytes::from_static(&[2, 4, 0]);
        assert!(matches!(
            Properties::read(&mut bytes),
            Err(Error::UnknownProperty { id: 4 })
        ));
    }

    #[test]
    fn test_validate_for() {
        let mut properties = Properties::new();
        properties
            .insert(PropertyId::AssignedClientIdentifier, PropertyValue::String("c".into()))
            .unwrap();
        properties.push(Property::user("k", "v"));
        properties.push(Property::user("k", "v"));

        assert!(properties.validate_for(PacketPart::Connack).is_ok());
        assert!(matches!(
            properties.validate_for(PacketPart::Connect),
            Err(Error::PropertyNotPermitted {
                id: PropertyId::AssignedClientIdentifier,
                count: 1,
                ..
            })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn value_for(kind: PayloadKind) -> BoxedStrategy<PropertyValue> {
            match kind {
                PayloadKind::Byte => any::<u8>().prop_map(PropertyValue::Byte).boxed(),
                PayloadKind::UInt16 => any::<u16>().prop_map(PropertyValue::UInt16).boxed(),
                PayloadKind::UInt32 => any::<u32>().prop_map(PropertyValue::UInt32).boxed(),
                PayloadKind::VarInt => (0..=MAX_VAR_INT).prop_map(PropertyValue::VarInt).boxed(),
                PayloadKind::String => ".{0,32}".prop_map(PropertyValue::String).boxed(),
                PayloadKind::KeyValue => (".{0,16}", ".{0,16}")
                    .prop_map(|(k, v)| PropertyValue::KeyValue(StringPair::new(k, v)))
                    .boxed(),
                PayloadKind::Binary => prop::collection::vec(any::<u8>(), 0..64)
                    .prop_map(|v| PropertyValue::Binary(Bytes::from(v)))
                    .boxed(),
            }
        }

        pub(crate) fn property_strategy() -> impl Strategy<Value = Property> {
            prop::sample::select(PropertyId::ALL.to_vec()).prop_flat_map(|id| {
                value_for(id.kind()).prop_map(move |value| Property::new(id, value).unwrap())
            })
        }

        proptest! {
            /// Property: any set of typed properties roundtrips to an equal multimap
            #[test]
            fn prop_block_roundtrip(props in prop::collection::vec(property_strategy(), 0..16)) {
                let properties: Properties = props.into_iter().collect();
                let mut buf = BytesMut::new();
                properties.write(&mut buf).unwrap();
                prop_assert_eq!(buf.len(), properties.encoded_len());

                let mut bytes = buf.freeze();
                let decoded = Properties::read(&mut bytes).unwrap();
                prop_assert!(bytes.is_empty());
                prop_assert_eq!(decoded, properties);
            }
        }
    }
}
