//! Allowed-property matrix
//!
//! How many times each property may appear in each packet part. The table is
//! a pure function over two closed enums, so it needs no initialisation and
//! is shared freely between threads.

use super::PropertyId;

/// Repetition count for properties that may appear any number of times
pub const UNLIMITED: usize = usize::MAX;

/// Packet or will message that can carry properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketPart {
    /// CONNECT variable header
    Connect,
    /// CONNACK variable header
    Connack,
    /// PUBLISH variable header
    Publish,
    /// PUBACK variable header
    Puback,
    /// PUBREC variable header
    Pubrec,
    /// PUBREL variable header
    Pubrel,
    /// PUBCOMP variable header
    Pubcomp,
    /// SUBSCRIBE variable header
    Subscribe,
    /// SUBACK variable header
    Suback,
    /// UNSUBSCRIBE variable header
    Unsubscribe,
    /// UNSUBACK variable header
    Unsuback,
    /// DISCONNECT variable header
    Disconnect,
    /// AUTH variable header
    Auth,
    /// Will properties in the CONNECT payload
    Will,
}

/// Number of times property `id` may appear in `part`
///
/// Zero means the property is not permitted there at all.
#[must_use]
pub const fn allowed(part: PacketPart, id: PropertyId) -> usize {
    use PacketPart as P;
    use PropertyId as Id;

    let permitted = match id {
        Id::PayloadFormatIndicator
        | Id::MessageExpiryInterval
        | Id::ContentType
        | Id::ResponseTopic
        | Id::CorrelationData => matches!(part, P::Publish | P::Will),
        Id::SubscriptionIdentifier => match part {
            // a server forwards one identifier per matching subscription
            P::Publish => return UNLIMITED,
            P::Subscribe => true,
            _ => false,
        },
        Id::SessionExpiryInterval => matches!(part, P::Connect | P::Connack | P::Disconnect),
        Id::AssignedClientIdentifier
        | Id::ServerKeepAlive
        | Id::ResponseInformation
        | Id::MaximumQoS
        | Id::RetainAvailable
        | Id::WildcardSubscriptionAvailable
        | Id::SubscriptionIdentifierAvailable
        | Id::SharedSubscriptionAvailable => matches!(part, P::Connack),
        Id::AuthenticationMethod | Id::AuthenticationData => {
            matches!(part, P::Connect | P::Connack | P::Auth)
        }
        Id::RequestProblemInformation | Id::RequestResponseInformation => {
            matches!(part, P::Connect)
        }
        Id::WillDelayInterval => matches!(part, P::Will),
        Id::ServerReference => matches!(part, P::Connack | P::Disconnect),
        Id::ReasonString => matches!(
            part,
            P::Connack
                | P::Puback
                | P::Pubrec
                | P::Pubrel
                | P::Pubcomp
                | P::Suback
                | P::Unsuback
                | P::Disconnect
                | P::Auth
        ),
        Id::ReceiveMaximum | Id::TopicAliasMaximum | Id::MaximumPacketSize => {
            matches!(part, P::Connect | P::Connack)
        }
        Id::TopicAlias => matches!(part, P::Publish),
        Id::UserProperty => return UNLIMITED,
    };

    if permitted { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_interval() {
        assert_eq!(allowed(PacketPart::Connect, PropertyId::SessionExpiryInterval), 1);
        assert_eq!(allowed(PacketPart::Connack, PropertyId::SessionExpiryInterval), 1);
        assert_eq!(allowed(PacketPart::Disconnect, PropertyId::SessionExpiryInterval), 1);
        assert_eq!(allowed(PacketPart::Publish, PropertyId::SessionExpiryInterval), 0);
    }

    #[test]
    fn test_assigned_client_identifier_only_in_connack() {
        assert_eq!(allowed(PacketPart::Connack, PropertyId::AssignedClientIdentifier), 1);
        assert_eq!(allowed(PacketPart::Connect, PropertyId::AssignedClientIdentifier), 0);
        assert_eq!(allowed(PacketPart::Will, PropertyId::AssignedClientIdentifier), 0);
    }

    #[test]
    fn test_user_property_everywhere() {
        for part in [
            PacketPart::Connect,
            PacketPart::Connack,
            PacketPart::Publish,
            PacketPart::Subscribe,
            PacketPart::Suback,
            PacketPart::Disconnect,
            PacketPart::Auth,
            PacketPart::Will,
        ] {
            assert_eq!(allowed(part, PropertyId::UserProperty), UNLIMITED);
        }
    }

    #[test]
    fn test_will_properties() {
        assert_eq!(allowed(PacketPart::Will, PropertyId::WillDelayInterval), 1);
        assert_eq!(allowed(PacketPart::Will, PropertyId::ContentType), 1);
        assert_eq!(allowed(PacketPart::Publish, PropertyId::WillDelayInterval), 0);
    }
}
