//! Process-wide codec counters
//!
//! Counters are plain relaxed atomics, so recording is cheap enough to stay
//! on the encode and decode paths.

use std::sync::atomic::{AtomicU64, Ordering};

use super::PacketType;

static ENCODED_PACKETS: AtomicU64 = AtomicU64::new(0);
static DECODED_PACKETS: AtomicU64 = AtomicU64::new(0);
static ENCODED_BYTES: AtomicU64 = AtomicU64::new(0);
static DECODED_BYTES: AtomicU64 = AtomicU64::new(0);
static ENCODE_ERRORS: AtomicU64 = AtomicU64::new(0);
static DECODE_ERRORS: AtomicU64 = AtomicU64::new(0);

struct PacketTypeCounters {
    connect: AtomicU64,
    connack: AtomicU64,
    publish: AtomicU64,
    subscribe: AtomicU64,
    suback: AtomicU64,
    disconnect: AtomicU64,
}

static DECODED_BY_TYPE: PacketTypeCounters = PacketTypeCounters::new();

impl PacketTypeCounters {
    const fn new() -> Self {
        Self {
            connect: AtomicU64::new(0),
            connack: AtomicU64::new(0),
            publish: AtomicU64::new(0),
            subscribe: AtomicU64::new(0),
            suback: AtomicU64::new(0),
            disconnect: AtomicU64::new(0),
        }
    }

    fn counter(&self, packet_type: PacketType) -> Option<&AtomicU64> {
        match packet_type {
            PacketType::Connect => Some(&self.connect),
            PacketType::Connack => Some(&self.connack),
            PacketType::Publish => Some(&self.publish),
            PacketType::Subscribe => Some(&self.subscribe),
            PacketType::Suback => Some(&self.suback),
            PacketType::Disconnect => Some(&self.disconnect),
            _ => None,
        }
    }
}

/// Direction of a codec operation
#[derive(Clone, Copy)]
pub(crate) enum Direction {
    Encode,
    Decode,
}

#[inline]
pub(crate) fn record_packet(direction: Direction, packet_type: PacketType, len: usize) {
    let len = u64::try_from(len).unwrap_or(u64::MAX);
    match direction {
        Direction::Encode => {
            ENCODED_PACKETS.fetch_add(1, Ordering::Relaxed);
            ENCODED_BYTES.fetch_add(len, Ordering::Relaxed);
        }
        Direction::Decode => {
            DECODED_PACKETS.fetch_add(1, Ordering::Relaxed);
            DECODED_BYTES.fetch_add(len, Ordering::Relaxed);
            if let Some(counter) = DECODED_BY_TYPE.counter(packet_type) {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[inline]
pub(crate) fn record_error(direction: Direction) {
    match direction {
        Direction::Encode => ENCODE_ERRORS.fetch_add(1, Ordering::Relaxed),
        Direction::Decode => DECODE_ERRORS.fetch_add(1, Ordering::Relaxed),
    };
}

/// Read the current counter values
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        encoded_packets: ENCODED_PACKETS.load(Ordering::Relaxed),
        decoded_packets: DECODED_PACKETS.load(Ordering::Relaxed),
        encoded_bytes: ENCODED_BYTES.load(Ordering::Relaxed),
        decoded_bytes: DECODED_BYTES.load(Ordering::Relaxed),
        encode_errors: ENCODE_ERRORS.load(Ordering::Relaxed),
        decode_errors: DECODE_ERRORS.load(Ordering::Relaxed),
        decoded_connect: DECODED_BY_TYPE.connect.load(Ordering::Relaxed),
        decoded_connack: DECODED_BY_TYPE.connack.load(Ordering::Relaxed),
        decoded_publish: DECODED_BY_TYPE.publish.load(Ordering::Relaxed),
        decoded_subscribe: DECODED_BY_TYPE.subscribe.load(Ordering::Relaxed),
        decoded_suback: DECODED_BY_TYPE.suback.load(Ordering::Relaxed),
        decoded_disconnect: DECODED_BY_TYPE.disconnect.load(Ordering::Relaxed),
    }
}

/// Point-in-time copy of the codec counters
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Packets encoded successfully
    pub encoded_packets: u64,
    /// Packets decoded successfully
    pub decoded_packets: u64,
    /// Total bytes of encoded packets
    pub encoded_bytes: u64,
    /// Total bytes of decoded packets
    pub decoded_bytes: u64,
    /// Failed encode attempts
    pub encode_errors: u64,
    /// Failed decode attempts
    pub decode_errors: u64,
    /// CONNECT packets decoded
    pub decoded_connect: u64,
    /// CONNACK packets decoded
    pub decoded_connack: u64,
    /// PUBLISH packets decoded
    pub decoded_publish: u64,
    /// SUBSCRIBE packets decoded
    pub decoded_subscribe: u64,
    /// SUBACK packets decoded
    pub decoded_suback: u64,
    /// DISCONNECT packets decoded
    pub decoded_disconnect: u64,
}

impl MetricsSnapshot {
    /// Average encoded packet size in bytes
    #[must_use]
    pub fn avg_encoded_len(&self) -> Option<u64> {
        average(self.encoded_bytes, self.encoded_packets)
    }

    /// Average decoded packet size in bytes
    #[must_use]
    pub fn avg_decoded_len(&self) -> Option<u64> {
        average(self.decoded_bytes, self.decoded_packets)
    }
}

fn average(total: u64, count: u64) -> Option<u64> {
    total.checked_div(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    // counters are process-wide and other tests run concurrently, so only
    // lower bounds are checked
    #[test]
    fn test_record_packet() {
        let before = snapshot();
        record_packet(Direction::Decode, PacketType::Suback, 10);
        record_packet(Direction::Encode, PacketType::Suback, 10);
        record_error(Direction::Decode);
        let after = snapshot();

        assert!(after.decoded_packets > before.decoded_packets);
        assert!(after.decoded_suback > before.decoded_suback);
        assert!(after.encoded_bytes >= before.encoded_bytes + 10);
        assert!(after.decode_errors > before.decode_errors);
    }

    #[test]
    fn test_average() {
        let snapshot = MetricsSnapshot {
            encoded_packets: 4,
            encoded_bytes: 100,
            ..MetricsSnapshot::default()
        };
        assert_eq!(snapshot.avg_encoded_len(), Some(25));
        assert_eq!(snapshot.avg_decoded_len(), None);
    }
}
