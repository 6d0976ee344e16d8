//! Packet codecs
//!
//! Each packet reads its variable header and payload from a `Bytes` holding
//! exactly the remaining length, and writes its own fixed header using a
//! remaining length computed from the same size functions the field writers
//! mirror.

mod connack;
mod connect;
mod disconnect;
mod publish;
mod suback;
mod subscribe;

pub use connack::Connack;
pub use connect::{Connect, Will};
pub use disconnect::Disconnect;
pub use publish::Publish;
pub use suback::Suback;
pub use subscribe::{RetainHandling, Subscribe, SubscriptionFilter, SubscriptionOptions};

use bytes::Bytes;

use super::{Error, Result};

/// Fail unless the packet body was consumed exactly
pub(crate) fn ensure_consumed(body: &Bytes) -> Result<()> {
    if body.is_empty() {
        Ok(())
    } else {
        Err(Error::TrailingBytes {
            remaining: body.len(),
        })
    }
}

/// Check the bytes written against the computed packet length
macro_rules! debug_assert_written {
    ($buf:expr, $start:expr, $expected:expr) => {
        debug_assert_eq!(
            $buf.len() - $start,
            $expected,
            "remaining length computation diverged from bytes written"
        )
    };
}

pub(crate) use debug_assert_written;
