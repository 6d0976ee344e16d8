//! CONNECT packet

use bytes::{BufMut, Bytes, BytesMut};

use super::{debug_assert_written, ensure_consumed};
use crate::protocol::error::Context;
use crate::protocol::header::write_fixed_header;
use crate::protocol::primitives::{
    binary_size, ensure, read_binary, read_string, read_u8, read_u16, string_size,
    write_binary, write_string, write_u16,
};
use crate::protocol::{
    Error, FixedHeader, MAX_CLIENT_ID_LEN, PROTOCOL_LEVEL, PROTOCOL_NAME, PacketType,
    Properties, QoS, Result,
};

/// Protocol name length, protocol name and protocol level
const VARIABLE_HEADER_PREFIX: [u8; 7] = [
    0,
    4,
    PROTOCOL_NAME[0],
    PROTOCOL_NAME[1],
    PROTOCOL_NAME[2],
    PROTOCOL_NAME[3],
    PROTOCOL_LEVEL,
];

const RESERVED: u8 = 1 << 0;
const CLEAN_START: u8 = 1 << 1;
const WILL_FLAG: u8 = 1 << 2;
const WILL_QOS_SHIFT: u8 = 3;
const WILL_RETAIN: u8 = 1 << 5;
const PASSWORD_FLAG: u8 = 1 << 6;
const USERNAME_FLAG: u8 = 1 << 7;

/// Will message published by the server if the client disconnects ungracefully
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Will {
    /// QoS used when publishing the will message
    pub qos: QoS,
    /// Publish the will message as retained
    pub retain: bool,
    /// Will properties
    pub properties: Properties,
    /// Topic the will message is published to
    pub topic: String,
    /// Will message body
    pub payload: Bytes,
}

impl Will {
    fn size(&self) -> usize {
        self.properties.encoded_len() + string_size(&self.topic) + binary_size(&self.payload)
    }
}

/// CONNECT packet
///
/// # Wire Format
///
/// ```text
/// [FIXED HEADER] [00 04 'M' 'Q' 'T' 'T' 05] [FLAGS] [KEEP ALIVE (2)] [PROPERTIES]
/// [CLIENT ID] [WILL PROPERTIES] [WILL TOPIC] [WILL PAYLOAD] [USERNAME] [PASSWORD]
/// ```
///
/// The will fields are present when the will flag is set, username and
/// password when their respective flags are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connect {
    /// Start a new session, discarding any existing one
    pub clean_start: bool,
    /// Keep alive interval in seconds
    pub keep_alive: u16,
    /// Connect properties
    pub properties: Properties,
    /// Client identifier, at most 23 bytes
    pub client_id: String,
    /// Will message
    pub will: Option<Will>,
    /// User name
    pub username: Option<String>,
    /// Password
    pub password: Option<Bytes>,
}

impl Connect {
    /// Create a CONNECT with the given client identifier
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Number of bytes following the fixed header
    #[must_use]
    pub fn remaining_length(&self) -> usize {
        let mut len = VARIABLE_HEADER_PREFIX.len() + 1 + 2;
        len += self.properties.encoded_len();
        len += string_size(&self.client_id);
        if let Some(will) = &self.will {
            len += will.size();
        }
        if let Some(username) = &self.username {
            len += string_size(username);
        }
        if let Some(password) = &self.password {
            len += binary_size(password);
        }
        len
    }

    fn connect_flags(&self) -> u8 {
        let mut flags = 0;
        if self.clean_start {
            flags |= CLEAN_START;
        }
        if let Some(will) = &self.will {
            flags |= WILL_FLAG;
            flags |= will.qos.as_u8() << WILL_QOS_SHIFT;
            if will.retain {
                flags |= WILL_RETAIN;
            }
        }
        if self.password.is_some() {
            flags |= PASSWORD_FLAG;
        }
        if self.username.is_some() {
            flags |= USERNAME_FLAG;
        }
        flags
    }

    /// Write the packet, returning the number of bytes written
    pub fn write(&self, buf: &mut BytesMut) -> Result<usize> {
        check_client_id(&self.client_id)?;

        let start = buf.len();
        let remaining = self.remaining_length();
        let header_len = write_fixed_header(buf, PacketType::Connect, 0, remaining)?;

        buf.extend_from_slice(&VARIABLE_HEADER_PREFIX);
        buf.put_u8(self.connect_flags());
        write_u16(buf, self.keep_alive);
        self.properties.write(buf).context("properties")?;

        write_string(buf, &self.client_id).context("client id")?;
        if let Some(will) = &self.will {
            will.properties.write(buf).context("will properties")?;
            write_string(buf, &will.topic).context("will topic")?;
            write_binary(buf, &will.payload).context("will payload")?;
        }
        if let Some(username) = &self.username {
            write_string(buf, username).context("username")?;
        }
        if let Some(password) = &self.password {
            write_binary(buf, password).context("password")?;
        }

        debug_assert_written!(buf, start, header_len + remaining);
        Ok(header_len + remaining)
    }

    /// Read the variable header and payload
    pub fn read(_header: FixedHeader, mut body: Bytes) -> Result<Self> {
        ensure(&body, VARIABLE_HEADER_PREFIX.len())?;
        let prefix = body.split_to(VARIABLE_HEADER_PREFIX.len());
        if prefix[..6] != VARIABLE_HEADER_PREFIX[..6] {
            return Err(Error::InvalidProtocolName(prefix[..6].to_vec()));
        }
        if prefix[6] != PROTOCOL_LEVEL {
            return Err(Error::UnsupportedProtocolLevel(prefix[6]));
        }

        let flags = read_u8(&mut body).context("connect flags")?;
        if flags & RESERVED != 0 {
            return Err(Error::ReservedBitsSet {
                field: "connect flags",
                value: flags,
            });
        }
        let has_will = flags & WILL_FLAG != 0;
        let will_qos = (flags >> WILL_QOS_SHIFT) & 0b11;
        let will_retain = flags & WILL_RETAIN != 0;
        if !has_will {
            if will_retain {
                return Err(Error::WillFlagsWithoutWill { field: "retain" });
            }
            if will_qos != 0 {
                return Err(Error::WillFlagsWithoutWill { field: "QoS" });
            }
        }
        let will_qos = QoS::from_u8(will_qos).context("will QoS")?;

        let keep_alive = read_u16(&mut body).context("keep alive")?;
        let properties = Properties::read(&mut body).context("properties")?;

        let client_id = read_string(&mut body).context("client id")?;
        check_client_id(&client_id)?;

        let will = if has_will {
            let properties = Properties::read(&mut body).context("will properties")?;
            let topic = read_string(&mut body).context("will topic")?;
            let payload = read_binary(&mut body).context("will payload")?;
            Some(Will {
                qos: will_qos,
                retain: will_retain,
                properties,
                topic,
                payload,
            })
        } else {
            None
        };

        let username = if flags & USERNAME_FLAG != 0 {
            Some(read_string(&mut body).context("username")?)
        } else {
            None
        };
        let password = if flags & PASSWORD_FLAG != 0 {
            Some(read_binary(&mut body).context("password")?)
        } else {
            None
        };

        ensure_consumed(&body)?;
        Ok(Self {
            clean_start: flags & CLEAN_START != 0,
            keep_alive,
            properties,
            client_id,
            will,
            username,
            password,
        })
    }
}

fn check_client_id(client_id: &str) -> Result<()> {
    if client_id.len() > MAX_CLIENT_ID_LEN {
        return Err(Error::ClientIdTooLong {
            len: client_id.len(),
        });
    }
    Ok(())
}
