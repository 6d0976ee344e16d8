//! Topic names
//!
//! A PUBLISH topic is split on `/` into levels. Empty levels are kept, so a
//! leading or trailing separator survives a parse and display round trip.

use std::fmt;
use std::str::FromStr;

use crate::protocol::{Error, Result};

const SEPARATOR: char = '/';

/// Topic name parsed into levels
///
/// Topic names carry no wildcards; those belong to subscription filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Topic {
    levels: Vec<String>,
}

impl Topic {
    /// Parse a topic name
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidTopic`] if the name contains a wildcard
    /// character (`+` or `#`) or a NUL character.
    pub fn parse(name: &str) -> Result<Self> {
        if name.contains(['+', '#', '\0']) {
            return Err(Error::InvalidTopic(name.to_owned()));
        }
        Ok(Self {
            levels: name.split(SEPARATOR).map(str::to_owned).collect(),
        })
    }

    /// Levels in order
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Length of the topic name in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        let separators = self.levels.len().saturating_sub(1);
        self.levels.iter().map(String::len).sum::<usize>() + separators
    }

    /// Check if the topic name is the empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topic name as a single string
    #[must_use]
    pub fn name(&self) -> String {
        self.levels.join("/")
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self {
            levels: vec![String::new()],
        }
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Topic {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Topic {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.name()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.levels.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(level)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        let topic = Topic::parse("device/abc/temp").unwrap();
        assert_eq!(topic.levels(), ["device", "abc", "temp"]);
        assert_eq!(topic.len(), 15);
        assert_eq!(topic.to_string(), "device/abc/temp");
    }

    #[test]
    fn test_empty_levels_preserved() {
        let topic = Topic::parse("/will/topic/").unwrap();
        assert_eq!(topic.levels(), ["", "will", "topic", ""]);
        assert_eq!(topic.name(), "/will/topic/");
        assert_eq!(topic.len(), 12);
    }

    #[test]
    fn test_empty_topic() {
        let topic = Topic::parse("").unwrap();
        assert!(topic.is_empty());
        assert_eq!(topic, Topic::default());
    }

    #[test]
    fn test_wildcards_rejected() {
        for name in ["a/+/b", "a/#", "#", "a\0b"] {
            assert!(matches!(Topic::parse(name), Err(Error::InvalidTopic(_))));
        }
    }
}
