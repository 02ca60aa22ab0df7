//! Socket activation mode

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Whether the service listens on a socket handed over by the supervisor
/// (e.g. systemd) instead of binding its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketActivation {
    /// Always bind our own socket
    #[default]
    Off,
    /// Use a passed socket if there is one, otherwise bind
    May,
    /// Refuse to start without a passed socket
    Must,
}

impl SocketActivation {
    /// Token written to the configuration file
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketActivation::Off => "off",
            SocketActivation::May => "may",
            SocketActivation::Must => "must",
        }
    }
}

impl fmt::Display for SocketActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocketActivation::Off => "Off",
            SocketActivation::May => "May",
            SocketActivation::Must => "Must",
        };
        f.write_str(name)
    }
}

impl FromStr for SocketActivation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "false" => Ok(SocketActivation::Off),
            "may" | "auto" => Ok(SocketActivation::May),
            "must" | "true" => Ok(SocketActivation::Must),
            _ => Err(ConfigError::InvalidEnumValue(s.to_string())),
        }
    }
}

impl TryFrom<i64> for SocketActivation {
    type Error = ConfigError;

    fn try_from(ordinal: i64) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(SocketActivation::Off),
            1 => Ok(SocketActivation::May),
            2 => Ok(SocketActivation::Must),
            other => Err(ConfigError::InvalidEnumValue(other.to_string())),
        }
    }
}

impl Serialize for SocketActivation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct SocketActivationVisitor;

impl Visitor<'_> for SocketActivationVisitor {
    type Value = SocketActivation;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one of off, may, must (or false, auto, true)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    // YAML resolves bare true/false to booleans before we see them
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(if v {
            SocketActivation::Must
        } else {
            SocketActivation::Off
        })
    }
}

impl<'de> Deserialize<'de> for SocketActivation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SocketActivationVisitor)
    }
}
