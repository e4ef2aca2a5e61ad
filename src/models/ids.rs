//! National player identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when a national identifier has the wrong shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid national identifier {0:?} (expected two lowercase letters and five digits, e.g. \"fr12345\")")]
pub struct InvalidPlayerId(pub String);

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]{2}\d{5}$").expect("identifier pattern compiles"))
}

/// A national player number in the `aa11111` format.
///
/// Validated at construction, so any `PlayerId` held by the engine is
/// well-formed — including ids read back from persisted records, which go
/// through the same check during deserialization.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Validate and wrap a national identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidPlayerId> {
        let id = id.into();
        if id_pattern().is_match(&id) {
            Ok(Self(id))
        } else {
            Err(InvalidPlayerId(id))
        }
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = InvalidPlayerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = InvalidPlayerId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}
