//! # Manifest Identity Newtypes
//!
//! Newtype wrappers for the string-valued fields of a manifest. These keep
//! a mod's name from being passed where a game version is expected, and
//! check that `source` is an absolute URI.
//!
//! Only [`SourceUri`] constrains its content. The schema places no rules on
//! names, versions or filenames beyond being strings, so neither do the
//! types.

use std::fmt;

use serde::{Deserialize, Serialize};
use fluent_uri::Uri;
use url::Url;

use crate::error::ModlistError;

/// A game version string such as `"1.20.1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameVersion(String);

/// Human-readable identifier of a mod, e.g. `"Sodium"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModName(String);

/// Local filename a mod is installed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileName(String);

macro_rules! string_newtype {
    ($ty:ident) => {
        impl $ty {
            /// Wrap a string value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Access the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype!(GameVersion);
string_newtype!(ModName);
string_newtype!(FileName);

/// Download origin of a mod.
///
/// Always an absolute URI in the RFC 3986 sense, checked with the same
/// grammar the schema's `format: uri` assertion uses. Construction goes
/// through [`SourceUri::parse`] and deserialization uses the same path.
/// The authored string is kept as-is and is what serialization writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceUri {
    raw: String,
}

impl SourceUri {
    /// Parse a source URI.
    ///
    /// # Errors
    ///
    /// Returns [`ModlistError::InvalidSourceUri`] if `raw` is not an absolute
    /// URI. Relative references such as `"not-a-uri"` or `"/mods/a.jar"`
    /// have no scheme and are rejected.
    pub fn parse(raw: &str) -> Result<Self, ModlistError> {
        Uri::<&str>::parse(raw).map_err(|e| ModlistError::InvalidSourceUri {
            uri: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// The string exactly as authored.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// WHATWG view of the URI, for callers that fetch it.
    ///
    /// `None` when the URI is valid but `url` refuses it, e.g. `"http://"`
    /// or a port above 65535.
    pub fn url(&self) -> Option<Url> {
        Url::parse(&self.raw).ok()
    }

    /// URI scheme as authored (e.g. `"https"`).
    pub fn scheme(&self) -> &str {
        self.raw.split_once(':').map_or("", |(scheme, _)| scheme)
    }

    /// Host component, if the URI has one `url` can read.
    pub fn host(&self) -> Option<String> {
        self.url()?.host_str().map(str::to_string)
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for SourceUri {
    type Error = ModlistError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SourceUri {
    type Error = ModlistError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SourceUri> for String {
    fn from(value: SourceUri) -> Self {
        value.raw
    }
}

impl std::str::FromStr for SourceUri {
    type Err = ModlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
