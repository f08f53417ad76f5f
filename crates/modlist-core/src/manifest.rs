//! # Manifest Model
//!
//! The typed form of a mod list document:
//!
//! ```json
//! {
//!     "version": "1.20.1",
//!     "mods": [
//!         { "name": "Sodium", "source": "https://example.com/sodium.jar" }
//!     ]
//! }
//! ```
//!
//! Top-level keys other than `version` and `mods` are kept in
//! [`Manifest::extra`] and written back in the position they were read from.
//! A manifest built in code writes `version`, `mods`, then any extras.
//! Entry keys are always written as `name`, `source`, `version`, `file`.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{FileName, GameVersion, ModName, SourceUri};

/// Conventional filename of a manifest inside a mods directory.
pub const MANIFEST_FILE_NAME: &str = "mods.json";

/// A list of mods pinned to one game version.
///
/// Equality compares content only. Key order does not take part.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Target game version for the whole manifest.
    pub version: GameVersion,
    /// Mod entries in authored order.
    pub mods: Vec<ModEntry>,
    /// Unrecognized top-level properties.
    pub extra: Map<String, Value>,
    /// Top-level key order as read. Empty for manifests built in code.
    key_order: Vec<String>,
}

/// One downloadable mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    pub name: ModName,
    pub source: SourceUri,
    /// Game version this entry targets. May repeat or override the
    /// manifest-level version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<GameVersion>,
    /// Destination filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileName>,
}

impl Manifest {
    /// Create an empty manifest for a game version.
    pub fn new(version: impl Into<GameVersion>) -> Self {
        Self {
            version: version.into(),
            mods: Vec::new(),
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Append an entry at the end of the list.
    pub fn push(&mut self, entry: ModEntry) {
        self.mods.push(entry);
    }

    /// Number of mod entries.
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Returns true if the manifest lists no mods.
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }

    /// First entry with the given name.
    pub fn find(&self, name: &str) -> Option<&ModEntry> {
        self.mods.iter().find(|m| m.name.as_str() == name)
    }

    /// Names that occur more than once, each reported once, in the order
    /// their first repetition appears.
    pub fn duplicate_names(&self) -> Vec<&ModName> {
        let mut seen = std::collections::HashSet::new();
        let mut reported = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for entry in &self.mods {
            if !seen.insert(&entry.name) && reported.insert(&entry.name) {
                duplicates.push(&entry.name);
            }
        }
        duplicates
    }

    /// One-line description, e.g. `"3 mods for 1.20.1"` or `"1 mod for 1.20.1"`.
    pub fn summary(&self) -> String {
        let noun = if self.mods.len() == 1 { "mod" } else { "mods" };
        format!("{} {} for {}", self.mods.len(), noun, self.version)
    }
}

impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.mods == other.mods && self.extra == other.extra
    }
}

impl Eq for Manifest {}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.extra.len()))?;
        let mut wrote_version = false;
        let mut wrote_mods = false;

        for key in &self.key_order {
            match key.as_str() {
                "version" => {
                    map.serialize_entry("version", &self.version)?;
                    wrote_version = true;
                }
                "mods" => {
                    map.serialize_entry("mods", &self.mods)?;
                    wrote_mods = true;
                }
                other => {
                    if let Some(value) = self.extra.get(other) {
                        map.serialize_entry(other, value)?;
                    }
                }
            }
        }

        if !wrote_version {
            map.serialize_entry("version", &self.version)?;
        }
        if !wrote_mods {
            map.serialize_entry("mods", &self.mods)?;
        }
        for (key, value) in &self.extra {
            if !self.key_order.contains(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra: Map<String, Value> = Map::deserialize(deserializer)?;
        let key_order: Vec<String> = extra.keys().cloned().collect();

        let version = extra
            .remove("version")
            .ok_or_else(|| <D::Error as de::Error>::missing_field("version"))?;
        let version =
            GameVersion::deserialize(version).map_err(<D::Error as de::Error>::custom)?;

        let mods = extra
            .remove("mods")
            .ok_or_else(|| <D::Error as de::Error>::missing_field("mods"))?;
        let mods =
            Vec::<ModEntry>::deserialize(mods).map_err(<D::Error as de::Error>::custom)?;

        Ok(Self {
            version,
            mods,
            extra,
            key_order,
        })
    }
}

impl ModEntry {
    /// Entry with only the required fields set.
    pub fn new(name: impl Into<ModName>, source: SourceUri) -> Self {
        Self {
            name: name.into(),
            source,
            version: None,
            file: None,
        }
    }

    /// Set the entry-level game version.
    pub fn with_version(mut self, version: impl Into<GameVersion>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the destination filename.
    pub fn with_file(mut self, file: impl Into<FileName>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The entry's own version if set, otherwise the manifest's.
    pub fn effective_version<'a>(&'a self, manifest_version: &'a GameVersion) -> &'a GameVersion {
        self.version.as_ref().unwrap_or(manifest_version)
    }
}
