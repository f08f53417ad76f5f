//! # Consistency Policy
//!
//! The manifest schema says nothing about whether two entries may share a
//! name, or whether an entry's `version` must agree with the manifest's.
//! Both are legal by default. A consumer that needs either guarantee builds
//! a [`ManifestPolicy`] and checks the typed manifest against it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;

/// Opt-in checks layered over the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestPolicy {
    /// Every mod name must appear at most once.
    pub unique_names: bool,
    /// Every mod-level `version`, when present, must equal the manifest's.
    pub matching_versions: bool,
}

/// Which policy rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    UniqueNames,
    MatchingVersions,
}

impl PolicyRule {
    /// Snake-case rule name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyRule::UniqueNames => "unique_names",
            PolicyRule::MatchingVersions => "matching_versions",
        }
    }
}

/// A single policy failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub rule: PolicyRule,
    /// JSON Pointer to the offending value, e.g. `/mods/2/name`.
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.instance_path, self.message)
    }
}

impl ManifestPolicy {
    /// Schema semantics only. Nothing beyond the schema is checked.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Every rule enabled.
    pub fn strict() -> Self {
        Self {
            unique_names: true,
            matching_versions: true,
        }
    }

    /// Check a manifest, returning every violation in document order.
    ///
    /// A repeated name is reported at each repetition, not at its first
    /// occurrence.
    pub fn check(&self, manifest: &Manifest) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for (index, entry) in manifest.mods.iter().enumerate() {
            if self.unique_names && !seen.insert(entry.name.as_str()) {
                violations.push(PolicyViolation {
                    rule: PolicyRule::UniqueNames,
                    instance_path: format!("/mods/{index}/name"),
                    message: format!("duplicate mod name {:?}", entry.name.as_str()),
                });
            }

            if self.matching_versions {
                if let Some(version) = &entry.version {
                    if version != &manifest.version {
                        violations.push(PolicyViolation {
                            rule: PolicyRule::MatchingVersions,
                            instance_path: format!("/mods/{index}/version"),
                            message: format!(
                                "mod {:?} targets {} but the manifest targets {}",
                                entry.name.as_str(),
                                version,
                                manifest.version
                            ),
                        });
                    }
                }
            }
        }

        violations
    }
}
