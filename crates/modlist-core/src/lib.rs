//! # modlist-core — Foundational Types for Mod List Manifests
//!
//! A manifest pins a list of game modifications ("mods") to one game
//! version. This crate defines the typed model of that document and the
//! operations that do not need a schema engine.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for manifest primitives.** `GameVersion`, `ModName`,
//!    `FileName` and `SourceUri` are distinct types. A `SourceUri` can only
//!    be built from a string that parses as an absolute URI, so a typed
//!    `Manifest` never holds a malformed source.
//!
//! 2. **Order is data.** `Manifest::mods` keeps sequence position exactly as
//!    authored; nothing in this crate sorts or deduplicates entries.
//!
//! 3. **Stable on-disk format.** [`format::to_pretty_json`] writes manifests
//!    with four-space indentation and a fixed key order so files written by
//!    earlier tooling round-trip unchanged.
//!
//! 4. **The schema stays permissive.** Name uniqueness and version agreement
//!    are not schema rules. [`policy::ManifestPolicy`] lets a consumer opt
//!    into them.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `modlist-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod format;
pub mod identity;
pub mod manifest;
pub mod policy;

// Re-export primary types for ergonomic imports.
pub use error::ModlistError;
pub use format::{from_json_str, read_manifest, to_pretty_json, write_manifest};
pub use identity::{FileName, GameVersion, ModName, SourceUri};
pub use manifest::{Manifest, ModEntry, MANIFEST_FILE_NAME};
pub use policy::{ManifestPolicy, PolicyRule, PolicyViolation};
