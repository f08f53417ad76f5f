//! # modlist-schema — Manifest Schema Validation
//!
//! Validates mod list manifests against the JSON Schema in
//! `schemas/mods.schema.json` and converts conforming documents into
//! [`modlist_core::Manifest`].
//!
//! - [`SchemaValidator::builtin`] — validator over the embedded manifest
//!   schema; no filesystem access needed.
//! - [`SchemaValidator::validate_manifest`] — structural check of a
//!   `serde_json::Value`, reporting every violation with its path.
//! - [`SchemaValidator::load_manifest`] — read a JSON or YAML file,
//!   validate it, and return the typed manifest.
//!
//! ## Crate Policy
//!
//! - Depends only on `modlist-core` internally.
//! - Schema `$id` URIs must not change without updating every `$ref`
//!   that points at them.
//! - Validation is all-or-nothing: there is no partial acceptance of a
//!   document with violations.

pub mod validate;

pub use validate::{
    SchemaValidationError, SchemaValidator, ValidationViolations, Violation, MANIFEST_SCHEMA,
};
