//! # Schema Validation
//!
//! Runtime validation of mod list manifests against JSON Schema
//! definitions (Draft 2020-12).
//!
//! ## Validation Contract
//!
//! Validation is all-or-nothing. A document either conforms, or it is
//! rejected with every violation found, each carrying the JSON Pointer of
//! the offending value (`/mods/0/source`) and the schema keyword that
//! rejected it. Format assertions are enabled, so a `source` that is not
//! a URI fails validation rather than being treated as an annotation.
//!
//! ## Schema Resolution
//!
//! The manifest schema is embedded at compile time and registered under
//! `mods.schema.json`. Schemas loaded from a directory are indexed by
//! filename. Cross-schema `$ref`s resolve against the loaded set only:
//! `$id` URIs of the form `https://schemas.modlist.dev/<filename>` map to
//! the file of the same name, and nothing is fetched over the network.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use modlist_core::{Manifest, ManifestPolicy, SourceUri};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Filename of the manifest schema.
pub const MANIFEST_SCHEMA: &str = "mods.schema.json";

/// URI prefix used by `$id` in this repository's schemas.
const SCHEMA_URI_PREFIX: &str = "https://schemas.modlist.dev/";

/// Schemas compiled into the crate, as `(filename, source)`.
const BUILTIN_SCHEMAS: &[(&str, &str)] = &[(
    MANIFEST_SCHEMA,
    include_str!("../../../schemas/mods.schema.json"),
)];

/// Local retriever that resolves `$ref` URIs to schemas loaded in memory.
struct LocalSchemaRetriever {
    /// Map from URI string to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self
            .schemas_by_uri
            .get(&format!("{SCHEMA_URI_PREFIX}{filename}"))
            .or_else(|| self.schemas_by_uri.get(filename))
        {
            return Ok(value.clone());
        }

        // Draft metaschemas and anything else unregistered resolve to a
        // schema that accepts everything, so validation never goes to the
        // network.
        debug!("unresolved schema reference {uri_str}, substituting an empty schema");
        Ok(serde_json::json!({}))
    }
}

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },
}

impl SchemaValidationError {
    /// Violations carried by a `ValidationFailed` error.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            SchemaValidationError::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if any violation points at `instance_path`.
    pub fn has_path(&self, instance_path: &str) -> bool {
        self.violations.iter().any(|v| v.instance_path == instance_path)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A schema validator backed by the `jsonschema` crate.
///
/// `SchemaValidator` is `Send + Sync`. Schemas are parsed once at
/// construction; validators are compiled per call.
#[derive(Debug)]
pub struct SchemaValidator {
    /// Directory the schemas were read from, if any.
    schema_dir: Option<PathBuf>,
    /// Map from schema filename (e.g., "mods.schema.json") to parsed JSON value.
    schemas: HashMap<String, Value>,
}

impl SchemaValidator {
    /// Create a validator holding the schemas compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if an embedded schema
    /// is not valid JSON.
    pub fn builtin() -> Result<Self, SchemaValidationError> {
        let mut schemas = HashMap::new();
        for (name, source) in BUILTIN_SCHEMAS {
            let value: Value = serde_json::from_str(source).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: (*name).to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?;
            schemas.insert((*name).to_string(), value);
        }

        debug!("loaded {} builtin schemas", schemas.len());
        Ok(Self {
            schema_dir: None,
            schemas,
        })
    }

    /// Create a new validator by loading all schemas from the given directory.
    ///
    /// Reads every `*.schema.json` file in `schema_dir`, parses it as JSON,
    /// and indexes it by filename.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the directory
    /// cannot be read or any schema file is not valid JSON.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| SchemaValidationError::SchemaLoadError {
                    schema_name: schema_dir.display().to_string(),
                    reason: format!("cannot list schema directory: {e}"),
                })?
                .path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".schema.json") {
                    let content = std::fs::read_to_string(&path).map_err(|e| {
                        SchemaValidationError::SchemaLoadError {
                            schema_name: name.to_string(),
                            reason: format!("cannot read schema file: {e}"),
                        }
                    })?;
                    let value: Value =
                        serde_json::from_str(&content).map_err(|e| {
                            SchemaValidationError::SchemaLoadError {
                                schema_name: name.to_string(),
                                reason: format!("invalid JSON: {e}"),
                            }
                        })?;
                    schemas.insert(name.to_string(), value);
                }
            }
        }

        debug!(
            "loaded {} schemas from {}",
            schemas.len(),
            schema_dir.display()
        );
        Ok(Self {
            schema_dir: Some(schema_dir),
            schemas,
        })
    }

    /// Returns the schema directory path, or `None` for [`builtin`](Self::builtin).
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a loaded schema by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build `ValidationOptions` with all schemas reachable for `$ref`.
    ///
    /// Each schema is registered under its canonical URI, its own `$id`,
    /// and its bare filename.
    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.should_validate_formats(true);

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &self.schemas {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());

            if let Some(id_str) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id_str.to_string(), value.clone());
            }

            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        opts
    }

    /// Build a compiled `Validator` for a specific schema by filename.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the schema is not found.
    /// Returns `SchemaValidationError::ValidatorBuildError` if the validator cannot be compiled.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, SchemaValidationError> {
        let schema_value = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: match &self.schema_dir {
                    Some(dir) => format!("schema not found in {}", dir.display()),
                    None => "schema not found among builtin schemas".to_string(),
                },
            }
        })?;

        self.build_options().build(schema_value).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` with every
    /// violation if the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema_name)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            debug!("document conforms to {schema_name}");
            Ok(())
        } else {
            debug!("document has {} violations of {schema_name}", errors.len());
            Err(SchemaValidationError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Validate a parsed JSON value against the manifest schema.
    pub fn validate_manifest(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        self.validate_document(instance, MANIFEST_SCHEMA)
    }

    /// Validate a value against the manifest schema and convert it into
    /// the typed model.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::ValidationFailed` if the schema
    /// rejects the document, or if a `source` passes the schema's format
    /// check but is not an absolute URI. Either way every offending path
    /// is reported.
    pub fn parse_manifest(&self, instance: &Value) -> Result<Manifest, SchemaValidationError> {
        self.validate_manifest(instance)?;

        let source_violations = source_uri_violations(instance);
        if !source_violations.is_empty() {
            warn!(
                "{} source URIs passed the schema but were rejected by the URI parser",
                source_violations.len()
            );
            return Err(SchemaValidationError::ValidationFailed {
                schema_name: MANIFEST_SCHEMA.to_string(),
                violations: ValidationViolations {
                    violations: source_violations,
                },
            });
        }

        serde_json::from_value(instance.clone()).map_err(|e| {
            SchemaValidationError::ValidationFailed {
                schema_name: MANIFEST_SCHEMA.to_string(),
                violations: ValidationViolations {
                    violations: vec![Violation {
                        instance_path: String::new(),
                        schema_path: String::new(),
                        message: e.to_string(),
                    }],
                },
            }
        })
    }

    /// [`parse_manifest`](Self::parse_manifest), then check the typed
    /// manifest against `policy`. Policy failures are reported as
    /// violations with a `policy/<rule>` schema path.
    pub fn parse_manifest_with_policy(
        &self,
        instance: &Value,
        policy: &ManifestPolicy,
    ) -> Result<Manifest, SchemaValidationError> {
        let manifest = self.parse_manifest(instance)?;

        let violations: Vec<Violation> = policy
            .check(&manifest)
            .into_iter()
            .map(|v| Violation {
                schema_path: format!("policy/{}", v.rule.as_str()),
                instance_path: v.instance_path,
                message: v.message,
            })
            .collect();

        if violations.is_empty() {
            Ok(manifest)
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: MANIFEST_SCHEMA.to_string(),
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Load a manifest file, validate it, and convert it into the typed model.
    ///
    /// `.yaml`/`.yml` files are read as YAML, everything else as JSON.
    /// Violations are reported against `mods.schema.json (<path>)`.
    pub fn load_manifest(&self, path: &Path) -> Result<Manifest, SchemaValidationError> {
        let value = load_document(path)?;
        let manifest = self
            .parse_manifest(&value)
            .map_err(|e| with_document_path(e, path))?;
        debug!("loaded {} from {}", manifest.summary(), path.display());
        Ok(manifest)
    }

    /// Validate a YAML or JSON document against a schema, loading from a file path.
    ///
    /// Determines the format from the file extension (`.yaml`/`.yml` for YAML,
    /// anything else for JSON) and validates against the specified schema.
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let value = load_document(document_path)?;
        self.validate_document(&value, schema_name)
    }
}

/// Read a JSON or YAML document into a JSON value.
fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SchemaValidationError::DocumentLoadError {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
                SchemaValidationError::DocumentLoadError {
                    path: path.display().to_string(),
                    reason: format!("invalid YAML: {e}"),
                }
            })?;
            yaml_to_json_value(&yaml_value).map_err(|e| SchemaValidationError::DocumentLoadError {
                path: path.display().to_string(),
                reason: format!("YAML-to-JSON conversion failed: {e}"),
            })
        }
        _ => serde_json::from_str(&content).map_err(|e| SchemaValidationError::DocumentLoadError {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        }),
    }
}

fn with_document_path(err: SchemaValidationError, path: &Path) -> SchemaValidationError {
    match err {
        SchemaValidationError::ValidationFailed {
            schema_name,
            violations,
        } => SchemaValidationError::ValidationFailed {
            schema_name: format!("{schema_name} ({})", path.display()),
            violations,
        },
        other => other,
    }
}

/// Check every `mods[i].source` string with the same parser the typed
/// model uses. Only meaningful after schema validation has passed.
fn source_uri_violations(instance: &Value) -> Vec<Violation> {
    let Some(mods) = instance.get("mods").and_then(Value::as_array) else {
        return Vec::new();
    };

    mods.iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let source = entry.get("source")?.as_str()?;
            let err = SourceUri::parse(source).err()?;
            Some(Violation {
                instance_path: format!("/mods/{index}/source"),
                schema_path: "/$defs/mod/properties/source/format".to_string(),
                message: err.to_string(),
            })
        })
        .collect()
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Manifests use only the JSON-compatible subset of YAML. Tags are
/// dropped and non-string map keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
