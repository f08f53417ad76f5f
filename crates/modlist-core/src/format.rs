//! # Manifest Formatting
//!
//! Reads and writes manifest files in the layout the existing tooling
//! produces: four-space indentation, `", "`/`": "` separators, non-ASCII
//! characters escaped as `\uXXXX`, and no trailing newline. Writing a
//! manifest that was read from such a file reproduces it byte-for-byte,
//! including any top-level keys the typed model does not know about.
//!
//! These functions do not run schema validation. Use
//! `modlist_schema::SchemaValidator::load_manifest` when the caller needs
//! path-annotated violations.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use tracing::debug;

use crate::error::ModlistError;
use crate::manifest::Manifest;

const INDENT: &[u8] = b"    ";

/// Serialize a manifest to its on-disk JSON text.
pub fn to_pretty_json(manifest: &Manifest) -> Result<String, ModlistError> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter::new());
    manifest.serialize(&mut ser)?;
    // The formatter only emits ASCII.
    String::from_utf8(buf).map_err(|e| ModlistError::Serialization(e.to_string()))
}

/// Parse manifest JSON into the typed model.
///
/// Rejects documents that lack required fields or carry a malformed
/// `source`, reporting the first problem serde encounters.
pub fn from_json_str(json: &str) -> Result<Manifest, ModlistError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a manifest file.
pub fn read_manifest(path: &Path) -> Result<Manifest, ModlistError> {
    let content = std::fs::read_to_string(path).map_err(|source| ModlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = from_json_str(&content)?;
    debug!("read {} from {}", manifest.summary(), path.display());
    Ok(manifest)
}

/// Write a manifest file, creating parent directories as needed.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), ModlistError> {
    let json = to_pretty_json(manifest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ModlistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, json).map_err(|source| ModlistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("wrote {} to {}", manifest.summary(), path.display());
    Ok(())
}

/// Pretty printer that escapes every non-ASCII character and DEL.
struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(INDENT),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object_value(writer)
    }
}
