//! Declaration-file loading: flat externals lists and deps manifests.
//!
//! Both formats produce the same list of [`Component`] records; the engine
//! does not care which parser produced them. Malformed lines are dropped
//! with a warning rather than failing the load.

use std::path::Path;
use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::{debug, warn};

use crate::errors::ManifestError;
use crate::models::Component;

/// Default externals declaration file, relative to the workdir.
pub const DEFAULT_EXTERNALS_FILE: &str = "externals.conf";

/// Declaration-file flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// One `<path> <uri>[@revision]` per line.
    Externals,
    /// `deps = { 'path': 'uri', ... }` block.
    Deps,
}

/// Load components from a declaration file.
pub fn load_components(path: &Path, format: ManifestFormat) -> Result<Vec<Component>, ManifestError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ManifestError::FileNotFound(path.display().to_string())
        } else {
            ManifestError::IoError(e)
        }
    })?;
    let components = match format {
        ManifestFormat::Externals => parse_externals(&text),
        ManifestFormat::Deps => parse_deps_manifest(&text),
    };
    debug!(
        file = %path.display(),
        count = components.len(),
        "loaded component declarations"
    );
    Ok(components)
}

/// Parse a flat externals list.
///
/// `#`-prefixed comments and blank lines are ignored; any revision rides
/// embedded in the URI (`uri@rev`) and is resolved later by the backend.
pub fn parse_externals(text: &str) -> Vec<Component> {
    let mut components = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(path), Some(uri), None) => {
                components.push(Component::new(path, uri, None));
            }
            _ => {
                warn!(lineno = lineno + 1, "dropping malformed externals line: {line}");
            }
        }
    }
    components
}

fn deps_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^deps\s*=\s*\{").expect("deps block regex"))
}

fn dep_entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^['"]([^'"]+)['"]\s*:\s*['"]([^'"]+)['"],?$"#).expect("dep entry regex")
    })
}

/// Parse the `deps = { ... }` block of a dependency manifest.
///
/// Only lines inside the block are considered; the closing `}` line ends
/// the block and everything after it is ignored.
pub fn parse_deps_manifest(text: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut in_block = false;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if !in_block {
            in_block = deps_open_regex().is_match(line);
            continue;
        }
        if line.starts_with('}') {
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match dep_entry_regex().captures(line) {
            Some(caps) => components.push(Component::new(&caps[1], &caps[2], None)),
            None => warn!(lineno = lineno + 1, "dropping malformed deps entry: {line}"),
        }
    }
    components
}
