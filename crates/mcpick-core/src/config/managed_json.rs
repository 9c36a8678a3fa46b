//! Whole-document JSON persistence with nested-map replacement.
//!
//! Every write replaces the full file: the document is serialized to a
//! temporary file in the target directory and renamed over the target.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};

/// How to treat an existing document that cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDocument {
    /// Propagate the read/parse error.
    Strict,
    /// Start from an empty document.
    Lenient,
}

/// Replace the map at `path` inside the JSON document at `config_path`,
/// keeping every other key of the document untouched.
///
/// Returns the full document as written.
pub fn replace_map_at_path(
    config_path: &Path,
    path: &[&str],
    map: Map<String, Value>,
    base: BaseDocument,
) -> anyhow::Result<Map<String, Value>> {
    if path.is_empty() {
        anyhow::bail!("Path for managed entries cannot be empty");
    }

    let mut root = match base {
        BaseDocument::Strict => load_json_map(config_path)?,
        BaseDocument::Lenient => load_json_map(config_path).unwrap_or_else(|err| {
            tracing::warn!(
                path = %config_path.display(),
                "Ignoring unreadable config, starting from an empty document: {err:#}"
            );
            Map::new()
        }),
    };

    set_map_at_path(&mut root, path, map)?;
    write_json(config_path, &root)?;
    Ok(root)
}

/// Load a JSON object document. A missing file yields an empty map.
pub fn load_json_map(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    match load_json(path)? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Expected JSON object at root: {}", path.display()),
    }
}

/// Load any JSON document. Unlike [`load_json_map`], a missing file is an error.
pub fn load_json(path: &Path) -> anyhow::Result<Value> {
    tracing::debug!(path = %path.display(), "Reading JSON document");
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
}

/// Write a value as pretty-printed JSON with atomic replace semantics.
///
/// An existing target keeps its permissions; the host config is often `0600`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;

    // Serialize first so a bad value never touches the disk
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize JSON config")?;

    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, bytes)
        .with_context(|| format!("Failed to write tmp config: {}", tmp_path.display()))?;
    if let Ok(metadata) = std::fs::metadata(path) {
        if let Err(err) = std::fs::set_permissions(&tmp_path, metadata.permissions()) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err).with_context(|| {
                format!("Failed to copy permissions onto {}", tmp_path.display())
            });
        }
    }
    if let Err(err) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(err)
            .with_context(|| format!("Failed to write config file: {}", path.display()));
    }
    tracing::debug!(path = %path.display(), "Wrote JSON document");
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "config.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

fn set_map_at_path(
    root: &mut Map<String, Value>,
    path: &[&str],
    map: Map<String, Value>,
) -> anyhow::Result<()> {
    let Some((last, parents)) = path.split_last() else {
        anyhow::bail!("Path for managed entries cannot be empty");
    };
    let mut current = root;
    for segment in parents {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if next.is_null() {
            *next = Value::Object(Map::new());
        }
        match next {
            Value::Object(map) => current = map,
            _ => anyhow::bail!("Expected '{}' to be a JSON object", segment),
        }
    }
    current.insert(last.to_string(), Value::Object(map));
    Ok(())
}
