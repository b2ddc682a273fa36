//! Loading and writing configuration documents
//!
//! Engine specifications and process configurations are plain serde types;
//! this module only picks the syntax and maps failures to `ExError`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use procedit_core::{EngineSpec, ProcessConfig};

use crate::errors::{io_error, parse_error, render_error, Result};
use crate::format::Format;

fn parse<T: DeserializeOwned>(document: &str, content: &str, format: Format) -> Result<T> {
    match format {
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(document, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(document, e)),
    }
}

fn render<T: Serialize>(value: &T, format: Format) -> Result<String> {
    match format {
        Format::Yaml => serde_yaml::to_string(value).map_err(render_error),
        Format::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(render_error),
    }
}

fn read(path: &Path) -> Result<(String, Format)> {
    let format = Format::from_path(path)?;
    let content =
        fs::read_to_string(path).map_err(|e| io_error("read", &path.display().to_string(), e))?;
    Ok((content, format))
}

/// Parse an engine specification from a string
///
/// # Errors
/// `Serialization` if the document does not match the specification shape.
pub fn parse_spec_str(content: &str, format: Format) -> Result<EngineSpec> {
    parse("engine specification", content, format)
}

/// Load an engine specification, picking the syntax from the extension
///
/// # Errors
/// `Io` if the file cannot be read, `Serialization` for bad content or an
/// unsupported extension.
pub fn load_spec_file(path: &Path) -> Result<EngineSpec> {
    let (content, format) = read(path)?;
    let spec = parse_spec_str(&content, format)?;
    tracing::debug!(path = %path.display(), types = spec.types.len(), "engine specification loaded");
    Ok(spec)
}

/// Parse a process configuration from a string
///
/// # Errors
/// `Serialization` if the document does not match the configuration shape.
pub fn parse_config_str(content: &str, format: Format) -> Result<ProcessConfig> {
    parse("process configuration", content, format)
}

/// Load a process configuration, picking the syntax from the extension
///
/// # Errors
/// `Io` if the file cannot be read, `Serialization` for bad content or an
/// unsupported extension.
pub fn load_config_file(path: &Path) -> Result<ProcessConfig> {
    let (content, format) = read(path)?;
    let config = parse_config_str(&content, format)?;
    tracing::debug!(path = %path.display(), process = %config.name, "process configuration loaded");
    Ok(config)
}

/// Render a process configuration as text
///
/// # Errors
/// `Serialization` if the serializer fails.
pub fn render_config(config: &ProcessConfig, format: Format) -> Result<String> {
    render(config, format)
}

/// Write a process configuration, picking the syntax from the extension
///
/// # Errors
/// `Io` if the file cannot be written, `Serialization` for an unsupported
/// extension.
pub fn write_config_file(path: &Path, config: &ProcessConfig) -> Result<()> {
    let format = Format::from_path(path)?;
    let content = render_config(config, format)?;
    fs::write(path, content).map_err(|e| io_error("write", &path.display().to_string(), e))?;
    tracing::info!(path = %path.display(), process = %config.name, "process configuration written");
    Ok(())
}
