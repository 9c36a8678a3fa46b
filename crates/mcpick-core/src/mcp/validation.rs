//! Validation of raw JSON into server definitions.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::schema::{ServerDefinition, Transport, TransportType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error("`{0}` is required")]
    Missing(&'static str),
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
    #[error("`{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("`type` must be one of stdio, sse, http (got {0})")]
    UnknownTransport(String),
    #[error("`{field}` is not allowed for {transport} servers")]
    Conflict {
        field: &'static str,
        transport: TransportType,
    },
    #[error("`estimated_tokens` must be a non-negative integer (got {0})")]
    InvalidTokens(String),
    #[error("server '{name}': {error}")]
    Entry {
        name: String,
        error: Box<ValidationError>,
    },
}

impl ValidationError {
    fn in_entry(self, name: &str) -> Self {
        ValidationError::Entry {
            name: name.to_string(),
            error: Box::new(self),
        }
    }
}

/// Validate a standalone definition, which carries its own `name`.
pub fn validate_server(raw: &Value) -> Result<ServerDefinition, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or(ValidationError::NotAnObject("server definition"))?;
    let name = match optional(obj, "name") {
        None => return Err(ValidationError::Missing("name")),
        Some(Value::String(name)) => name.trim(),
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "name".to_string(),
                expected: "a string",
            });
        }
    };
    if name.is_empty() {
        return Err(ValidationError::Empty("name"));
    }
    build_definition(name.to_string(), obj).map_err(|err| err.in_entry(name))
}

/// Validate a config entry whose name is supplied by its map key.
pub fn validate_entry(name: &str, raw: &Value) -> Result<ServerDefinition, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Empty("name").in_entry(name));
    }
    let obj = raw
        .as_object()
        .ok_or(ValidationError::NotAnObject("server entry"))
        .map_err(|err| err.in_entry(name))?;
    build_definition(name.to_string(), obj).map_err(|err| err.in_entry(name))
}

/// Validate an `mcpServers` mapping. Entry order is preserved.
pub fn validate_servers_map(raw: &Value) -> Result<Vec<ServerDefinition>, ValidationError> {
    let map = raw
        .as_object()
        .ok_or(ValidationError::NotAnObject("`mcpServers`"))?;
    map.iter()
        .map(|(name, entry)| validate_entry(name, entry))
        .collect()
}

fn build_definition(
    name: String,
    obj: &Map<String, Value>,
) -> Result<ServerDefinition, ValidationError> {
    let kind = match optional(obj, "type") {
        None => TransportType::Stdio,
        Some(Value::String(kind)) => TransportType::try_from(kind.as_str())
            .map_err(|_| ValidationError::UnknownTransport(format!("'{kind}'")))?,
        Some(other) => return Err(ValidationError::UnknownTransport(other.to_string())),
    };

    let transport = if kind.is_remote() {
        if optional(obj, "command").is_some() {
            return Err(ValidationError::Conflict {
                field: "command",
                transport: kind,
            });
        }
        if !string_list(obj, "args")?.is_empty() {
            return Err(ValidationError::Conflict {
                field: "args",
                transport: kind,
            });
        }
        let url = required_string(obj, "url")?;
        let headers = string_map(obj, "headers")?;
        Transport::remote(kind, url, headers).ok_or(ValidationError::Missing("url"))?
    } else {
        if optional(obj, "url").is_some() {
            return Err(ValidationError::Conflict {
                field: "url",
                transport: kind,
            });
        }
        Transport::Stdio {
            command: required_string(obj, "command")?,
            args: string_list(obj, "args")?,
        }
    };

    let description = match optional(obj, "description") {
        None => None,
        Some(Value::String(description)) => Some(description.clone()),
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "description".to_string(),
                expected: "a string",
            });
        }
    };

    let estimated_tokens = optional(obj, "estimated_tokens")
        .map(parse_tokens)
        .transpose()?;

    Ok(ServerDefinition {
        name,
        transport,
        env: string_map(obj, "env")?,
        description,
        estimated_tokens,
    })
}

/// Field lookup where an explicit `null` counts as absent.
fn optional<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|value| !value.is_null())
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match optional(obj, field) {
        None => Err(ValidationError::Missing(field)),
        Some(Value::String(value)) => {
            let value = value.trim();
            if value.is_empty() {
                Err(ValidationError::Empty(field))
            } else {
                Ok(value.to_string())
            }
        }
        Some(_) => Err(ValidationError::WrongType {
            field: field.to_string(),
            expected: "a string",
        }),
    }
}

fn string_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, ValidationError> {
    let Some(value) = optional(obj, field) else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or_else(|| ValidationError::WrongType {
        field: field.to_string(),
        expected: "an array of strings",
    })?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::WrongType {
                    field: format!("{field}[{idx}]"),
                    expected: "a string",
                })
        })
        .collect()
}

fn string_map(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let Some(value) = optional(obj, field) else {
        return Ok(BTreeMap::new());
    };
    let entries = value.as_object().ok_or_else(|| ValidationError::WrongType {
        field: field.to_string(),
        expected: "an object of strings",
    })?;
    entries
        .iter()
        .map(|(key, value)| match value {
            Value::String(value) => Ok((key.clone(), value.clone())),
            _ => Err(ValidationError::WrongType {
                field: format!("{field}.{key}"),
                expected: "a string",
            }),
        })
        .collect()
}

fn parse_tokens(value: &Value) -> Result<u64, ValidationError> {
    match value {
        Value::Number(number) => {
            if let Some(tokens) = number.as_u64() {
                return Ok(tokens);
            }
            match number.as_f64() {
                Some(float) if float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 => {
                    Ok(float as u64)
                }
                _ => Err(ValidationError::InvalidTokens(number.to_string())),
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidTokens(format!("'{text}'"))),
        other => Err(ValidationError::InvalidTokens(other.to_string())),
    }
}
