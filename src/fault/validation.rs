//! Fault request validation
//!
//! Bodies are checked against the schema of their declared type. The type
//! itself is resolved first; once a schema is selected every field is
//! checked and all problems are returned together.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use strum::VariantNames;

use super::types::*;
use crate::error::{AppError, AppResult};

pub const REQUIRED: &str = "required key not provided";
pub const EXPECTED_STR: &str = "expected str";
pub const EXPECTED_INT: &str = "expected int";
pub const EXPECTED_FLOAT: &str = "expected float";
pub const EMPTY_STR: &str = "length of value must be at least 1";
pub const EXTRA_KEY: &str = "extra keys not allowed";
pub const UNSAFE_STR: &str = "contains characters not allowed in a command argument";

/// Field path to message, for every violation found in one request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Message returned when the `type` field is missing or unknown
pub fn allowed_types_message() -> String {
    format!(
        "must be present and one of [{}]",
        FaultType::VARIANTS.join(", ")
    )
}

/// Resolve the declared fault type of a request body
pub fn fault_type_of(body: &Value) -> AppResult<FaultType> {
    body.get("type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| AppError::UnknownFaultType(allowed_types_message()))
}

/// Validate a request body and turn it into a typed fault
pub fn validate(body: &Value) -> AppResult<Fault> {
    let fault_type = fault_type_of(body)?;

    let empty = Map::new();
    let mut fields = FieldReader::new(body.as_object().unwrap_or(&empty));
    fields.allow("type");

    let target = read_target(&mut fields);
    let kind = match fault_type {
        FaultType::NetworkFailure => Some(FaultKind::NetworkFailure),
        FaultType::ServiceFailure => Some(FaultKind::ServiceFailure),
        FaultType::FirewallTimeout => fields
            .required_int("timeout")
            .map(|timeout| FaultKind::FirewallTimeout { timeout }),
        FaultType::Delay => read_delay(&mut fields).map(FaultKind::Delay),
        FaultType::PacketLoss => read_packet_loss(&mut fields).map(FaultKind::PacketLoss),
    };

    let errors = fields.finish();
    match (target, kind) {
        (Some(target), Some(kind)) if errors.is_empty() => Ok(Fault { target, kind }),
        _ => Err(AppError::Validation(errors)),
    }
}

fn read_target(fields: &mut FieldReader<'_>) -> Option<FaultTarget> {
    let name = fields.required_str("name").and_then(|name| {
        if name.is_empty() {
            fields.reject("name", EMPTY_STR);
            None
        } else {
            Some(name)
        }
    });
    let direction = fields.required_str("direction").and_then(|raw| {
        match raw.parse::<Direction>() {
            Ok(direction) => Some(direction),
            Err(_) => {
                let message = format!(
                    "'{}' is not one of [{}]",
                    raw,
                    Direction::VARIANTS.join(", ")
                );
                fields.reject("direction", message);
                None
            }
        }
    });
    let to_port = fields.required_int("to_port");
    let from = fields.optional_arg("from", is_host_char);
    let to = fields.optional_arg("to", is_host_char);
    let protocol = fields
        .optional_arg("protocol", is_word_char)
        .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());

    Some(FaultTarget {
        name: name?,
        direction: direction?,
        to_port: to_port?,
        from,
        to,
        protocol,
    })
}

fn read_delay(fields: &mut FieldReader<'_>) -> Option<DelayParams> {
    let delay = fields.required_int("delay");
    let variance = fields.optional_int("variance");
    let correlation = fields.optional_int("correlation");
    let distribution = fields.optional_arg("distribution", is_word_char);
    let probability = fields.optional_float("probability");

    Some(DelayParams {
        delay: delay?,
        variance,
        correlation,
        distribution,
        probability,
    })
}

fn read_packet_loss(fields: &mut FieldReader<'_>) -> Option<PacketLossParams> {
    let probability = fields.optional_float("probability");
    let correlation = fields.optional_int("correlation");

    Some(PacketLossParams {
        probability,
        correlation,
    })
}

/// Hostnames, addresses and CIDR blocks
fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '/' | '-' | '_')
}

/// Protocol and distribution table names
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_')
}

/// Typed field access over a JSON object that records every violation.
///
/// Each accessor marks its key as part of the schema; `finish` reports any
/// remaining keys as extras.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    allowed: BTreeSet<&'static str>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            allowed: BTreeSet::new(),
            errors: ValidationErrors::default(),
        }
    }

    fn allow(&mut self, key: &'static str) {
        self.allowed.insert(key);
    }

    fn reject(&mut self, key: &str, message: impl Into<String>) {
        self.errors.add(key, message);
    }

    fn lookup(&mut self, key: &'static str, required: bool) -> Option<&'a Value> {
        self.allow(key);
        let object = self.object;
        let value = object.get(key);
        if value.is_none() && required {
            self.reject(key, REQUIRED);
        }
        value
    }

    fn read<T>(
        &mut self,
        key: &'static str,
        required: bool,
        convert: fn(&Value) -> Option<T>,
        expected: &str,
    ) -> Option<T> {
        let value = self.lookup(key, required)?;
        let converted = convert(value);
        if converted.is_none() {
            self.reject(key, expected);
        }
        converted
    }

    fn required_str(&mut self, key: &'static str) -> Option<String> {
        self.read(key, true, as_string, EXPECTED_STR)
    }

    fn optional_str(&mut self, key: &'static str) -> Option<String> {
        self.read(key, false, as_string, EXPECTED_STR)
    }

    /// Optional string that is spliced into a shell command, so it must be
    /// non-empty and made only of `allowed` characters.
    fn optional_arg(&mut self, key: &'static str, allowed: fn(char) -> bool) -> Option<String> {
        let value = self.optional_str(key)?;
        if value.is_empty() || !value.chars().all(allowed) {
            self.reject(key, UNSAFE_STR);
            return None;
        }
        Some(value)
    }

    fn required_int(&mut self, key: &'static str) -> Option<i64> {
        self.read(key, true, Value::as_i64, EXPECTED_INT)
    }

    fn optional_int(&mut self, key: &'static str) -> Option<i64> {
        self.read(key, false, Value::as_i64, EXPECTED_INT)
    }

    fn optional_float(&mut self, key: &'static str) -> Option<f64> {
        self.read(key, false, Value::as_f64, EXPECTED_FLOAT)
    }

    fn finish(mut self) -> ValidationErrors {
        let object = self.object;
        let extras: Vec<&String> = object
            .keys()
            .filter(|key| !self.allowed.contains(key.as_str()))
            .collect();
        for key in extras {
            self.errors.add(key, EXTRA_KEY);
        }
        self.errors
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
