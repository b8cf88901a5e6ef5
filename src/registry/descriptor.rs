//! Tool descriptors and argument binding.
//!
//! A descriptor pairs an input schema with an upstream operation. Binding
//! validates a caller's arguments against the schema and produces the
//! [`UpstreamRequest`] in one pass, so nothing reaches the network unless
//! every parameter checked out.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::{Map, Value, json};

use super::ApiGroup;
use super::error::{RegistryError, RegistryResult};
use crate::upstream::UpstreamRequest;

/// Value type and constraints of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer { min: i64, max: Option<i64> },
    Boolean,
    Object,
}

/// Where a parameter ends up in the upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Substituted into the `{name}` placeholder of the path template.
    Path,
    /// Sent as the named query parameter.
    Query(&'static str),
    /// `true` adds `include=all`; `false` sends nothing.
    IncludeDeleted,
    /// Sent as the JSON request body.
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: String,
    pub binding: Binding,
}

impl ParamSpec {
    fn new(name: &'static str, kind: ParamKind, binding: Binding, description: String) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description,
            binding,
        }
    }

    /// Required string substituted into the path.
    pub fn path(name: &'static str, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::String, Binding::Path, description.into()).required()
    }

    pub fn query(
        name: &'static str,
        query: &'static str,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, kind, Binding::Query(query), description.into())
    }

    pub fn include_deleted(description: impl Into<String>) -> Self {
        Self::new(
            "include_deleted",
            ParamKind::Boolean,
            Binding::IncludeDeleted,
            description.into(),
        )
        .with_default(json!(false))
    }

    /// Required JSON object sent as the request body.
    pub fn body(name: &'static str, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Object, Binding::Body, description.into()).required()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        let ty = match self.kind {
            ParamKind::String => "string",
            ParamKind::Integer { .. } => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::Object => "object",
        };
        schema.insert("type".into(), json!(ty));
        schema.insert("description".into(), json!(self.description));
        if let ParamKind::Integer { min, max } = self.kind {
            schema.insert("minimum".into(), json!(min));
            if let Some(max) = max {
                schema.insert("maximum".into(), json!(max));
            }
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        Value::Object(schema)
    }

    /// Check a supplied value against the parameter kind.
    fn check(&self, value: &Value) -> Result<(), String> {
        match self.kind {
            ParamKind::String => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("parameter '{}' must be a string", self.name))?;
                if self.binding == Binding::Path && s.trim().is_empty() {
                    return Err(format!("parameter '{}' must not be empty", self.name));
                }
            }
            ParamKind::Integer { min, max } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| format!("parameter '{}' must be an integer", self.name))?;
                match max {
                    Some(max) if n < min || n > max => {
                        return Err(format!(
                            "parameter '{}' must be between {} and {}, got {}",
                            self.name, min, max, n
                        ));
                    }
                    None if n < min => {
                        return Err(format!(
                            "parameter '{}' must be at least {}, got {}",
                            self.name, min, n
                        ));
                    }
                    _ => {}
                }
            }
            ParamKind::Boolean => {
                if !value.is_boolean() {
                    return Err(format!("parameter '{}' must be a boolean", self.name));
                }
            }
            ParamKind::Object => {
                if !value.is_object() {
                    return Err(format!("parameter '{}' must be an object", self.name));
                }
            }
        }
        Ok(())
    }
}

/// HTTP verb and path template below `/api/v1`.
///
/// Placeholders are written `{param}` and occupy a whole segment.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOperation {
    pub method: Method,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub group: ApiGroup,
    pub params: Vec<ParamSpec>,
    pub operation: UpstreamOperation,
}

impl ToolDescriptor {
    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema.insert("additionalProperties".into(), json!(false));
        schema
    }

    /// Validate `arguments` and translate them into an upstream request.
    ///
    /// `null` arguments are treated as an empty object and `null` values as
    /// absent. Defaults are filled in for absent optional parameters.
    pub fn bind(&self, arguments: &Value) -> RegistryResult<UpstreamRequest> {
        let empty = Map::new();
        let args = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(self.invalid("arguments must be a JSON object")),
        };

        if let Some(unknown) = args
            .keys()
            .find(|key| !self.params.iter().any(|p| p.name == key.as_str()))
        {
            return Err(self.invalid(format!("unknown parameter '{}'", unknown)));
        }

        let mut path_values: HashMap<&str, String> = HashMap::new();
        let mut query = Vec::new();
        let mut body = None;

        for param in &self.params {
            let value = match args.get(param.name).filter(|v| !v.is_null()) {
                Some(v) => v,
                None => match &param.default {
                    Some(default) => default,
                    None if param.required => {
                        return Err(
                            self.invalid(format!("missing required parameter '{}'", param.name))
                        );
                    }
                    None => continue,
                },
            };
            param.check(value).map_err(|reason| self.invalid(reason))?;

            match param.binding {
                Binding::Path => {
                    path_values.insert(param.name, render(value));
                }
                Binding::Query(key) => query.push((key.to_string(), render(value))),
                Binding::IncludeDeleted => {
                    if value.as_bool() == Some(true) {
                        query.push(("include".to_string(), "all".to_string()));
                    }
                }
                Binding::Body => body = Some(value.clone()),
            }
        }

        let segments = self
            .operation
            .path
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(name) => path_values
                    .remove(name)
                    .ok_or_else(|| self.invalid(format!("missing path value '{}'", name))),
                None => Ok(segment.to_string()),
            })
            .collect::<RegistryResult<Vec<_>>>()?;

        Ok(UpstreamRequest {
            method: self.operation.method.clone(),
            segments,
            query,
            body,
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> RegistryError {
        RegistryError::InvalidArguments {
            tool: self.name.clone(),
            reason: reason.into(),
        }
    }
}

pub(crate) fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
