// ABOUTME: Declarative description of a structured output contract
// ABOUTME: Renders to JSON Schema for prompting and validates parsed payloads structurally

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Shape of a JSON value expected from the generator
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Integer { minimum: Option<i64> },
    Boolean,
    Array(Box<Schema>),
    Object(Vec<Field>),
    Nullable(Box<Schema>),
}

/// A named member of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    /// A field with a default may be omitted from the payload
    pub default: Option<Value>,
}

impl Field {
    pub fn required(name: &'static str, description: &'static str, schema: Schema) -> Self {
        Self {
            name,
            description,
            schema,
            default: None,
        }
    }

    pub fn optional(
        name: &'static str,
        description: &'static str,
        schema: Schema,
        default: Value,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String
    }

    pub fn integer() -> Self {
        Schema::Integer { minimum: None }
    }

    pub fn non_negative_integer() -> Self {
        Schema::Integer { minimum: Some(0) }
    }

    pub fn array_of(items: Schema) -> Self {
        Schema::Array(Box::new(items))
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object(fields)
    }

    pub fn nullable(inner: Schema) -> Self {
        Schema::Nullable(Box::new(inner))
    }

    /// Render as a JSON Schema document suitable for embedding in an instruction
    pub fn to_json_schema(&self) -> Value {
        match self {
            Schema::String => json!({ "type": "string" }),
            Schema::Boolean => json!({ "type": "boolean" }),
            Schema::Integer { minimum } => {
                let mut out = Map::new();
                out.insert("type".into(), json!("integer"));
                if let Some(min) = minimum {
                    out.insert("minimum".into(), json!(min));
                }
                Value::Object(out)
            }
            Schema::Array(items) => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            Schema::Nullable(inner) => {
                let mut rendered = inner.to_json_schema();
                if let Some(ty) = rendered.get("type").cloned() {
                    rendered["type"] = json!([ty, "null"]);
                }
                rendered
            }
            Schema::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut property = field.schema.to_json_schema();
                    if let Value::Object(map) = &mut property {
                        if !field.description.is_empty() {
                            map.insert("description".into(), json!(field.description));
                        }
                        if let Some(default) = &field.default {
                            map.insert("default".into(), default.clone());
                        }
                    }
                    properties.insert(field.name.to_string(), property);
                    if field.is_required() {
                        required.push(json!(field.name));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }

    /// Structural check: required fields present, JSON types conform, integer
    /// minimums honoured. Value sets of enum-like strings are not enforced and
    /// unknown fields are tolerated.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<SchemaViolation>> {
        let mut violations = Vec::new();
        self.validate_at(value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn validate_at(&self, value: &Value, path: &str, out: &mut Vec<SchemaViolation>) {
        match (self, value) {
            (Schema::Nullable(_), Value::Null) => {}
            (Schema::Nullable(inner), _) => inner.validate_at(value, path, out),
            (Schema::String, Value::String(_)) | (Schema::Boolean, Value::Bool(_)) => {}
            (Schema::Integer { minimum }, Value::Number(number)) => {
                let Some(found) = number.as_i64() else {
                    // u64 beyond i64 range is still an integer, anything else is not
                    if !number.is_u64() {
                        out.push(SchemaViolation::mismatch(path, self, value));
                    }
                    return;
                };
                if let Some(min) = minimum {
                    if found < *min {
                        out.push(SchemaViolation {
                            path: display_path(path),
                            kind: ViolationKind::BelowMinimum {
                                minimum: *min,
                                found,
                            },
                        });
                    }
                }
            }
            (Schema::Array(items), Value::Array(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    items.validate_at(element, &format!("{}/{}", path, index), out);
                }
            }
            (Schema::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let field_path = format!("{}/{}", path, field.name);
                    match map.get(field.name) {
                        Some(member) => field.schema.validate_at(member, &field_path, out),
                        None if field.is_required() => out.push(SchemaViolation {
                            path: field_path,
                            kind: ViolationKind::MissingField,
                        }),
                        None => {}
                    }
                }
            }
            _ => out.push(SchemaViolation::mismatch(path, self, value)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Schema::String => "string",
            Schema::Integer { .. } => "integer",
            Schema::Boolean => "boolean",
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
            Schema::Nullable(inner) => inner.type_name(),
        }
    }
}

/// One structural mismatch, located by a JSON-pointer style path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingField,
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    BelowMinimum {
        minimum: i64,
        found: i64,
    },
    /// Structurally valid JSON that still could not be bound to the typed model
    Deserialization(String),
}

impl SchemaViolation {
    fn mismatch(path: &str, expected: &Schema, value: &Value) -> Self {
        Self {
            path: display_path(path),
            kind: ViolationKind::TypeMismatch {
                expected: expected.type_name(),
                found: json_type_name(value),
            },
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        Self {
            path: "/".to_string(),
            kind: ViolationKind::Deserialization(message.into()),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::MissingField => write!(f, "{}: required field is missing", self.path),
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.path, expected, found)
            }
            ViolationKind::BelowMinimum { minimum, found } => {
                write!(f, "{}: {} is below the minimum of {}", self.path, found, minimum)
            }
            ViolationKind::Deserialization(message) => write!(f, "{}: {}", self.path, message),
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A typed output shape that can describe itself to the generator
pub trait SchemaContract: Serialize + DeserializeOwned {
    /// Name used in instructions and error messages
    const NAME: &'static str;

    fn schema() -> Schema;
}
