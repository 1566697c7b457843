use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const TEXT_FIELD: &str = "text";

// Bounds on the trimmed text, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            min_chars: 1,
            max_chars: 500,
        }
    }
}

// A draft posting accepted for enhancement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    pub text: String,
}

/// Flattened breakdown of what was wrong with a request body.
///
/// Serialized in the shape the board UI already understands:
/// `{"formErrors": [...], "fieldErrors": {"text": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.to_string(), vec![message.into()]);
        Self {
            field_errors,
            ..Default::default()
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut messages = self.form_errors.iter().cloned().collect::<Vec<_>>();
        for (field, errors) in &self.field_errors {
            for err in errors {
                messages.push(format!("{}: {}", field, err));
            }
        }
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

// Parse a raw request body, malformed JSON is a form-level error
pub fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|_| ValidationError::form("Request body must be valid JSON."))
}

pub fn validate(input: &Value, limits: TextLimits) -> Result<EnhancementRequest, ValidationError> {
    let object = input
        .as_object()
        .ok_or_else(|| ValidationError::form("Expected a JSON object."))?;

    let raw = match object.get(TEXT_FIELD) {
        None | Some(Value::Null) => return Err(ValidationError::field(TEXT_FIELD, "Required")),
        Some(Value::String(s)) => s,
        Some(_) => return Err(ValidationError::field(TEXT_FIELD, "Expected string.")),
    };

    let text = raw.trim();
    let chars = text.chars().count();

    if chars == 0 {
        return Err(ValidationError::field(TEXT_FIELD, "Text cannot be empty."));
    }
    if chars < limits.min_chars {
        return Err(ValidationError::field(
            TEXT_FIELD,
            format!("Text must be at least {} characters long.", limits.min_chars),
        ));
    }
    if chars > limits.max_chars {
        return Err(ValidationError::field(
            TEXT_FIELD,
            format!("Text cannot be longer than {} characters.", limits.max_chars),
        ));
    }

    Ok(EnhancementRequest {
        text: text.to_string(),
    })
}
