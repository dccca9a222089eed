use serde::Serialize;
use serde_json::{Map, Value};

use super::ValidationError;

/// Fields accepted when creating a tree. `id` and `createdAt` are always
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTree {
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub location: String,
    pub height: Option<f64>,
    pub description: Option<String>,
    pub is_favorite: bool,
}

impl NewTree {
    pub fn new(common_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            scientific_name: None,
            location: location.into(),
            height: None,
            description: None,
            is_favorite: false,
        }
    }

    /// Parses a raw JSON payload. Fields are checked in declaration order and
    /// the first violation is returned; unknown keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let fields = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let tree = NewTree {
            common_name: required_text(fields, "commonName")?,
            scientific_name: optional_text(fields, "scientificName")?,
            location: required_text(fields, "location")?,
            height: optional_height(fields, "height")?,
            description: optional_text(fields, "description")?,
            is_favorite: optional_flag(fields, "isFavorite")?.unwrap_or(false),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Checks the value constraints that the type system cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.common_name) {
            return Err(ValidationError::Required("commonName"));
        }
        if is_blank(&self.location) {
            return Err(ValidationError::Required("location"));
        }
        if let Some(height) = self.height {
            // NaN fails this comparison too.
            if !(height >= 0.0) {
                return Err(ValidationError::Negative("height"));
            }
        }
        Ok(())
    }

    pub fn with_scientific_name(mut self, name: impl Into<String>) -> Self {
        self.scientific_name = Some(name.into());
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn required_text(fields: &Map<String, Value>, name: &'static str) -> Result<String, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(ValidationError::Required(name)),
        Some(Value::String(s)) if is_blank(s) => Err(ValidationError::Required(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            field: name,
            expected: "a string",
        }),
    }
}

fn optional_text(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::WrongType {
            field: name,
            expected: "a string",
        }),
    }
}

fn optional_height(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(h) if h < 0.0 => Err(ValidationError::Negative(name)),
            Some(h) => Ok(Some(h)),
            None => Err(ValidationError::WrongType {
                field: name,
                expected: "a number",
            }),
        },
        Some(_) => Err(ValidationError::WrongType {
            field: name,
            expected: "a number",
        }),
    }
}

fn optional_flag(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<bool>, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::WrongType {
            field: name,
            expected: "a boolean",
        }),
    }
}
