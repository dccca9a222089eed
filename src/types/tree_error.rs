use thiserror::Error;

/// First rule violated by a creation payload. The `Display` text is what
/// clients see in the `message` field of a 400 response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("{0} must be a non-negative number")]
    Negative(&'static str),
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::Required(field) | ValidationError::Negative(field) => Some(field),
            ValidationError::WrongType { field, .. } => Some(field),
        }
    }
}
