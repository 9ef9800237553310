use serde::Serialize;
use thiserror::Error;

/// One rejected input. `field` is `None` for form-wide errors such as a
/// password/confirmation mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

/// Every problem found in a single submission. A submission is either fully
/// valid or rejected with all of its errors at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single error attached to `field`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_field(field, message);
        errors
    }

    /// Single form-wide error.
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_form(message);
        errors
    }

    pub fn push_field(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field.to_string()),
            message: message.into(),
        });
    }

    pub fn push_form(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Messages attached to `field`, in insertion order.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field.as_deref() == Some(field))
            .map(|e| e.message.as_str())
            .collect()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ok() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
    }

    #[test]
    fn test_collects_fields_and_form_errors() {
        let mut errors = ValidationErrors::field("name", "required");
        errors.push_form("mismatch");
        errors.push_field("name", "too long");

        assert_eq!(errors.errors().len(), 3);
        assert_eq!(errors.messages_for("name"), vec!["required", "too long"]);
        assert_eq!(errors.to_string(), "3 field(s) failed validation");
        assert!(errors.into_result(()).is_err());
    }
}
