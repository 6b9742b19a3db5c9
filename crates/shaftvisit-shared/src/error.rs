use serde::Serialize;
use thiserror::Error;

/// A required field found missing during validation.
///
/// Validation always collects every missing field before reporting, so the
/// UI can highlight all problems at once instead of the first one only.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Wire-level field name, e.g. `employeeCode` or `category`.
    pub field: &'static str,
    /// Index of the offending detail line; `None` for header-level fields.
    pub detail_index: Option<usize>,
}

impl FieldError {
    /// A missing header-level field.
    pub fn header(field: &'static str) -> Self {
        Self {
            field,
            detail_index: None,
        }
    }

    /// A missing field on the detail line at `index`.
    pub fn detail(index: usize, field: &'static str) -> Self {
        Self {
            field,
            detail_index: Some(index),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail_index {
            Some(i) => write!(f, "visitDetails[{i}].{} is required", self.field),
            None => write!(f, "{} is required", self.field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        assert_eq!(
            FieldError::header("employeeCode").to_string(),
            "employeeCode is required"
        );
        assert_eq!(
            FieldError::detail(2, "shaft").to_string(),
            "visitDetails[2].shaft is required"
        );
    }
}
