//! Input validation shared by the mutating use-cases.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected request input. No state is touched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Offending fields, named as on the wire (`authorId`, `studentEmail`, ...).
    pub fields: Vec<&'static str>,
    /// Extra detail for fields that were present but malformed.
    pub detail: Option<String>,
}

impl ValidationError {
    /// Required fields that were missing or blank.
    pub fn missing(fields: Vec<&'static str>) -> Self {
        Self {
            fields,
            detail: None,
        }
    }

    /// A single field that was present but could not be used.
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            fields: vec![field],
            detail: Some(detail.into()),
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|current| *current == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "invalid {}: {detail}", self.fields.join(", ")),
            None => write!(f, "{} required", self.fields.join(" and ")),
        }
    }
}

impl Error for ValidationError {}

/// Collects the names of required fields whose values are blank.
///
/// Whitespace-only values count as blank.
pub(crate) fn require_present(
    fields: &[(&'static str, &str)],
) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing(missing))
    }
}

/// Treats `None`, empty and whitespace-only optional input alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{non_blank, require_present};

    #[test]
    fn require_present_lists_every_blank_field() {
        let err = require_present(&[("content", " "), ("authorId", ""), ("x", "ok")])
            .expect_err("blank fields must be rejected");
        assert_eq!(err.fields, vec!["content", "authorId"]);
        assert_eq!(err.to_string(), "content and authorId required");
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" a ")), Some("a"));
        assert_eq!(non_blank(None), None);
    }
}
