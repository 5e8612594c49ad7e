//! # Configuration Validation
//!
//! Candidate configurations are checked against a component's compiled
//! schema (Draft 2020-12, `format` assertions on). The outcome is a
//! [`ValidationResult`] listing every violation rather than the first one,
//! so a user can fix a configuration in a single pass.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;

/// Compile a schema document the way every registry schema is compiled.
pub(crate) fn compile(document: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .should_validate_formats(true)
        .build(document)
        .map_err(|e| e.to_string())
}

/// Check `instance` and collect every violation.
pub(crate) fn check(validator: &Validator, instance: &Value) -> ValidationResult {
    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();
    ValidationResult {
        valid: violations.is_empty(),
        violations,
    }
}

/// One way a configuration fails its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value; empty for the document root.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected it.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation points at `instance_path` or below it.
    /// Matching is per pointer segment: `/port` does not cover `/portal`.
    pub fn mentions(&self, instance_path: &str) -> bool {
        self.violations.iter().any(|v| {
            v.instance_path
                .strip_prefix(instance_path)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Validator {
        compile(&json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "port": {"type": "integer"},
                "timeout": {"type": "string", "pattern": "^[0-9]+(ns|us|µs|ms|s|m|h)$"},
                "since": {"type": "string", "format": "date-time"}
            },
            "required": ["port"]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_instance() {
        let result = check(&schema(), &json!({"port": 8080, "timeout": "5s"}));
        assert!(result.is_valid());
        assert!(result.violations().is_empty());
        assert_eq!(result.to_string(), "valid");
    }

    #[test]
    fn test_collects_every_violation() {
        let result = check(&schema(), &json!({"port": "high", "timeout": "soon"}));
        assert!(!result.is_valid());
        assert_eq!(result.violations().len(), 2);
        assert!(result.mentions("/port"));
        assert!(result.mentions("/timeout"));
    }

    #[test]
    fn test_missing_required_reported_at_root() {
        let result = check(&schema(), &json!({}));
        assert!(!result.is_valid());
        assert!(result.to_string().starts_with("(root): "));
    }

    #[test]
    fn test_format_is_asserted() {
        let result = check(&schema(), &json!({"port": 1, "since": "yesterday"}));
        assert!(result.mentions("/since"));
    }

    #[test]
    fn test_mentions_matches_whole_segments() {
        let result = ValidationResult {
            valid: false,
            violations: vec![Violation {
                instance_path: "/portal/hosts/0".to_string(),
                schema_path: "/properties/portal/properties/hosts/items/type".to_string(),
                message: "7 is not of type \"string\"".to_string(),
            }],
        };
        assert!(result.mentions("/portal"));
        assert!(result.mentions("/portal/hosts"));
        assert!(result.mentions("/portal/hosts/0"));
        assert!(result.mentions(""));
        assert!(!result.mentions("/port"));
        assert!(!result.mentions("/portal/host"));
    }

    #[test]
    fn test_uncompilable_schema() {
        assert!(compile(&json!({"type": 12})).is_err());
    }
}
