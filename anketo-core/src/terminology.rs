use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Code binding for one coded field: the allowed raw codes and the
/// canonical form each one is stored as.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeBinding {
    pub allowed: Vec<String>,
    pub canonical: HashMap<String, String>,
}

/// Registry of coded fields, keyed by linkId.
///
/// The bindings are configuration, not a fixed table: the demo scale
/// shipped by `with_defaults` is a placeholder terminology and callers
/// may replace or extend it.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    bindings: HashMap<String, CodeBinding>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in demo binding: a `severity` field accepting codes
    /// "1" through "6", stored as named severity levels.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind("severity", CodeBinding::scale_1_to_6());
        registry
    }

    pub fn bind(&mut self, field: impl Into<String>, binding: CodeBinding) {
        self.bindings.insert(field.into(), binding);
    }

    pub fn is_coded(&self, field: &str) -> bool {
        self.bindings.contains_key(field)
    }

    /// Check a raw value against the field's binding. Fields without a
    /// binding accept anything.
    pub fn validate(&self, field: &str, raw: &str) -> Result<(), String> {
        let Some(binding) = self.bindings.get(field) else {
            return Ok(());
        };

        if binding.allowed.iter().any(|code| code == raw) {
            Ok(())
        } else {
            Err(format!(
                "code {raw:?} is not valid, allowed codes are {}",
                binding.allowed.join(", ")
            ))
        }
    }

    /// Map a raw code to its canonical stored form. Values without a
    /// mapping pass through unchanged, so canonical forms are fixpoints.
    pub fn translate(&self, field: &str, raw: &str) -> String {
        self.bindings
            .get(field)
            .and_then(|binding| binding.canonical.get(raw))
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }
}

impl CodeBinding {
    /// Codes "1".."6" with named canonical forms.
    pub fn scale_1_to_6() -> Self {
        let levels = [
            ("1", "very-low"),
            ("2", "low"),
            ("3", "moderate"),
            ("4", "high"),
            ("5", "very-high"),
            ("6", "extreme"),
        ];

        Self {
            allowed: levels.iter().map(|(code, _)| code.to_string()).collect(),
            canonical: levels
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale_accepts_one_to_six() {
        let registry = CodeRegistry::with_defaults();

        for code in ["1", "2", "3", "4", "5", "6"] {
            assert!(registry.validate("severity", code).is_ok(), "code {code}");
        }
        for code in ["0", "7", "66", "", "moderate?", "a"] {
            assert!(registry.validate("severity", code).is_err(), "code {code}");
        }
    }

    #[test]
    fn test_uncoded_field_accepts_anything() {
        let registry = CodeRegistry::with_defaults();
        assert!(!registry.is_coded("firstname"));
        assert!(registry.validate("firstname", "whatever").is_ok());
    }

    #[test]
    fn test_validation_error_names_allowed_codes() {
        let registry = CodeRegistry::with_defaults();
        let message = registry.validate("severity", "9").unwrap_err();
        assert!(message.contains("1, 2, 3, 4, 5, 6"), "{message}");
    }

    #[test]
    fn test_translate_is_idempotent() {
        let registry = CodeRegistry::with_defaults();

        for code in ["1", "2", "3", "4", "5", "6"] {
            let once = registry.translate("severity", code);
            let twice = registry.translate("severity", &once);
            assert_eq!(once, twice, "code {code}");
        }

        assert_eq!(registry.translate("severity", "3"), "moderate");
        assert_eq!(registry.translate("severity", "moderate"), "moderate");
    }

    #[test]
    fn test_configured_binding_replaces_default() {
        let mut registry = CodeRegistry::with_defaults();
        registry.bind(
            "severity",
            CodeBinding {
                allowed: vec!["a".into(), "b".into()],
                canonical: HashMap::new(),
            },
        );

        assert!(registry.validate("severity", "a").is_ok());
        assert!(registry.validate("severity", "3").is_err());
        assert_eq!(registry.translate("severity", "a"), "a");
    }
}
