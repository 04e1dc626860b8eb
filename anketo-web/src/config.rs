use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use anketo_core::{CodeBinding, CodeRegistry};

/// Web app configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub fhir: FhirSettings,
    pub log: LogSettings,
    pub terminology: TerminologySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FhirSettings {
    /// Base URL of the remote FHIR server.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

/// Coded-field bindings, merged over the built-in demo scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminologySettings {
    pub coded_fields: HashMap<String, CodeBinding>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for FhirSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/fhir".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration with priority: env vars > config file > defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(port) = std::env::var("ANKETO_PORT")
            && let Ok(port_num) = port.parse()
        {
            config.server.port = port_num;
        }

        if let Ok(host) = std::env::var("ANKETO_HOST") {
            config.server.host = host;
        }

        if let Ok(base_url) = std::env::var("ANKETO_FHIR_BASE") {
            config.fhir.base_url = base_url;
        }

        Ok(config)
    }

    /// Build the terminology registry: the demo defaults, overridden by
    /// whatever the config file binds.
    pub fn code_registry(&self) -> CodeRegistry {
        let mut registry = CodeRegistry::with_defaults();
        for (field, binding) in &self.terminology.coded_fields {
            registry.bind(field.clone(), binding.clone());
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.fhir.base_url, "http://localhost:8080/fhir");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_default_registry_has_demo_binding() {
        let registry = AppConfig::default().code_registry();
        assert!(registry.is_coded("severity"));
        assert!(registry.validate("severity", "6").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  port: 9999\n").unwrap();

        let config = AppConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_yaml_overrides() {
        let config = AppConfig::from_yaml(
            r#"
server:
  port: 8090
fhir:
  base_url: "https://hapi.example.org/fhir"
terminology:
  coded_fields:
    pain:
      allowed: ["0", "1", "2"]
      canonical:
        "0": "none"
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.fhir.base_url, "https://hapi.example.org/fhir");

        let registry = config.code_registry();
        assert!(registry.is_coded("pain"));
        assert!(registry.is_coded("severity"));
        assert!(registry.validate("pain", "3").is_err());
        assert_eq!(registry.translate("pain", "0"), "none");
    }
}
