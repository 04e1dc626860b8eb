use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnketoError, Result};

/// Typed view over a FHIR resource body.
///
/// Only the envelope fields are modeled; everything else stays in `rest`
/// as raw JSON, since the remote server owns the full schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(flatten)]
    pub rest: Value,
}

/// Server-assigned resource metadata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(rename = "versionId", skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Resource {
    pub fn from_value(value: Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The server-assigned id, required after a successful create.
    pub fn require_id(&self) -> Result<&str> {
        self.id.as_deref().ok_or(AnketoError::MissingField("id"))
    }

    /// The `lastUpdated` instant truncated to its date part.
    pub fn updated_date(&self) -> Option<&str> {
        let ts = self.meta.as_ref()?.last_updated.as_deref()?;
        Some(ts.get(..10).unwrap_or(ts))
    }
}

/// Flatten a searchset Bundle into its entry resources.
pub fn bundle_resources(bundle: &Value) -> Vec<&Value> {
    bundle
        .get("entry")
        .and_then(|e| e.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("resource"))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_created_patient() {
        let body = json!({
            "resourceType": "Patient",
            "id": "123",
            "meta": {"versionId": "1", "lastUpdated": "2026-02-01T09:30:00Z"},
            "name": [{"family": "Doe", "given": ["Jane"]}]
        });

        let resource = Resource::from_value(body).unwrap();
        assert_eq!(resource.resource_type, "Patient");
        assert_eq!(resource.require_id().unwrap(), "123");
        assert_eq!(resource.updated_date(), Some("2026-02-01"));
    }

    #[test]
    fn test_require_id_missing() {
        let resource = Resource::from_value(json!({"resourceType": "Patient"})).unwrap();
        assert!(resource.require_id().is_err());
    }

    #[test]
    fn test_bundle_resources() {
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"resource": {"resourceType": "Patient", "id": "b"}}
            ]
        });

        let resources = bundle_resources(&bundle);
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1]["id"], "b");
    }

    #[test]
    fn test_bundle_without_entries() {
        let bundle = json!({"resourceType": "Bundle", "type": "searchset", "total": 0});
        assert!(bundle_resources(&bundle).is_empty());
    }
}
