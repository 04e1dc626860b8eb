use serde_json::{json, Value};

/// Demographic view over a Patient resource: the parts this client shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patient {
    pub id: Option<String>,
    pub given: Vec<String>,
    pub family: String,
}

/// One row of a patient listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
}

impl Patient {
    /// Read name parts out of a Patient resource body. Missing names
    /// degrade to empty parts, matching how little this client needs.
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(|n| n.as_array())
            .and_then(|n| n.first());

        let given = name
            .and_then(|n| n.get("given"))
            .and_then(|g| g.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let family = name
            .and_then(|n| n.get("family"))
            .and_then(|f| f.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            id: value.get("id").and_then(|i| i.as_str()).map(str::to_string),
            given,
            family,
        }
    }

    /// Request body for creating a patient with a single given name.
    pub fn build(given: &str, family: &str) -> Value {
        json!({
            "resourceType": "Patient",
            "name": [{"given": [given], "family": family}]
        })
    }

    /// "Given Family", with either part omitted when absent.
    pub fn display_name(&self) -> String {
        let mut parts: Vec<&str> = self.given.iter().map(String::as_str).collect();
        if !self.family.is_empty() {
            parts.push(&self.family);
        }
        parts.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.family.is_empty()
    }
}
