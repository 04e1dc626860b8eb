use serde::Deserialize;

/// FHIR OperationOutcome as returned by the server on failed requests.
///
/// This client only consumes outcomes, so severity and code stay plain
/// strings; unknown codes must not break error reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<OutcomeIssue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutcomeIssue {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Parse an outcome from a raw response body, if it is one.
    pub fn parse(body: &str) -> Option<Self> {
        let outcome: Self = serde_json::from_str(body).ok()?;
        (outcome.resource_type == "OperationOutcome").then_some(outcome)
    }

    /// One-line summary of all issues.
    pub fn summary(&self) -> String {
        let parts: Vec<&str> = self
            .issue
            .iter()
            .filter_map(|issue| issue.diagnostics.as_deref().or(issue.code.as_deref()))
            .collect();
        parts.join("; ")
    }

    /// Human-readable form of a failed response body: the outcome summary
    /// when the body is an OperationOutcome, the raw text otherwise.
    pub fn summarize_body(body: &str) -> String {
        match Self::parse(body) {
            Some(outcome) => {
                let summary = outcome.summary();
                if summary.is_empty() {
                    body.to_string()
                } else {
                    summary
                }
            }
            None => body.to_string(),
        }
    }
}
