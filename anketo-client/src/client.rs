use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use anketo_core::{bundle_resources, OperationOutcome, Patient, PatientSummary, Resource};

use crate::error::{ClientError, Result};

const FHIR_JSON: &str = "application/fhir+json";

/// Typed client for the remote FHIR endpoint.
///
/// Every method is a single request/response exchange against the
/// configured base URL: no caching, no retries. Transient failures
/// surface immediately as a `ClientError`.
#[derive(Debug, Clone)]
pub struct FhirClient {
    base_url: String,
    http: reqwest::Client,
}

impl FhirClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Canonical URL of an uploaded questionnaire, as referenced from
    /// its responses.
    pub fn questionnaire_url(&self, questionnaire_id: &str) -> String {
        self.url(&format!("Questionnaire/{questionnaire_id}"))
    }

    /// POST /Patient — returns the new server-assigned id.
    pub async fn create_patient(&self, given: &str, family: &str) -> Result<String> {
        let response = self
            .http
            .post(self.url("Patient"))
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(&Patient::build(given, family))
            .send()
            .await?;

        let body = expect_success("create Patient", response).await?;
        let resource = Resource::from_value(body)?;
        let id = resource.require_id()?;

        tracing::info!(patient_id = %id, "created patient");
        Ok(id.to_string())
    }

    /// GET /Patient/{id}
    pub async fn fetch_patient(&self, id: &str) -> Result<Patient> {
        let response = self
            .http
            .get(self.url(&format!("Patient/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource_type: "Patient",
                id: id.to_string(),
            });
        }

        let body = expect_success("read Patient", response).await?;
        Ok(Patient::from_value(&body))
    }

    /// GET /Patient?_count=N
    pub async fn list_patients(&self, count: u32) -> Result<Vec<PatientSummary>> {
        let response = self
            .http
            .get(self.url("Patient"))
            .query(&[("_count", count.to_string())])
            .send()
            .await?;

        let bundle = expect_success("search Patient", response).await?;

        let patients = bundle_resources(&bundle)
            .into_iter()
            .filter_map(|resource| {
                let patient = Patient::from_value(resource);
                patient.id.clone().map(|id| PatientSummary {
                    id,
                    name: patient.display_name(),
                })
            })
            .collect();

        Ok(patients)
    }

    /// POST /Questionnaire — returns the new server-assigned id.
    pub async fn upload_questionnaire(&self, document: &Value) -> Result<String> {
        match document.get("resourceType").and_then(|t| t.as_str()) {
            Some("Questionnaire") => {}
            Some(other) => return Err(ClientError::InvalidDocument(other.to_string())),
            None => return Err(ClientError::InvalidDocument("missing resourceType".into())),
        }

        let response = self
            .http
            .post(self.url("Questionnaire"))
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(document)
            .send()
            .await?;

        let body = expect_success("upload Questionnaire", response).await?;
        let resource = Resource::from_value(body)?;
        let id = resource.require_id()?;

        tracing::info!(questionnaire_id = %id, "uploaded questionnaire");
        Ok(id.to_string())
    }

    /// POST /Questionnaire/{id}/$populate with the patient as subject.
    /// Returns the pre-filled QuestionnaireResponse skeleton.
    pub async fn populate(&self, questionnaire_id: &str, patient_id: &str) -> Result<Value> {
        let parameters = json!({
            "resourceType": "Parameters",
            "parameter": [{
                "name": "subject",
                "valueReference": {"reference": format!("Patient/{patient_id}")}
            }]
        });

        let response = self
            .http
            .post(self.url(&format!("Questionnaire/{questionnaire_id}/$populate")))
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(&parameters)
            .send()
            .await?;

        let body = expect_success("$populate", response).await?;
        Ok(unwrap_populate_result(body))
    }

    /// POST /QuestionnaireResponse — returns the new response id.
    pub async fn save_response(
        &self,
        questionnaire_id: &str,
        patient_id: &str,
        items: &[anketo_core::Item],
    ) -> Result<String> {
        let body = anketo_core::build_response(
            &self.questionnaire_url(questionnaire_id),
            patient_id,
            items,
        );

        let response = self
            .http
            .post(self.url("QuestionnaireResponse"))
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(&body)
            .send()
            .await?;

        let body = expect_success("save QuestionnaireResponse", response).await?;
        let resource = Resource::from_value(body)?;
        let id = resource.require_id()?;

        tracing::info!(response_id = %id, patient_id, "saved questionnaire response");
        Ok(id.to_string())
    }

    /// GET /QuestionnaireResponse/{id}
    pub async fn fetch_response(&self, id: &str) -> Result<Value> {
        let response = self
            .http
            .get(self.url(&format!("QuestionnaireResponse/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource_type: "QuestionnaireResponse",
                id: id.to_string(),
            });
        }

        expect_success("read QuestionnaireResponse", response).await
    }

    /// GET /QuestionnaireResponse?subject=Patient/{id} — newest first.
    /// Ordering is requested from the server, not re-sorted locally.
    pub async fn list_responses_for_patient(
        &self,
        patient_id: &str,
        count: u32,
    ) -> Result<Vec<Value>> {
        let response = self
            .http
            .get(self.url("QuestionnaireResponse"))
            .query(&[
                ("subject", format!("Patient/{patient_id}")),
                ("_sort", "-_lastUpdated".to_string()),
                ("_count", count.to_string()),
            ])
            .send()
            .await?;

        let bundle = expect_success("search QuestionnaireResponse", response).await?;
        Ok(bundle_resources(&bundle).into_iter().cloned().collect())
    }
}

/// Check the HTTP status and parse the body. Non-success statuses become
/// `Rejected`, with OperationOutcome diagnostics extracted when present.
async fn expect_success(operation: &'static str, response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let diagnostics = OperationOutcome::summarize_body(&body);
        tracing::warn!(operation, status = status.as_u16(), %diagnostics, "request rejected");
        return Err(ClientError::Rejected {
            operation,
            status: status.as_u16(),
            diagnostics,
        });
    }

    Ok(response.json().await?)
}

/// Some servers return the populated response wrapped in a Parameters
/// resource (parameter name "response"); HAPI returns it bare.
fn unwrap_populate_result(body: Value) -> Value {
    if body.get("resourceType").and_then(|t| t.as_str()) != Some("Parameters") {
        return body;
    }

    body.get("parameter")
        .and_then(|p| p.as_array())
        .and_then(|params| {
            params
                .iter()
                .find(|p| p.get("name").and_then(|n| n.as_str()) == Some("response"))
        })
        .and_then(|p| p.get("resource"))
        .cloned()
        .unwrap_or(body)
}
