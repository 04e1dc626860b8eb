use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use anketo_client::{populate_for_patient, submit_answers, SubmitError};
use anketo_core::{subject_patient_id, Item, Resource};

use crate::pages::{alert, error_page, esc, input_kind, render_page};
use crate::AppState;

const PATIENT_LIST_COUNT: u32 = 50;
const HISTORY_COUNT: u32 = 20;

#[derive(Deserialize)]
pub struct NewPatientForm {
    given: String,
    family: String,
}

#[derive(Deserialize)]
pub struct SelectPatientForm {
    patient_id: String,
}

#[derive(Deserialize)]
pub struct UploadForm {
    document: String,
}

#[derive(Deserialize)]
pub struct StartForm {
    questionnaire_id: String,
}

async fn active_patient(state: &AppState) -> Option<String> {
    state
        .session
        .read()
        .await
        .active_patient()
        .map(str::to_string)
}

/// GET / — dashboard with the active patient banner.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let banner = match active_patient(&state).await {
        None => "None selected".to_string(),
        Some(pid) => match state.client.fetch_patient(&pid).await {
            Ok(patient) if !patient.is_empty() => {
                format!("{} — {}", esc(&pid), esc(&patient.display_name()))
            }
            Ok(_) => esc(&pid),
            Err(e) => {
                tracing::warn!(patient_id = %pid, error = %e, "active patient lookup failed");
                esc(&pid)
            }
        },
    };

    let content = format!(
        r#"<div class="menu">
  <a href="/patients/select">Select patient</a>
  <a href="/questionnaires/start">Start questionnaire</a>
  <a href="/patients/new">Create patient</a>
  <a href="/questionnaires/upload">Upload questionnaire</a>
  <a href="/history">Patient history</a>
</div>
<div class="banner"><strong>Active patient:</strong> {banner}</div>"#
    );

    render_page("Dashboard", &content)
}

/// GET /patients/new
pub async fn create_patient_form() -> Html<String> {
    render_page(
        "Create patient",
        r#"<form method="post">
  <label>First name</label>
  <input name="given" required>
  <label>Last name</label>
  <input name="family" required>
  <button>Create patient</button>
</form>"#,
    )
}

/// POST /patients/new — creates the patient and makes it active.
pub async fn create_patient_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewPatientForm>,
) -> Response {
    match state.client.create_patient(&form.given, &form.family).await {
        Ok(id) => {
            state.session.write().await.select_patient(&id);
            let content = format!(
                "{}<p><strong>ID:</strong> {}</p>\
                 <div class=\"links\"><a href=\"/\">Back to dashboard</a></div>",
                alert("success", "Patient created and selected."),
                esc(&id)
            );
            render_page("Patient created", &content).into_response()
        }
        Err(e) => error_page("Create failed", &e.to_string()).into_response(),
    }
}

/// GET /patients/select
pub async fn select_patient_form() -> Html<String> {
    render_page(
        "Select patient",
        r#"<form method="post">
  <label>Patient ID</label>
  <input name="patient_id" required>
  <button>Set active</button>
</form>"#,
    )
}

/// POST /patients/select
pub async fn select_patient_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SelectPatientForm>,
) -> Redirect {
    state
        .session
        .write()
        .await
        .select_patient(form.patient_id.trim());
    Redirect::to("/")
}

/// GET /questionnaires/upload
pub async fn upload_form() -> Html<String> {
    render_page(
        "Upload questionnaire",
        r#"<form method="post">
  <label>Questionnaire document (JSON)</label>
  <textarea name="document" required></textarea>
  <button>Upload</button>
</form>"#,
    )
}

/// POST /questionnaires/upload
pub async fn upload_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UploadForm>,
) -> Response {
    let document: Value = match serde_json::from_str(&form.document) {
        Ok(document) => document,
        Err(e) => {
            return error_page("Upload failed", &format!("not valid JSON: {e}")).into_response()
        }
    };

    match state.client.upload_questionnaire(&document).await {
        Ok(id) => {
            let content = format!(
                "{}<p><strong>ID:</strong> {}</p>\
                 <div class=\"links\"><a href=\"/\">Back to dashboard</a></div>",
                alert("success", "Questionnaire uploaded."),
                esc(&id)
            );
            render_page("Questionnaire uploaded", &content).into_response()
        }
        Err(e) => error_page("Upload failed", &e.to_string()).into_response(),
    }
}

/// GET /questionnaires/start
pub async fn start_form() -> Html<String> {
    render_page(
        "Start questionnaire",
        r#"<form method="post">
  <label>Questionnaire ID</label>
  <input name="questionnaire_id" required>
  <button>Start</button>
</form>"#,
    )
}

/// POST /questionnaires/start
pub async fn start_submit(Form(form): Form<StartForm>) -> Redirect {
    Redirect::to(&format!("/questionnaire/{}", form.questionnaire_id.trim()))
}

/// GET /questionnaire/{qid} — populate for the active patient and render
/// one input per item. Requires an active patient.
pub async fn questionnaire_form(
    State(state): State<Arc<AppState>>,
    Path(qid): Path<String>,
) -> Response {
    let Some(pid) = active_patient(&state).await else {
        return Redirect::to("/").into_response();
    };

    let items = match populate_for_patient(&state.client, &qid, &pid).await {
        Ok(items) => items,
        Err(e) => return error_page("Populate failed", &e.to_string()).into_response(),
    };

    let mut inputs = String::new();
    for item in &items {
        let value = item
            .answer
            .as_ref()
            .map(|answer| answer.display())
            .unwrap_or_default();
        inputs.push_str(&format!(
            "<label>{}</label>\n<input type=\"{}\" name=\"{}\" value=\"{}\">\n",
            esc(item.label()),
            input_kind(item.item_type),
            esc(&item.link_id),
            esc(&value)
        ));
    }

    let content = format!("<form method=\"post\">\n{inputs}<button>Submit</button>\n</form>");
    render_page(&format!("Questionnaire {}", esc(&qid)), &content).into_response()
}

/// POST /questionnaire/{qid} — validate, translate and store the answers.
/// All validation failures are reported together; nothing is saved then.
pub async fn questionnaire_submit(
    State(state): State<Arc<AppState>>,
    Path(qid): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let Some(pid) = active_patient(&state).await else {
        return Redirect::to("/").into_response();
    };

    match submit_answers(&state.client, &state.codes, &qid, &pid, &[], &fields).await {
        Ok(response_id) => Redirect::to(&format!("/responses/{response_id}")).into_response(),
        Err(SubmitError::Validation(errors)) => {
            let mut content: String = errors
                .iter()
                .map(|error| alert("danger", &error.to_string()))
                .collect();
            content.push_str(&format!(
                "<div class=\"links\"><a href=\"/questionnaire/{}\">Back to form</a></div>",
                esc(&qid)
            ));
            render_page("Validation failed", &content).into_response()
        }
        Err(SubmitError::Client(e)) => error_page("Save failed", &e.to_string()).into_response(),
    }
}

/// GET /responses/{id} — summary of one stored response.
pub async fn response_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let response = match state.client.fetch_response(&id).await {
        Ok(response) => response,
        Err(e) => return error_page("Response not found", &e.to_string()).into_response(),
    };

    let pid = subject_patient_id(&response).unwrap_or_default().to_string();
    let patient_line = match state.client.fetch_patient(&pid).await {
        Ok(patient) if !patient.is_empty() => {
            format!("{} (ID: {})", esc(&patient.display_name()), esc(&pid))
        }
        Ok(_) => esc(&pid),
        Err(e) => {
            tracing::warn!(patient_id = %pid, error = %e, "subject lookup failed");
            esc(&pid)
        }
    };

    let content = format!(
        r#"<div class="banner"><strong>Patient:</strong> {patient_line}<br>
<strong>Response ID:</strong> {}</div>
{}
<div class="links"><a href="/">Dashboard</a><a href="/history">Patient history</a></div>"#,
        esc(&id),
        answer_table(&Item::list_from(&response))
    );

    render_page("Response saved", &content).into_response()
}

/// GET /history — every patient with their responses, newest first.
/// Listing failures degrade to empty sections rather than error pages.
pub async fn history(State(state): State<Arc<AppState>>) -> Html<String> {
    let patients = match state.client.list_patients(PATIENT_LIST_COUNT).await {
        Ok(patients) => patients,
        Err(e) => {
            tracing::warn!(error = %e, "patient listing failed");
            Vec::new()
        }
    };

    if patients.is_empty() {
        return render_page("Patient history", &alert("info", "No patients found."));
    }

    let mut sections = String::new();
    for patient in &patients {
        let responses = match state
            .client
            .list_responses_for_patient(&patient.id, HISTORY_COUNT)
            .await
        {
            Ok(responses) => responses,
            Err(e) => {
                tracing::warn!(patient_id = %patient.id, error = %e, "history lookup failed");
                Vec::new()
            }
        };

        let mut body = String::new();
        if responses.is_empty() {
            body.push_str("<p class=\"muted\">No responses yet.</p>");
        }
        for response in &responses {
            let resource = Resource::from_value(response.clone()).ok();
            let rid = resource
                .as_ref()
                .and_then(|r| r.id.clone())
                .unwrap_or_default();
            let date = resource
                .as_ref()
                .and_then(|r| r.updated_date())
                .unwrap_or_default()
                .to_string();

            body.push_str(&format!(
                "<p><a href=\"/responses/{rid}\">Response {rid}</a> \
                 <span class=\"muted\">{date}</span></p>\n{}",
                answer_table(&Item::list_from(response)),
                rid = esc(&rid),
                date = esc(&date)
            ));
        }

        sections.push_str(&format!(
            "<details><summary>{} <span class=\"muted\">ID: {}</span></summary>\n{body}</details>\n",
            esc(&patient.name),
            esc(&patient.id)
        ));
    }

    render_page("Patient history", &sections)
}

fn answer_table(items: &[Item]) -> String {
    let rows: String = items
        .iter()
        .map(|item| {
            let value = item
                .answer
                .as_ref()
                .map(|answer| answer.display())
                .unwrap_or_else(|| "–".to_string());
            format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                esc(item.label()),
                esc(&value)
            )
        })
        .collect();

    format!("<table><thead><tr><th>Field</th><th>Value</th></tr></thead><tbody>{rows}</tbody></table>")
}
