//! Population and submission workflows.
//!
//! Population asks the server to pre-fill a response skeleton for a
//! patient; submission validates and translates the user's answers,
//! merges them into the item list, and stores the finished response.
//! Both are single-shot: a failed call is terminal and the caller may
//! re-invoke.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use anketo_core::{AnswerValue, CodeRegistry, Item, ItemType};

use crate::client::FhirClient;
use crate::error::ClientError;

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    /// At least one field failed validation; nothing was stored. Every
    /// invalid field is reported, not just the first.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Run $populate for a patient and return the skeleton's item list.
/// Items may or may not already carry answers, depending on what the
/// server's population rules could fill in.
pub async fn populate_for_patient(
    client: &FhirClient,
    questionnaire_id: &str,
    patient_id: &str,
) -> Result<Vec<Item>, ClientError> {
    let skeleton: Value = client.populate(questionnaire_id, patient_id).await?;
    let items = Item::list_from(&skeleton);

    tracing::info!(
        questionnaire_id,
        patient_id,
        items = items.len(),
        answered = items.iter().filter(|i| i.answer.is_some()).count(),
        "populated questionnaire"
    );

    Ok(items)
}

/// Merge user-supplied field values into a populated skeleton.
///
/// All-or-nothing: every invalid field is collected and the whole merge
/// fails if any value is rejected, so no partial response can be built
/// from bad input. Fields already answered by population are left as
/// the server filled them; empty inputs are treated as unanswered.
pub fn merge_answers(
    codes: &CodeRegistry,
    skeleton: &[Item],
    fields: &[(String, String)],
) -> Result<Vec<Item>, Vec<FieldError>> {
    let answered: HashSet<&str> = skeleton
        .iter()
        .filter(|item| item.answer.is_some())
        .map(|item| item.link_id.as_str())
        .collect();

    let mut errors = Vec::new();
    let mut ready: Vec<(String, AnswerValue)> = Vec::new();

    for (field, raw) in fields {
        if raw.is_empty()
            || answered.contains(field.as_str())
            || ready.iter().any(|(key, _)| key == field)
        {
            continue;
        }

        let value = if codes.is_coded(field) {
            match codes.validate(field, raw) {
                Ok(()) => AnswerValue::Text(codes.translate(field, raw)),
                Err(message) => {
                    errors.push(FieldError {
                        field: field.clone(),
                        message,
                    });
                    continue;
                }
            }
        } else {
            let item_type = skeleton
                .iter()
                .find(|item| item.link_id == *field)
                .map(|item| item.item_type)
                .unwrap_or(ItemType::Text);

            match AnswerValue::parse(item_type, raw) {
                Ok(value) => value,
                Err(e) => {
                    errors.push(FieldError {
                        field: field.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            }
        };

        ready.push((field.clone(), value));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Skeleton order first, then submitted fields the skeleton never
    // mentioned, in submission order.
    let mut items = Vec::new();
    for item in skeleton {
        if item.answer.is_some() {
            items.push(item.clone());
        } else if let Some(pos) = ready.iter().position(|(key, _)| *key == item.link_id) {
            let (_, value) = ready.remove(pos);
            items.push(Item {
                answer: Some(value),
                ..item.clone()
            });
        }
    }
    for (field, value) in ready {
        items.push(Item {
            link_id: field,
            text: None,
            item_type: ItemType::Text,
            answer: Some(value),
        });
    }

    Ok(items)
}

/// Validate, translate, merge and store: the full submission pipeline.
/// Returns the new QuestionnaireResponse id. On validation failure the
/// server is never contacted.
pub async fn submit_answers(
    client: &FhirClient,
    codes: &CodeRegistry,
    questionnaire_id: &str,
    patient_id: &str,
    skeleton: &[Item],
    fields: &[(String, String)],
) -> Result<String, SubmitError> {
    let items = merge_answers(codes, skeleton, fields).map_err(SubmitError::Validation)?;

    let id = client
        .save_response(questionnaire_id, patient_id, &items)
        .await?;

    Ok(id)
}
