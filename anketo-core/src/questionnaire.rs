use serde_json::{json, Map, Value};

use crate::error::{AnketoError, Result};

/// Declared answer type of a questionnaire item. Unknown declared types
/// degrade to `Text` so a questionnaire with richer types still renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemType {
    #[default]
    Text,
    Date,
    Integer,
}

impl ItemType {
    pub fn from_code(code: &str) -> Self {
        match code {
            "date" => ItemType::Date,
            "integer" => ItemType::Integer,
            _ => ItemType::Text,
        }
    }
}

/// A single answer value, keyed by its FHIR value-type name.
///
/// The variant carries the literal; extraction dispatches on the tag
/// instead of taking whatever key happens to come first in the object.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Date(String),
    Integer(i64),
}

impl AnswerValue {
    /// Wrap raw user input according to the item's declared type.
    pub fn parse(item_type: ItemType, raw: &str) -> Result<Self> {
        match item_type {
            ItemType::Text => Ok(AnswerValue::Text(raw.to_string())),
            ItemType::Date => Ok(AnswerValue::Date(raw.to_string())),
            ItemType::Integer => raw
                .trim()
                .parse()
                .map(AnswerValue::Integer)
                .map_err(|_| AnketoError::InvalidAnswer {
                    expected: "integer",
                    value: raw.to_string(),
                }),
        }
    }

    /// Read the first answer entry of a response item.
    pub fn from_value(answer: &Value) -> Option<Self> {
        if let Some(s) = answer.get("valueString").and_then(|v| v.as_str()) {
            return Some(AnswerValue::Text(s.to_string()));
        }
        if let Some(d) = answer.get("valueDate").and_then(|v| v.as_str()) {
            return Some(AnswerValue::Date(d.to_string()));
        }
        if let Some(i) = answer.get("valueInteger").and_then(|v| v.as_i64()) {
            return Some(AnswerValue::Integer(i));
        }
        None
    }

    pub fn to_value(&self) -> Value {
        match self {
            AnswerValue::Text(s) => json!({"valueString": s}),
            AnswerValue::Date(d) => json!({"valueDate": d}),
            AnswerValue::Integer(i) => json!({"valueInteger": i}),
        }
    }

    /// The literal as shown in forms and tables.
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Date(d) => d.clone(),
            AnswerValue::Integer(i) => i.to_string(),
        }
    }
}

/// An item of a Questionnaire or QuestionnaireResponse, carrying at most
/// one answer. Repeating answers are out of scope for this client.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub link_id: String,
    pub text: Option<String>,
    pub item_type: ItemType,
    pub answer: Option<AnswerValue>,
}

impl Item {
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(link_id) = value.get("linkId").and_then(|l| l.as_str()) else {
            tracing::debug!("skipping item without linkId");
            return None;
        };

        let answer = value
            .get("answer")
            .and_then(|a| a.as_array())
            .and_then(|a| a.first())
            .and_then(AnswerValue::from_value);

        Some(Self {
            link_id: link_id.to_string(),
            text: value
                .get("text")
                .and_then(|t| t.as_str())
                .map(str::to_string),
            item_type: value
                .get("type")
                .and_then(|t| t.as_str())
                .map(ItemType::from_code)
                .unwrap_or_default(),
            answer,
        })
    }

    /// The item list of a QuestionnaireResponse (or Questionnaire) body.
    pub fn list_from(resource: &Value) -> Vec<Self> {
        resource
            .get("item")
            .and_then(|i| i.as_array())
            .map(|items| items.iter().filter_map(Item::from_value).collect())
            .unwrap_or_default()
    }

    /// Label shown to the user: the display text, else the linkId.
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.link_id)
    }

    pub fn to_value(&self) -> Value {
        let mut item = Map::new();
        item.insert("linkId".into(), Value::String(self.link_id.clone()));
        if let Some(text) = &self.text {
            item.insert("text".into(), Value::String(text.clone()));
        }
        if let Some(answer) = &self.answer {
            item.insert("answer".into(), json!([answer.to_value()]));
        }
        Value::Object(item)
    }
}

/// Assemble a finished QuestionnaireResponse for submission. Status is
/// always "completed": partial saves are not part of this workflow.
pub fn build_response(questionnaire: &str, patient_id: &str, items: &[Item]) -> Value {
    json!({
        "resourceType": "QuestionnaireResponse",
        "status": "completed",
        "questionnaire": questionnaire,
        "subject": {"reference": format!("Patient/{patient_id}")},
        "item": items.iter().map(Item::to_value).collect::<Vec<_>>()
    })
}

/// The patient id behind a response's subject reference.
pub fn subject_patient_id(response: &Value) -> Option<&str> {
    response
        .get("subject")
        .and_then(|s| s.get("reference"))
        .and_then(|r| r.as_str())
        .and_then(|r| r.strip_prefix("Patient/"))
}
