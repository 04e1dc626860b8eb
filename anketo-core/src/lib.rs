//! anketo-core — shared model for the anketo FHIR questionnaire client.
//!
//! Typed views over the handful of resources this client touches
//! (Patient, Questionnaire, QuestionnaireResponse), the answer value
//! union, and the coded-field terminology registry. No I/O lives here.

pub mod error;
pub mod operation_outcome;
pub mod patient;
pub mod questionnaire;
pub mod resource;
pub mod terminology;

pub use error::{AnketoError, Result};
pub use operation_outcome::{OperationOutcome, OutcomeIssue};
pub use patient::{Patient, PatientSummary};
pub use questionnaire::{
    build_response, subject_patient_id, AnswerValue, Item, ItemType,
};
pub use resource::{bundle_resources, Meta, Resource};
pub use terminology::{CodeBinding, CodeRegistry};
