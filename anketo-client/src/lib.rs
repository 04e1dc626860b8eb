//! anketo-client — resource client and workflows for a remote FHIR server.
//!
//! A thin typed HTTP layer over the server's REST endpoints (Patient,
//! Questionnaire, QuestionnaireResponse, `$populate`), plus the
//! population and submission workflows built on top of it.

pub mod client;
pub mod error;
pub mod session;
pub mod workflow;

pub use client::FhirClient;
pub use error::{ClientError, Result};
pub use session::Session;
pub use workflow::{
    merge_answers, populate_for_patient, submit_answers, FieldError, SubmitError,
};
