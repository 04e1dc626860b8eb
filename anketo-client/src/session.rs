/// Explicit per-session context: which patient operations act on.
///
/// Owned by the caller (the web app keeps one in its state, the CLI
/// builds one per invocation) and always passed explicitly. Nothing in
/// this crate reads it implicitly.
#[derive(Debug, Clone, Default)]
pub struct Session {
    active_patient: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_patient(&mut self, id: impl Into<String>) {
        self.active_patient = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.active_patient = None;
    }

    pub fn active_patient(&self) -> Option<&str> {
        self.active_patient.as_deref()
    }
}
