//! Scriptable mock signing provider for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::checkout::{ConsentDocument, ConsentStatus};
use crate::domain::foundation::DocumentId;
use crate::ports::{ConsentRequest, EsignError, EsignProvider};

/// Mock provider that issues documents with a fixed id and a scripted
/// status sequence.
pub struct MockEsignProvider {
    document_id: String,
    status_script: Mutex<Vec<ConsentStatus>>,
    fail_create: Mutex<Option<EsignError>>,
}

impl MockEsignProvider {
    pub fn new() -> Self {
        Self {
            document_id: "doc123".to_string(),
            status_script: Mutex::new(vec![ConsentStatus::Completed]),
            fail_create: Mutex::new(None),
        }
    }

    /// Replace the status sequence. The last entry repeats once exhausted.
    pub fn with_status_script(self, script: Vec<ConsentStatus>) -> Self {
        *self.status_script.lock().unwrap() = script;
        self
    }

    /// Make the next create call fail with the given error.
    pub fn failing_create(self, error: EsignError) -> Self {
        *self.fail_create.lock().unwrap() = Some(error);
        self
    }
}

impl Default for MockEsignProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EsignProvider for MockEsignProvider {
    async fn create_consent(
        &self,
        _request: ConsentRequest,
    ) -> Result<ConsentDocument, EsignError> {
        if let Some(err) = self.fail_create.lock().unwrap().take() {
            return Err(err);
        }
        let document_id = DocumentId::new(&self.document_id)
            .map_err(|e| EsignError::Rejected(e.to_string()))?;
        Ok(ConsentDocument::new(
            document_id,
            format!("https://esign.test/sign/{}", self.document_id),
        ))
    }

    async fn check_status(&self, _document_id: &DocumentId) -> Result<ConsentStatus, EsignError> {
        let mut script = self.status_script.lock().unwrap();
        Ok(if script.len() > 1 {
            script.remove(0)
        } else {
            script[0]
        })
    }
}
