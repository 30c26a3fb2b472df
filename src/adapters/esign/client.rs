//! HTTP adapter for the document signing provider.
//!
//! Creates consent documents over the provider's REST API and polls
//! their signing status. The provider's webhook remains the final word
//! on completion; polling here only accelerates the happy path.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::domain::checkout::{ConsentDocument, ConsentStatus};
use crate::domain::foundation::DocumentId;
use crate::ports::{ConsentRequest, EsignError, EsignProvider};

/// eSign provider API configuration.
#[derive(Clone)]
pub struct EsignClientConfig {
    api_key: SecretString,
    api_base_url: String,
}

impl EsignClientConfig {
    pub fn new(api_key: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: api_base_url.into(),
        }
    }
}

/// REST client for the signing provider.
pub struct EsignClient {
    config: EsignClientConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreateDocumentResponse {
    document_id: String,
    signing_url: String,
}

#[derive(Debug, Deserialize)]
struct DocumentStatusResponse {
    status: String,
}

impl EsignClient {
    pub fn new(config: EsignClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn map_status(raw: &str) -> ConsentStatus {
        match raw {
            "requested" | "created" => ConsentStatus::Created,
            "viewed" | "partially_signed" => ConsentStatus::PendingSignature,
            "completed" | "signed" => ConsentStatus::Completed,
            "expired" => ConsentStatus::Expired,
            "failed" | "declined" => ConsentStatus::Failed,
            // Providers add statuses without notice; an unknown string is
            // treated as still in progress.
            _ => ConsentStatus::PendingSignature,
        }
    }
}

#[async_trait]
impl EsignProvider for EsignClient {
    async fn create_consent(
        &self,
        request: ConsentRequest,
    ) -> Result<ConsentDocument, EsignError> {
        let url = format!("{}/v2/client/document/upload", self.config.api_base_url);

        let body = json!({
            "signer_id": request.user_id.as_str(),
            "display_name": format!("{} ({})", request.bundle_name, request.cycle),
            "mandate_amount": request.amount_minor as f64 / 100.0,
            "redirect_url": request.return_url,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EsignError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %text, "eSign create_consent failed");
            return if status.is_server_error() {
                Err(EsignError::Unavailable(text))
            } else {
                Err(EsignError::Rejected(text))
            };
        }

        let created: CreateDocumentResponse = response
            .json()
            .await
            .map_err(|e| EsignError::Unavailable(format!("Unparseable response: {}", e)))?;

        let document_id = DocumentId::new(&created.document_id)
            .map_err(|e| EsignError::Rejected(e.to_string()))?;

        Ok(ConsentDocument::new(document_id, created.signing_url))
    }

    async fn check_status(&self, document_id: &DocumentId) -> Result<ConsentStatus, EsignError> {
        let url = format!(
            "{}/v2/client/document/{}",
            self.config.api_base_url, document_id
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| EsignError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EsignError::NotFound(document_id.clone()));
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EsignError::Unavailable(text));
        }

        let status: DocumentStatusResponse = response
            .json()
            .await
            .map_err(|e| EsignError::Unavailable(format!("Unparseable response: {}", e)))?;

        Ok(Self::map_status(&status.status))
    }
}
