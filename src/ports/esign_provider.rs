//! eSign provider port for consent/e-mandate document signing.
//!
//! Mandate-backed cycles require a signed consent document before the
//! subscription can be created. The provider issues a document with a
//! hosted signing URL; status is resolved by polling here, with the
//! provider's webhook as the final source of truth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::{ConsentDocument, ConsentStatus};
use crate::domain::foundation::{DocumentId, DomainError, ErrorCode, UserId};
use crate::domain::plan::BillingCycle;

/// Request to create a consent document for signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRequest {
    pub user_id: UserId,
    pub bundle_name: String,
    pub cycle: BillingCycle,
    /// Per-period amount the mandate authorizes, in minor units.
    pub amount_minor: u64,
    /// URL the signing page returns to when done.
    pub return_url: String,
}

/// Errors from the eSign provider.
#[derive(Debug, thiserror::Error)]
pub enum EsignError {
    #[error("Consent document not found: {0}")]
    NotFound(DocumentId),

    #[error("eSign provider rejected the request: {0}")]
    Rejected(String),

    #[error("eSign provider unavailable: {0}")]
    Unavailable(String),
}

impl EsignError {
    /// Unavailability is worth retrying; a rejection is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EsignError::Unavailable(_))
    }
}

impl From<EsignError> for DomainError {
    fn from(err: EsignError) -> Self {
        DomainError::new(ErrorCode::EsignError, err.to_string())
    }
}

/// Port for the document signing provider.
#[async_trait]
pub trait EsignProvider: Send + Sync {
    /// Create a consent document and return it with its signing URL.
    async fn create_consent(&self, request: ConsentRequest)
        -> Result<ConsentDocument, EsignError>;

    /// Check the current signing status of a document.
    ///
    /// Providers can be slow to reflect a completed signature; callers
    /// may treat an inconclusive answer optimistically and let the
    /// webhook settle it.
    async fn check_status(&self, document_id: &DocumentId) -> Result<ConsentStatus, EsignError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esign_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn EsignProvider) {}
    }

    #[test]
    fn unavailable_is_retryable_rejection_is_not() {
        assert!(EsignError::Unavailable("timeout".to_string()).is_retryable());
        assert!(!EsignError::Rejected("bad account".to_string()).is_retryable());
    }

    #[test]
    fn esign_error_maps_to_esign_domain_code() {
        let err: DomainError = EsignError::Unavailable("down".to_string()).into();
        assert_eq!(err.code, ErrorCode::EsignError);
    }
}
