//! Consent (e-mandate/eSign) document lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, StateMachine, Timestamp};

/// An unresolved consent document older than this is treated as expired
/// and the user must restart the consent step.
pub const CONSENT_EXPIRY_MINUTES: u64 = 30;

/// Status of an eSign/consent document at the signing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Created,
    PendingSignature,
    Completed,
    Expired,
    Failed,
}

impl StateMachine for ConsentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConsentStatus::*;
        matches!(
            (self, target),
            (Created, PendingSignature)
                | (Created, Completed)
                | (Created, Expired)
                | (Created, Failed)
                | (PendingSignature, Completed)
                | (PendingSignature, Expired)
                | (PendingSignature, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConsentStatus::*;
        match self {
            Created => vec![PendingSignature, Completed, Expired, Failed],
            PendingSignature => vec![Completed, Expired, Failed],
            Completed | Expired | Failed => vec![],
        }
    }
}

impl ConsentStatus {
    /// Whether the document can still be signed.
    pub fn is_open(&self) -> bool {
        matches!(self, ConsentStatus::Created | ConsentStatus::PendingSignature)
    }
}

/// A mandate/eSign record issued by the signing provider.
///
/// Mutated only by provider poll/webhook responses. Once `Completed` it is
/// immutable and referenced by id when creating the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentDocument {
    pub document_id: DocumentId,
    pub signing_url: String,
    pub status: ConsentStatus,
    pub created_at: Timestamp,
}

impl ConsentDocument {
    pub fn new(document_id: DocumentId, signing_url: impl Into<String>) -> Self {
        Self {
            document_id,
            signing_url: signing_url.into(),
            status: ConsentStatus::Created,
            created_at: Timestamp::now(),
        }
    }

    /// Whether the document is signed and usable for mandate setup.
    pub fn is_signed(&self) -> bool {
        self.status == ConsentStatus::Completed
    }

    /// Whether the consent window has lapsed without resolution.
    pub fn is_expired(&self) -> bool {
        self.status.is_open()
            && self.created_at.elapsed().num_minutes() >= CONSENT_EXPIRY_MINUTES as i64
    }

    /// The status with the expiry window applied: an open document past
    /// the window reports `Expired`.
    pub fn effective_status(&self) -> ConsentStatus {
        if self.is_expired() {
            ConsentStatus::Expired
        } else {
            self.status
        }
    }
}
