use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Smallest accepted description, in Unicode scalar values.
pub const DESCRIPTION_MIN_CHARS: usize = 1;
/// Largest accepted description, in Unicode scalar values.
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// A complaint whose fields have passed validation but has not yet been timestamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintSubmission {
    pub booking_id: Uuid,
    pub description: String,
}

impl ComplaintSubmission {
    /// Attaches the server-side receipt time. Consumes the submission so a
    /// complaint can only be stamped once.
    #[must_use]
    pub fn enrich(self, received_at: OffsetDateTime) -> EnrichedComplaint {
        EnrichedComplaint {
            booking_id: self.booking_id,
            description: self.description,
            timestamp: received_at.to_offset(time::UtcOffset::UTC),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedComplaint {
    pub booking_id: Uuid,
    pub description: String,
    pub timestamp: OffsetDateTime,
}

/// Wire form consumed downstream. Field names are a compatibility contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutboundMessage {
    pub booking_id: Uuid,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<&EnrichedComplaint> for OutboundMessage {
    fn from(complaint: &EnrichedComplaint) -> Self {
        Self {
            booking_id: complaint.booking_id,
            description: complaint.description.clone(),
            timestamp: complaint.timestamp,
        }
    }
}
