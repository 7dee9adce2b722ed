use crate::domain::EnrichedComplaint;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const SUBMITTED_MESSAGE: &str = "Complaint submitted successfully";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub message: String,
    pub booking_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<EnrichedComplaint> for ComplaintResponse {
    fn from(complaint: EnrichedComplaint) -> Self {
        Self { message: SUBMITTED_MESSAGE.to_string(), booking_id: complaint.booking_id, timestamp: complaint.timestamp }
    }
}
