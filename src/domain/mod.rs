pub mod complaint;
pub mod validation;

pub use complaint::{ComplaintSubmission, EnrichedComplaint, OutboundMessage};
pub use validation::{FieldError, ValidationFailure, validate};
