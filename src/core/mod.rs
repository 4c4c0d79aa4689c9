pub mod workflow;

pub use crate::domain::model::{ApiResponse, DeliveryOutcome, Lead, LeadSubmission, NewLead};
pub use crate::domain::ports::{LeadRepository, Notifier, SpreadsheetMirror};
pub use crate::utils::error::Result;
pub use workflow::LeadService;
