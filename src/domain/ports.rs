use crate::domain::model::{DeliveryOutcome, Lead, NewLead};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence for leads. Each call is its own unit of work.
pub trait LeadRepository: Send + Sync {
    fn initialize(&self) -> Result<()>;
    fn insert(&self, lead: &NewLead) -> Result<Lead>;
    fn list_all(&self) -> Result<Vec<Lead>>;
    fn delete(&self, id: i64) -> Result<bool>;
    fn count(&self) -> Result<u64>;
}

/// Best-effort copy of a stored lead into an external spreadsheet.
/// Implementations never return an error; failures come back as an outcome.
#[async_trait]
pub trait SpreadsheetMirror: Send + Sync {
    async fn append(&self, lead: &NewLead) -> DeliveryOutcome;
}

/// Best-effort outbound message to the lead's phone.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, name: &str, phone: &str) -> DeliveryOutcome;
}
