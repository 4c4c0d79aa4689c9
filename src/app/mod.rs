pub mod pages;
pub mod routes;

use crate::adapters::{http, GoogleSheetsMirror, SqliteLeadStore, WhatsAppNotifier};
use crate::config::CrmConfig;
use crate::core::LeadService;
use crate::utils::error::Result;
use std::sync::Arc;

pub use routes::{build_router, AppState};

/// Wires the store and both external adapters from configuration.
/// The HTTP client and adapters are built once and shared across requests.
pub fn build_service(config: &CrmConfig) -> Result<LeadService> {
    let client = http::build_client(config.http_timeout())?;

    let store = Arc::new(SqliteLeadStore::new(&config.database.path));
    let mirror = Arc::new(GoogleSheetsMirror::new(config.sheets.clone(), client.clone()));
    let notifier = Arc::new(WhatsAppNotifier::new(config.whatsapp.clone(), client));

    Ok(LeadService::new(store, mirror, notifier, config.clock()?))
}
