// Adapters layer: concrete implementations for external systems
// (SQLite store, Google Sheets mirror, WhatsApp notifier, shared http helpers).

pub mod google_sheets;
pub mod http;
pub mod sqlite_store;
pub mod whatsapp;

pub use google_sheets::GoogleSheetsMirror;
pub use sqlite_store::SqliteLeadStore;
pub use whatsapp::WhatsAppNotifier;
