pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use crate::app::{build_router, build_service};
pub use crate::config::CrmConfig;
pub use crate::core::{ApiResponse, Lead, LeadService, LeadSubmission};
pub use utils::error::{CrmError, Result};
