use crate::utils::error::{CrmError, Result};
use crate::utils::validation::validate_phone;
use serde::{Deserialize, Serialize};

/// A persisted lead row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub source: String,
    pub created_at: String,
}

/// Raw form input. Missing keys deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub source: String,
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub source: String,
    pub created_at: String,
}

impl LeadSubmission {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            source: source.into(),
        }
    }

    /// Trims every field, then checks presence before phone shape.
    pub fn validate(&self, created_at: impl FnOnce() -> String) -> Result<NewLead> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        let source = self.source.trim();

        if name.is_empty() || phone.is_empty() || source.is_empty() {
            return Err(CrmError::MissingField);
        }
        validate_phone(phone)?;

        Ok(NewLead {
            name: name.to_string(),
            phone: phone.to_string(),
            source: source.to_string(),
            created_at: created_at(),
        })
    }
}

impl NewLead {
    pub fn into_lead(self, id: i64) -> Lead {
        Lead {
            id,
            name: self.name,
            phone: self.phone,
            source: self.source,
            created_at: self.created_at,
        }
    }

    /// Row order used by the spreadsheet mirror.
    pub fn as_row(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.phone.as_str(),
            self.source.as_str(),
            self.created_at.as_str(),
        ]
    }
}

/// JSON body returned by every write endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

impl From<&CrmError> for ApiResponse {
    fn from(err: &CrmError) -> Self {
        ApiResponse::failed(err.user_friendly_message())
    }
}

/// Result of a best-effort side step. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Skipped { reason: String },
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        DeliveryOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(err: &CrmError) -> Self {
        DeliveryOutcome::Failed {
            error: err.to_string(),
        }
    }
}

impl From<Result<()>> for DeliveryOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::failed(&e),
        }
    }
}
