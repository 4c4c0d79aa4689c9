use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("All fields are required")]
    MissingField,

    #[error("Phone must be 10 digits")]
    InvalidPhone,

    #[error("Phone already exists: {phone}")]
    DuplicatePhone { phone: String },

    #[error("Google Sheets mirror failed: {message}")]
    MirrorFailure { message: String },

    #[error("WhatsApp notification failed: {message}")]
    NotificationFailure { message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Storage,
    ExternalService,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CrmError::MissingField | CrmError::InvalidPhone | CrmError::DuplicatePhone { .. } => {
                ErrorCategory::Validation
            }
            CrmError::Database(_) => ErrorCategory::Storage,
            CrmError::MirrorFailure { .. }
            | CrmError::NotificationFailure { .. }
            | CrmError::Http(_)
            | CrmError::Jwt(_) => ErrorCategory::ExternalService,
            CrmError::ConfigError { .. }
            | CrmError::InvalidConfigValueError { .. }
            | CrmError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CrmError::Io(_) | CrmError::Serialization(_) | CrmError::TaskJoin(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::ExternalService => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Internal => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 驗證和重複電話是呼叫端可見的拒絕，其餘皆為內部錯誤
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CrmError::MissingField | CrmError::InvalidPhone | CrmError::DuplicatePhone { .. }
        )
    }

    /// Message returned to the form in `{success: false, message}`.
    pub fn user_friendly_message(&self) -> String {
        match self {
            CrmError::MissingField => "All fields are required".to_string(),
            CrmError::InvalidPhone => "Phone must be 10 digits".to_string(),
            CrmError::DuplicatePhone { .. } => "Phone already exists".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CrmError::MissingField => "Fill in name, phone and source",
            CrmError::InvalidPhone => "Enter a 10-digit phone number without country code",
            CrmError::DuplicatePhone { .. } => "This lead is already on the dashboard",
            CrmError::MirrorFailure { .. } | CrmError::Jwt(_) => {
                "Check GSHEET_CREDENTIALS / GSHEET_ID and that the sheet is shared with the service account"
            }
            CrmError::NotificationFailure { .. } => {
                "Check WHATSAPP_TOKEN, WHATSAPP_PHONE_NUMBER_ID and the template name"
            }
            CrmError::Http(_) => "Check network connectivity to the external API",
            CrmError::Database(_) | CrmError::Io(_) => {
                "Check that the database path is writable and not locked by another process"
            }
            CrmError::ConfigError { .. }
            | CrmError::InvalidConfigValueError { .. }
            | CrmError::ConfigValidationError { .. } => "Fix the configuration file or environment",
            CrmError::Serialization(_) | CrmError::TaskJoin(_) => "Retry the request; see server logs",
        }
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_low_severity_validation() {
        for err in [
            CrmError::MissingField,
            CrmError::InvalidPhone,
            CrmError::DuplicatePhone {
                phone: "9876543210".to_string(),
            },
        ] {
            assert!(err.is_rejection());
            assert_eq!(err.category(), ErrorCategory::Validation);
            assert_eq!(err.severity(), ErrorSeverity::Low);
        }
    }

    #[test]
    fn test_user_friendly_messages() {
        assert_eq!(
            CrmError::MissingField.user_friendly_message(),
            "All fields are required"
        );
        assert_eq!(
            CrmError::InvalidPhone.user_friendly_message(),
            "Phone must be 10 digits"
        );
        let dup = CrmError::DuplicatePhone {
            phone: "9876543210".to_string(),
        };
        assert_eq!(dup.user_friendly_message(), "Phone already exists");
    }

    #[test]
    fn test_internal_errors_carry_underlying_text() {
        let err = CrmError::ConfigError {
            message: "boom".to_string(),
        };
        assert!(!err.is_rejection());
        assert!(err.user_friendly_message().contains("boom"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
