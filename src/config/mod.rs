#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::clock::{LocalClock, DEFAULT_TIMESTAMP_FORMAT};
use crate::utils::error::{CrmError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub locale: LocaleConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub sheets: SheetsConfig,
    pub whatsapp: WhatsAppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub timezone: String,
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub enabled: bool,
    /// Inline service-account JSON. Takes precedence over `credentials_file`.
    pub credentials_json: Option<String>,
    pub credentials_file: Option<String>,
    pub sheet_id: Option<String>,
    pub worksheet: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub access_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub template_name: String,
    /// Send the lead's name as the template's single body variable.
    /// Meta's stock `hello_world` takes none.
    pub name_parameter: bool,
    pub language_code: String,
    pub country_code: String,
    pub api_base: String,
    pub api_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "leads.db".to_string(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: 15 }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            credentials_json: None,
            credentials_file: None,
            sheet_id: None,
            worksheet: "Sheet1".to_string(),
            api_base: "https://sheets.googleapis.com".to_string(),
        }
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token: None,
            phone_number_id: None,
            template_name: "hello_world".to_string(),
            name_parameter: false,
            language_code: "en_US".to_string(),
            country_code: "91".to_string(),
            api_base: "https://graph.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
        }
    }
}

/// Treats empty values and unresolved `${VAR}` placeholders as unset.
pub fn resolved(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}


impl CrmConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CrmError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CrmError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GSHEET_ID})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CrmError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Environment-only configuration, used when no config file is given.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the config from a variable lookup. Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(listen) = var("CRM_LISTEN") {
            config.server.listen = listen;
        }
        if let Some(path) = var("CRM_DATABASE") {
            config.database.path = path;
        }
        if let Some(tz) = var("CRM_TIMEZONE") {
            config.locale.timezone = tz;
        }
        if let Some(format) = var("CRM_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                config.logging.format = LogFormat::Json;
            }
        }

        config.sheets.credentials_json = var("GSHEET_CREDENTIALS");
        config.sheets.credentials_file = var("GSHEET_CREDENTIALS_FILE");
        config.sheets.sheet_id = var("GSHEET_ID");

        config.whatsapp.access_token = var("WHATSAPP_TOKEN");
        config.whatsapp.phone_number_id = var("WHATSAPP_PHONE_NUMBER_ID");
        if let Some(template) = var("WHATSAPP_TEMPLATE") {
            config.whatsapp.template_name = template;
        }
        if let Some(flag) = var("WHATSAPP_NAME_PARAMETER") {
            config.whatsapp.name_parameter = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        config
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.locale
            .timezone
            .parse()
            .map_err(|e| CrmError::InvalidConfigValueError {
                field: "locale.timezone".to_string(),
                value: self.locale.timezone.clone(),
                reason: format!("Unknown timezone: {}", e),
            })
    }

    pub fn clock(&self) -> Result<LocalClock> {
        Ok(LocalClock::new(
            self.timezone()?,
            self.locale.timestamp_format.clone(),
        ))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.listen", &self.server.listen)?;
        validation::validate_path("database.path", &self.database.path)?;
        validation::validate_timezone("locale.timezone", &self.locale.timezone)?;
        validation::validate_non_empty_string(
            "locale.timestamp_format",
            &self.locale.timestamp_format,
        )?;
        validation::validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;

        if self.sheets.enabled {
            validation::validate_url("sheets.api_base", &self.sheets.api_base)?;
            validation::validate_non_empty_string("sheets.worksheet", &self.sheets.worksheet)?;
        }

        if self.whatsapp.enabled {
            validation::validate_url("whatsapp.api_base", &self.whatsapp.api_base)?;
            validation::validate_non_empty_string(
                "whatsapp.template_name",
                &self.whatsapp.template_name,
            )?;
            if !self.whatsapp.country_code.chars().all(|c| c.is_ascii_digit()) {
                return Err(CrmError::InvalidConfigValueError {
                    field: "whatsapp.country_code".to_string(),
                    value: self.whatsapp.country_code.clone(),
                    reason: "Country code must be digits only, without '+'".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for CrmConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
