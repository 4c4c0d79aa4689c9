use crate::adapters::http::{describe_failure, join_url};
use crate::config::{resolved, SheetsConfig};
use crate::domain::model::{DeliveryOutcome, NewLead};
use crate::domain::ports::SpreadsheetMirror;
use crate::utils::error::{CrmError, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a Google service-account key file that the mirror needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: Vec<[&'a str; 4]>,
}

impl ServiceAccountKey {
    /// Loads the key from inline JSON first, then from the key file.
    /// `Ok(None)` means nothing is configured.
    pub async fn load(config: &SheetsConfig) -> Result<Option<Self>> {
        if let Some(json) = resolved(&config.credentials_json) {
            return Ok(Some(serde_json::from_str(json)?));
        }

        if let Some(path) = resolved(&config.credentials_file) {
            let content = tokio::fs::read_to_string(path).await?;
            return Ok(Some(serde_json::from_str(&content)?));
        }

        Ok(None)
    }

    fn signed_assertion(&self, now: i64) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

/// Appends each stored lead as one row of the configured worksheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsMirror {
    config: SheetsConfig,
    client: Client,
}

impl GoogleSheetsMirror {
    pub fn new(config: SheetsConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn fetch_access_token(&self, key: &ServiceAccountKey) -> Result<String> {
        let assertion = key.signed_assertion(chrono::Utc::now().timestamp())?;

        tracing::debug!("Requesting Sheets access token for {}", key.client_email);
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::MirrorFailure {
                message: describe_failure("token endpoint", response).await,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn try_append(&self, key: &ServiceAccountKey, sheet_id: &str, lead: &NewLead) -> Result<()> {
        let token = self.fetch_access_token(key).await?;

        let range = format!("{}:append", self.config.worksheet);
        let mut url = join_url(
            &self.config.api_base,
            &["v4", "spreadsheets", sheet_id, "values", range.as_str()],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = AppendBody {
            values: vec![lead.as_row()],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::MirrorFailure {
                message: describe_failure("Sheets append", response).await,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl SpreadsheetMirror for GoogleSheetsMirror {
    async fn append(&self, lead: &NewLead) -> DeliveryOutcome {
        if !self.config.enabled {
            return DeliveryOutcome::skipped("Google Sheets mirror disabled");
        }

        // 每次呼叫都重新讀取憑證，設定錯誤只影響這一筆
        let key = match ServiceAccountKey::load(&self.config).await {
            Ok(Some(key)) => key,
            Ok(None) => return DeliveryOutcome::skipped("Google Sheets ENV missing"),
            Err(e) => return DeliveryOutcome::failed(&e),
        };
        let Some(sheet_id) = resolved(&self.config.sheet_id) else {
            return DeliveryOutcome::skipped("Google Sheets ENV missing");
        };

        self.try_append(&key, sheet_id, lead).await.into()
    }
}
