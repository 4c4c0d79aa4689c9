use crate::utils::error::{CrmError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// Shared outbound client for the Sheets and WhatsApp adapters.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("lead-crm/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Reads the body of a non-2xx response into an error message.
pub async fn describe_failure(context: &str, response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        format!("{} returned {}", context, status)
    } else {
        format!("{} returned {}: {}", context, status, body.trim())
    }
}

pub fn join_url(base: &str, segments: &[&str]) -> Result<url::Url> {
    let mut url = url::Url::parse(base).map_err(|e| CrmError::InvalidConfigValueError {
        field: "api_base".to_string(),
        value: base.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    url.path_segments_mut()
        .map_err(|_| CrmError::InvalidConfigValueError {
            field: "api_base".to_string(),
            value: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        let url = join_url("https://graph.facebook.com", &["v19.0", "123", "messages"]).unwrap();
        assert_eq!(url.as_str(), "https://graph.facebook.com/v19.0/123/messages");

        let url = join_url("http://127.0.0.1:9000/", &["v4", "spreadsheets", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v4/spreadsheets/abc");
    }

    #[test]
    fn test_join_url_encodes_segments() {
        let url = join_url("https://sheets.googleapis.com", &["values", "Leads 2024:append"]).unwrap();
        assert_eq!(url.path(), "/values/Leads%202024:append");
    }

    #[test]
    fn test_join_url_rejects_bad_base() {
        assert!(join_url("not a url", &["x"]).is_err());
        assert!(join_url("mailto:ops@example.com", &["x"]).is_err());
    }
}
