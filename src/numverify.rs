use crate::config::Config;
use crate::twilio_client::ClientError;
use crate::types::ValidationResult;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[async_trait]
pub trait NumberValidator: Send + Sync {
    /// `valid` is only true when the service answered 2xx *and* judged the number valid.
    async fn validate(&self, phone_number: &str) -> Result<ValidationResult, ClientError>;
}

#[derive(Deserialize, Debug)]
struct NumverifyResponse {
    // Required: a body without it (e.g. Numverify's `{"success": false, "error": …}`) is a
    // parse failure, not an invalid number.
    valid: bool,
    country_name: Option<String>,
}

pub struct NumverifyClient {
    http_client: reqwest::Client,
    api_url: String,
    access_key: String,
}

impl NumverifyClient {
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_url: config.numverify_api_url.clone(),
            access_key: config.numverify_api_key.clone(),
        }
    }
}

#[async_trait]
impl NumberValidator for NumverifyClient {
    async fn validate(&self, phone_number: &str) -> Result<ValidationResult, ClientError> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("access_key", self.access_key.as_str()), ("number", phone_number)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: NumverifyResponse = serde_json::from_str(&body)?;
        debug!(%status, valid = parsed.valid, "numverify answered");
        Ok(ValidationResult {
            valid: status.is_success() && parsed.valid,
            country_name: parsed.country_name.filter(|c| !c.is_empty()),
        })
    }
}
