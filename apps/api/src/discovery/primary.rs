//! Primary discovery provider: name + domain lookup (Voila Norbert style API).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::discovery::{get_json, DiscoveryProvider, DiscoveryQuery, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.voilanorbert.com/2018-01-08";

pub struct PrimaryProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    email: Option<EmailField>,
}

#[derive(Debug, Deserialize)]
struct EmailField {
    email: Option<String>,
}

impl PrimaryProvider {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn extract_email(response: SearchResponse) -> Option<String> {
    response
        .email
        .and_then(|field| field.email)
        .filter(|email| !email.trim().is_empty())
}

#[async_trait]
impl DiscoveryProvider for PrimaryProvider {
    fn label(&self) -> &'static str {
        "primary"
    }

    async fn find(&self, query: &DiscoveryQuery) -> Result<Option<String>, ProviderError> {
        let Some(name) = &query.name else {
            return Ok(None);
        };

        let request = self
            .client
            .get(format!("{}/search/name", self.base_url))
            .query(&[
                ("token", self.api_key.as_str()),
                ("name", name.full_name().as_str()),
                ("domain", query.domain.as_str()),
            ]);

        let response: SearchResponse = get_json(request).await?;
        Ok(extract_email(response))
    }
}
