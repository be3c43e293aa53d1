//! Secondary discovery provider (Hunter style API).
//!
//! With a name: single-person finder. Without: domain listing, preferring a
//! `personal` address and otherwise taking the first entry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::discovery::{get_json, DiscoveryProvider, DiscoveryQuery, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.hunter.io/v2";

pub struct SecondaryProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FinderResponse {
    data: Option<FinderData>,
}

#[derive(Debug, Deserialize)]
struct FinderData {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DomainSearchResponse {
    data: Option<DomainSearchData>,
}

#[derive(Debug, Deserialize)]
struct DomainSearchData {
    #[serde(default)]
    emails: Vec<DomainEmail>,
}

#[derive(Debug, Deserialize)]
struct DomainEmail {
    value: Option<String>,
    #[serde(rename = "type")]
    email_type: Option<String>,
}

impl SecondaryProvider {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

fn finder_email(response: FinderResponse) -> Option<String> {
    response
        .data
        .and_then(|data| data.email)
        .filter(|email| !email.trim().is_empty())
}

/// First `personal` entry, else the first entry of the list.
fn pick_domain_email(response: DomainSearchResponse) -> Option<String> {
    let emails = response.data?.emails;
    let chosen = emails
        .iter()
        .find(|e| e.email_type.as_deref() == Some("personal"))
        .or_else(|| emails.first())?;

    chosen
        .value
        .clone()
        .filter(|email| !email.trim().is_empty())
}

#[async_trait]
impl DiscoveryProvider for SecondaryProvider {
    fn label(&self) -> &'static str {
        "secondary"
    }

    async fn find(&self, query: &DiscoveryQuery) -> Result<Option<String>, ProviderError> {
        match &query.name {
            Some(name) => {
                let request = self
                    .client
                    .get(format!("{}/email-finder", self.base_url))
                    .query(&[
                        ("domain", query.domain.as_str()),
                        ("full_name", name.full_name().as_str()),
                        ("api_key", self.api_key.as_str()),
                    ]);
                let response: FinderResponse = get_json(request).await?;
                Ok(finder_email(response))
            }
            None => {
                let request = self
                    .client
                    .get(format!("{}/domain-search", self.base_url))
                    .query(&[
                        ("domain", query.domain.as_str()),
                        ("api_key", self.api_key.as_str()),
                    ]);
                let response: DomainSearchResponse = get_json(request).await?;
                Ok(pick_domain_email(response))
            }
        }
    }
}
