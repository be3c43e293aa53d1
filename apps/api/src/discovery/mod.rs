//! Email Discovery: resolves a person's address at a company domain.
//!
//! Providers are tried in a fixed order (primary, then secondary) and the
//! first usable address wins. Provider failures are logged and skipped; only
//! configuration problems are returned to the caller. "Nothing found" is a
//! normal outcome, not an error.
//!
//! Flow: sanitize_domain → primary (name required) → secondary → NotFound

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::discovery::primary::PrimaryProvider;
use crate::discovery::secondary::SecondaryProvider;

pub mod handlers;
pub mod primary;
pub mod secondary;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Which provider produced an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoverySource {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Found {
        email: String,
        source: DiscoverySource,
    },
    NotFound,
}

impl DiscoveryOutcome {
    pub fn email(&self) -> Option<&str> {
        match self {
            DiscoveryOutcome::Found { email, .. } => Some(email),
            DiscoveryOutcome::NotFound => None,
        }
    }
}

/// Wire form of a discovery attempt: `{email, source}`, both null when nothing was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryResult {
    pub email: Option<String>,
    pub source: Option<DiscoverySource>,
}

impl From<DiscoveryOutcome> for DiscoveryResult {
    fn from(outcome: DiscoveryOutcome) -> Self {
        match outcome {
            DiscoveryOutcome::Found { email, source } => Self {
                email: Some(email),
                source: Some(source),
            },
            DiscoveryOutcome::NotFound => Self {
                email: None,
                source: None,
            },
        }
    }
}

/// Raised before any provider is contacted.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("A company name or domain is required")]
    MissingDomain,

    #[error("No email discovery provider is configured; add an API key in settings")]
    NoProvider,

    #[error("A recruiter name is required to search with the configured provider")]
    NameRequired,

    #[error("Please provide both first and last name (got '{0}')")]
    IncompleteName(String),
}

/// Failure of a single provider call. Never escapes `EmailFinder`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    /// Splits on whitespace: the first word is the first name, the rest the last name.
    pub fn parse(full: &str) -> Result<Self, DiscoveryError> {
        let mut parts = full.split_whitespace();
        let first = parts.next();
        let last = parts.collect::<Vec<_>>().join(" ");

        match first {
            Some(first) if !last.is_empty() => Ok(Self {
                first: first.to_string(),
                last,
            }),
            _ => Err(DiscoveryError::IncompleteName(full.trim().to_string())),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryQuery {
    pub domain: String,
    pub name: Option<PersonName>,
}

/// Per-user provider API keys. A missing or blank key disables that provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryCredentials {
    #[serde(default, skip_serializing)]
    pub primary_api_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub secondary_api_key: Option<String>,
}

impl DiscoveryCredentials {
    pub fn primary(&self) -> Option<&str> {
        non_blank(self.primary_api_key.as_deref())
    }

    pub fn secondary(&self) -> Option<&str> {
        non_blank(self.secondary_api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Provider base URLs, from config.
#[derive(Debug, Clone)]
pub struct DiscoveryEndpoints {
    pub primary_base_url: String,
    pub secondary_base_url: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    fn label(&self) -> &'static str;

    /// `Ok(None)` means the provider answered but had no usable address.
    async fn find(&self, query: &DiscoveryQuery) -> Result<Option<String>, ProviderError>;
}

/// Sends a provider request and decodes a 2xx JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback chain
// ────────────────────────────────────────────────────────────────────────────

/// Lower-cases, strips all whitespace and appends `.com` unless already present.
/// Other TLDs are not recognised: `acme.io` becomes `acme.io.com`.
pub fn sanitize_domain(input: &str) -> String {
    let mut domain: String = input.to_lowercase().split_whitespace().collect();
    if !domain.ends_with(".com") {
        domain.push_str(".com");
    }
    domain
}

pub struct EmailFinder {
    primary: Option<Arc<dyn DiscoveryProvider>>,
    secondary: Option<Arc<dyn DiscoveryProvider>>,
}

impl EmailFinder {
    pub fn new(
        primary: Option<Arc<dyn DiscoveryProvider>>,
        secondary: Option<Arc<dyn DiscoveryProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Builds the chain from whichever keys are configured.
    pub fn from_credentials(
        client: &Client,
        credentials: &DiscoveryCredentials,
        endpoints: &DiscoveryEndpoints,
    ) -> Self {
        let primary = credentials.primary().map(|key| {
            Arc::new(PrimaryProvider::new(
                client.clone(),
                endpoints.primary_base_url.clone(),
                key.to_string(),
            )) as Arc<dyn DiscoveryProvider>
        });
        let secondary = credentials.secondary().map(|key| {
            Arc::new(SecondaryProvider::new(
                client.clone(),
                endpoints.secondary_base_url.clone(),
                key.to_string(),
            )) as Arc<dyn DiscoveryProvider>
        });
        Self::new(primary, secondary)
    }

    /// Finds an address for `person_name` (optional) at `company`.
    ///
    /// `company` may be a bare company name or a domain; it is sanitized first.
    pub async fn find(
        &self,
        company: &str,
        person_name: Option<&str>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        if company.trim().is_empty() {
            return Err(DiscoveryError::MissingDomain);
        }
        if self.primary.is_none() && self.secondary.is_none() {
            return Err(DiscoveryError::NoProvider);
        }

        let name = person_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(PersonName::parse)
            .transpose()?;

        if name.is_none() && self.secondary.is_none() {
            return Err(DiscoveryError::NameRequired);
        }

        let query = DiscoveryQuery {
            domain: sanitize_domain(company),
            name,
        };

        if let Some(primary) = &self.primary {
            if query.name.is_some() {
                if let Some(email) = attempt(primary.as_ref(), &query).await {
                    return Ok(DiscoveryOutcome::Found {
                        email,
                        source: DiscoverySource::Primary,
                    });
                }
            } else {
                debug!("Skipping {} lookup: no person name", primary.label());
            }
        }

        if let Some(secondary) = &self.secondary {
            if let Some(email) = attempt(secondary.as_ref(), &query).await {
                return Ok(DiscoveryOutcome::Found {
                    email,
                    source: DiscoverySource::Secondary,
                });
            }
        }

        info!("No email found for domain {}", query.domain);
        Ok(DiscoveryOutcome::NotFound)
    }
}

/// Runs one provider, turning every failure into `None`.
async fn attempt(provider: &dyn DiscoveryProvider, query: &DiscoveryQuery) -> Option<String> {
    match provider.find(query).await {
        Ok(Some(email)) if !email.trim().is_empty() => {
            info!("{} found an email for {}", provider.label(), query.domain);
            Some(email.trim().to_string())
        }
        Ok(_) => {
            info!("{} returned no email for {}", provider.label(), query.domain);
            None
        }
        Err(e) => {
            warn!("{} lookup failed for {}: {e}", provider.label(), query.domain);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn serve_fixture(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Scripted provider that counts its calls.
    pub(crate) struct StubProvider {
        reply: Result<Option<String>, u16>,
        pub calls: AtomicUsize,
    }

    impl StubProvider {
        pub(crate) fn found(email: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(Some(email.to_string())),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn empty() -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(None),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DiscoveryProvider for StubProvider {
        fn label(&self) -> &'static str {
            "stub"
        }

        async fn find(&self, _query: &DiscoveryQuery) -> Result<Option<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(email) => Ok(email.clone()),
                Err(status) => Err(ProviderError::Api {
                    status: *status,
                    message: "stubbed failure".to_string(),
                }),
            }
        }
    }

    fn finder(
        primary: Option<Arc<StubProvider>>,
        secondary: Option<Arc<StubProvider>>,
    ) -> EmailFinder {
        EmailFinder::new(
            primary.map(|p| p as Arc<dyn DiscoveryProvider>),
            secondary.map(|s| s as Arc<dyn DiscoveryProvider>),
        )
    }

    #[test]
    fn test_sanitize_domain_appends_com() {
        assert_eq!(sanitize_domain("Google"), "google.com");
    }

    #[test]
    fn test_sanitize_domain_keeps_existing_com() {
        assert_eq!(sanitize_domain("already.com"), "already.com");
    }

    #[test]
    fn test_sanitize_domain_strips_whitespace() {
        assert_eq!(sanitize_domain(" My Co "), "myco.com");
        assert_eq!(sanitize_domain("Big\tData\nInc"), "bigdatainc.com");
    }

    #[test]
    fn test_sanitize_domain_other_tld_gets_com() {
        assert_eq!(sanitize_domain("acme.io"), "acme.io.com");
    }

    #[test]
    fn test_person_name_splits_first_and_rest() {
        let name = PersonName::parse("  Ada  King Lovelace ").unwrap();
        assert_eq!(name.first, "Ada");
        assert_eq!(name.last, "King Lovelace");
        assert_eq!(name.full_name(), "Ada King Lovelace");
    }

    #[test]
    fn test_person_name_requires_two_parts() {
        assert!(matches!(
            PersonName::parse("Ada"),
            Err(DiscoveryError::IncompleteName(_))
        ));
    }

    #[test]
    fn test_discovery_result_wire_shape() {
        let found: DiscoveryResult = DiscoveryOutcome::Found {
            email: "a@b.com".into(),
            source: DiscoverySource::Secondary,
        }
        .into();
        let value = serde_json::to_value(found).unwrap();
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["source"], "Secondary");

        let missing = serde_json::to_value(DiscoveryResult::from(DiscoveryOutcome::NotFound)).unwrap();
        assert!(missing["email"].is_null());
        assert!(missing["source"].is_null());
    }

    #[test]
    fn test_credentials_ignore_blank_keys() {
        let creds = DiscoveryCredentials {
            primary_api_key: Some("   ".into()),
            secondary_api_key: Some("k".into()),
        };
        assert_eq!(creds.primary(), None);
        assert_eq!(creds.secondary(), Some("k"));
    }

    #[tokio::test]
    async fn test_primary_hit_skips_secondary() {
        let primary = StubProvider::found("jane@acme.com");
        let secondary = StubProvider::found("other@acme.com");
        let outcome = finder(Some(primary.clone()), Some(secondary.clone()))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DiscoveryOutcome::Found {
                email: "jane@acme.com".into(),
                source: DiscoverySource::Primary
            }
        );
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back() {
        let primary = StubProvider::failing(500);
        let secondary = StubProvider::found("jane@acme.com");
        let outcome = finder(Some(primary.clone()), Some(secondary.clone()))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();

        assert_eq!(outcome.email(), Some("jane@acme.com"));
        assert!(matches!(
            outcome,
            DiscoveryOutcome::Found {
                source: DiscoverySource::Secondary,
                ..
            }
        ));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_primary_empty_falls_back() {
        let primary = StubProvider::empty();
        let secondary = StubProvider::found("jane@acme.com");
        let outcome = finder(Some(primary), Some(secondary))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(outcome.email(), Some("jane@acme.com"));
    }

    #[tokio::test]
    async fn test_blank_email_counts_as_miss() {
        let primary = StubProvider::found("   ");
        let secondary = StubProvider::empty();
        let outcome = finder(Some(primary), Some(secondary.clone()))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(outcome, DiscoveryOutcome::NotFound);
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_primary_goes_to_secondary() {
        let secondary = StubProvider::found("jane@acme.com");
        let outcome = finder(None, Some(secondary.clone()))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(outcome.email(), Some("jane@acme.com"));
        assert_eq!(secondary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_is_not_found() {
        let primary = StubProvider::failing(404);
        let secondary = StubProvider::failing(503);
        let outcome = finder(Some(primary), Some(secondary))
            .find("Acme", Some("Jane Doe"))
            .await
            .unwrap();
        assert_eq!(outcome, DiscoveryOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_no_name_skips_primary() {
        let primary = StubProvider::found("jane@acme.com");
        let secondary = StubProvider::found("info@acme.com");
        let outcome = finder(Some(primary.clone()), Some(secondary))
            .find("Acme", None)
            .await
            .unwrap();
        assert_eq!(outcome.email(), Some("info@acme.com"));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_providers_fails_fast() {
        let err = finder(None, None).find("Acme", Some("Jane Doe")).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NoProvider));
    }

    #[tokio::test]
    async fn test_blank_company_fails_fast() {
        let primary = StubProvider::found("x@y.com");
        let err = finder(Some(primary.clone()), None)
            .find("  ", Some("Jane Doe"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingDomain));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_primary_only_without_name_fails_fast() {
        let primary = StubProvider::found("x@y.com");
        let err = finder(Some(primary.clone()), None)
            .find("Acme", Some(""))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NameRequired));
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_word_name_fails_fast() {
        let secondary = StubProvider::found("x@y.com");
        let err = finder(None, Some(secondary.clone()))
            .find("Acme", Some("Jane"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::IncompleteName(_)));
        assert_eq!(secondary.call_count(), 0);
    }
}
