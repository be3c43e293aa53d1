use std::sync::Arc;

use reqwest::Client;
use tokio::sync::RwLock;

use crate::applications::pipeline::Pipeline;
use crate::auth::store::UserStore;
use crate::discovery::{DiscoveryCredentials, DiscoveryEndpoints, EmailFinder};
use crate::generation::sentence::SentenceGenerator;
use crate::mailer::Mailer;
use crate::settings::UserSettings;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Single user, single session: the settings and the pipeline belong to the
/// one user of this process and are lost on restart.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<UserSettings>>,
    pub pipeline: Arc<RwLock<Pipeline>>,
    /// Pluggable sentence backend. Default: LlmSentenceGenerator.
    pub sentences: Arc<dyn SentenceGenerator>,
    pub mailer: Arc<dyn Mailer>,
    pub files: Arc<dyn FileStore>,
    pub users: Arc<dyn UserStore>,
    /// Shared by the discovery providers.
    pub http: Client,
    pub discovery_endpoints: DiscoveryEndpoints,
}

impl AppState {
    /// Builds the discovery chain for the user's current keys.
    pub fn email_finder(&self, credentials: &DiscoveryCredentials) -> EmailFinder {
        EmailFinder::from_credentials(&self.http, credentials, &self.discovery_endpoints)
    }
}
