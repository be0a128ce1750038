//! Application state shared across handlers.

use std::sync::Arc;

use mongodb::{Client, Database};

use crate::config::ServerConfig;
use crate::services::{FirebaseVerifier, StripeClient, TokenVerifier};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store client pools its own connections.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    db: Database,
    verifier: Arc<dyn TokenVerifier>,
    stripe: StripeClient,
}

impl AppState {
    /// Create the production state: Firebase token verification and Stripe.
    #[must_use]
    pub fn new(config: ServerConfig, client: &Client) -> Self {
        let verifier = Arc::new(FirebaseVerifier::new(&config.firebase));
        Self::with_verifier(config, client, verifier)
    }

    /// Create state with a custom token verifier.
    #[must_use]
    pub fn with_verifier(
        config: ServerConfig,
        client: &Client,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let db = client.database(&config.database_name);
        let stripe = StripeClient::new(&config.stripe);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                verifier,
                stripe,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// The application database.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.inner.verifier.as_ref()
    }

    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }
}
