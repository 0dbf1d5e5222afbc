//! Username to UUID resolution.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

/// Base URL of the Mojang profile lookup endpoint.
pub const MOJANG_PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft/";

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves a player name to a UUID.
///
/// Resolution never fails loudly: any lookup problem yields `None`.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, username: &str) -> Option<Uuid>;
}

#[derive(Debug, Deserialize)]
struct Profile {
    id: String,
}

/// Parse a profile lookup response body into a UUID.
#[must_use]
pub fn parse_profile(body: &str) -> Option<Uuid> {
    let profile: Profile = serde_json::from_str(body).ok()?;
    Uuid::parse_str(&profile.id).ok()
}

/// Resolver backed by the Mojang profile API.
#[derive(Debug, Clone)]
pub struct MojangResolver {
    client: Client,
    base_url: String,
}

impl MojangResolver {
    /// Create a resolver against the public Mojang API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(MOJANG_PROFILE_URL)
    }

    /// Create a resolver against a different profile endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// The lookup URL for `username`, or `None` if the base URL is invalid.
    #[must_use]
    pub fn profile_url(&self, username: &str) -> Option<Url> {
        let mut url = match Url::parse(&self.base_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(base_url = %self.base_url, error = %e, "Invalid profile URL");
                return None;
            }
        };
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push(username);
        Some(url)
    }
}

#[async_trait]
impl IdentityResolver for MojangResolver {
    async fn resolve(&self, username: &str) -> Option<Uuid> {
        let url = self.profile_url(username)?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(username, error = %e, "Profile lookup failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(username, status = %response.status(), "Profile not found");
            return None;
        }

        match response.text().await {
            Ok(body) => {
                let uuid = parse_profile(&body);
                if uuid.is_none() {
                    tracing::warn!(username, "Malformed profile response");
                }
                uuid
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Failed to read profile response");
                None
            }
        }
    }
}
