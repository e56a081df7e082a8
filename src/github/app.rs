//! GitHub App authentication.
//!
//! The App signs a short-lived JWT with its private key and trades it for an
//! installation access token, which is what the issue endpoints accept.
//!
//! <https://docs.github.com/en/apps/creating-github-apps/authenticating-with-a-github-app/authenticating-as-a-github-app-installation>

use std::path::Path;

use anyhow::Context;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::SecretString;

use super::GithubClient;

/// GitHub rejects app JWTs that live longer than ten minutes.
const JWT_LIFETIME_SECS: u64 = 9 * 60;
/// Backdates `iat` to absorb clock drift between us and GitHub.
const JWT_CLOCK_DRIFT_SECS: u64 = 60;

#[derive(Debug, serde::Serialize)]
struct AppClaims {
    iat: u64,
    exp: u64,
    iss: String,
}

#[derive(Debug, serde::Deserialize)]
struct InstallationToken {
    token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// The bot's identity as a GitHub App.
#[derive(Clone)]
pub struct GithubApp {
    app_id: u64,
    key: EncodingKey,
    client: Client,
    api_url: String,
}

impl GithubApp {
    pub fn new(app_id: u64, private_key_pem: &[u8], api_url: String) -> anyhow::Result<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem)
            .context("GitHub App private key is not a valid RSA PEM key")?;
        Ok(GithubApp {
            app_id,
            key,
            client: Client::new(),
            api_url,
        })
    }

    pub fn from_key_file(app_id: u64, path: &Path, api_url: String) -> anyhow::Result<Self> {
        let pem = std::fs::read(path)
            .with_context(|| format!("failed to read private key {}", path.display()))?;
        Self::new(app_id, &pem, api_url)
    }

    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    fn jwt(&self) -> anyhow::Result<SecretString> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = AppClaims {
            iat: now.saturating_sub(JWT_CLOCK_DRIFT_SECS),
            exp: now + JWT_LIFETIME_SECS,
            iss: self.app_id.to_string(),
        };
        let jwt = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .context("failed to sign GitHub App JWT")?;
        Ok(jwt.into())
    }

    /// Returns a client authenticated as the given installation.
    ///
    /// Every call asks GitHub for a fresh token; nothing is cached.
    pub async fn installation_client(&self, installation_id: u64) -> anyhow::Result<GithubClient> {
        let app = GithubClient::new_app(self.client.clone(), self.jwt()?, self.api_url.clone());
        let url = format!(
            "{}/app/installations/{installation_id}/access_tokens",
            self.api_url
        );
        let token: InstallationToken = app
            .json(app.post(&url))
            .await
            .with_context(|| format!("failed to get token for installation {installation_id}"))?;
        tracing::debug!(
            "got token for installation {installation_id}, expires at {}",
            token.expires_at
        );
        Ok(GithubClient::new(
            self.client.clone(),
            token.token.into(),
            self.api_url.clone(),
        ))
    }
}
