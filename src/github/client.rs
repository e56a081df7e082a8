use anyhow::Context;
use axum::body::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};

const BOT_USER_AGENT: &str = "simple-issues-bot";

/// How a request proves who is sending it.
#[derive(Clone)]
enum Credentials {
    /// A GitHub App JWT, only good for the `/app` endpoints.
    App(SecretString),
    /// An installation access token.
    Installation(SecretString),
}

#[derive(Clone)]
pub struct GithubClient {
    credentials: Credentials,
    client: Client,
    pub(crate) api_url: String,
}

impl GithubClient {
    /// A client acting as an installation of the App.
    pub fn new(client: Client, token: SecretString, api_url: String) -> Self {
        GithubClient {
            credentials: Credentials::Installation(token),
            client,
            api_url,
        }
    }

    /// A client acting as the App itself, authenticated by `jwt`.
    pub(crate) fn new_app(client: Client, jwt: SecretString, api_url: String) -> Self {
        GithubClient {
            credentials: Credentials::App(jwt),
            client,
            api_url,
        }
    }

    pub(crate) async fn send_req(&self, req: RequestBuilder) -> anyhow::Result<(Bytes, String)> {
        tracing::debug!("send_req with {:?}", req);
        let req_dbg = format!("{req:?}");
        let req = req
            .build()
            .with_context(|| format!("building reqwest {req_dbg}"))?;

        let resp = self.client.execute(req).await?;
        let maybe_err = resp.error_for_status_ref().err();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read response body {req_dbg}"))?;
        if let Some(e) = maybe_err {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("response: {}", String::from_utf8_lossy(&body)));
        }

        Ok((body, req_dbg))
    }

    pub async fn json<T>(&self, req: RequestBuilder) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let (body, req_dbg) = self.send_req(req).await?;
        serde_json::from_slice(&body).with_context(|| format!("failed to decode response {req_dbg}"))
    }

    pub(crate) fn patch(&self, url: &str) -> RequestBuilder {
        tracing::trace!("patch {:?}", url);
        self.client.patch(url).configure(self)
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        tracing::trace!("post {:?}", url);
        self.client.post(url).configure(self)
    }
}

trait RequestSend: Sized {
    fn configure(self, g: &GithubClient) -> Self;
}

impl RequestSend for RequestBuilder {
    fn configure(self, g: &GithubClient) -> RequestBuilder {
        let value = match &g.credentials {
            Credentials::App(jwt) => format!("Bearer {}", jwt.expose_secret()),
            Credentials::Installation(token) => format!("token {}", token.expose_secret()),
        };
        let builder = self
            .header(USER_AGENT, BOT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json");
        match HeaderValue::from_str(&value) {
            Ok(mut auth) => {
                auth.set_sensitive(true);
                builder.header(AUTHORIZATION, auth)
            }
            // GitHub answers 401 without it, and `send_req` reports that.
            Err(_) => {
                tracing::error!("credentials are not a valid header value");
                builder
            }
        }
    }
}
