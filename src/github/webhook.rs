use std::{fmt, sync::Arc};

use anyhow::Context as _;
use axum::{
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method},
};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use tracing::{Instrument, debug};

use crate::handlers::Context;

use super::IssueCommentEvent;

pub mod event;

/// Every request is answered with this, whatever happened to it.
pub const ACK: &str = "ok";

/// The largest delivery GitHub sends.
pub const MAX_PAYLOAD_SIZE: usize = 25 * 1024 * 1024;

/// The name of a webhook event.
#[derive(Debug, PartialEq, Eq)]
pub enum EventName {
    /// An issue or PR comment.
    ///
    /// <https://docs.github.com/en/developers/webhooks-and-events/webhooks/webhook-events-and-payloads#issue_comment>
    IssueComment,
    /// All other unhandled webhooks.
    Other,
}

impl std::str::FromStr for EventName {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<EventName, Self::Err> {
        Ok(match s {
            "issue_comment" => EventName::IssueComment,
            _ => EventName::Other,
        })
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EventName::IssueComment => "issue_comment",
                EventName::Other => "other",
            }
        )
    }
}

pub fn deserialize_payload<T: serde::de::DeserializeOwned>(v: &str) -> anyhow::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(v);
    let res: Result<T, _> = serde_path_to_error::deserialize(&mut deserializer);
    match res {
        Ok(r) => Ok(r),
        Err(e) => {
            let ctx = format!("at {}", e.path());
            Err(e.into_inner()).context(ctx)
        }
    }
}

/// Receives a webhook delivery.
///
/// The answer is always `200 ok`. Verified `issue_comment` events are handed
/// to a background task, so the answer does not wait for the GitHub API calls
/// the event triggers, and their failures do not reach GitHub.
pub async fn webhook(
    method: Method,
    headers: HeaderMap,
    State(ctx): State<Arc<Context>>,
    body: Result<Bytes, BytesRejection>,
) -> &'static str {
    if method != Method::POST {
        debug!("ignoring {method} request");
        return ACK;
    }
    let body = match body {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!("failed to read webhook body: {err}");
            return ACK;
        }
    };
    match receive(&headers, &body, &ctx) {
        Ok(Some(event)) => {
            tokio::spawn(
                async move {
                    if let Err(err) = crate::handlers::handle(&ctx, &event).await {
                        tracing::error!("handling event failed: {err:?}");
                    }
                }
                .in_current_span(),
            );
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("rejected webhook delivery: {err:#}"),
    }
    ACK
}

/// Verifies and parses a delivery. `None` means the event is of a kind the
/// bot does not handle.
fn receive(
    headers: &HeaderMap,
    body: &[u8],
    ctx: &Context,
) -> anyhow::Result<Option<IssueCommentEvent>> {
    let ev = headers
        .get("X-GitHub-Event")
        .context("X-GitHub-Event header must be set")?
        .to_str()
        .context("X-GitHub-Event header must be UTF-8 encoded")?;
    let Ok(event) = ev.parse::<EventName>();

    debug!("event={event}");

    let signature = headers
        .get("X-Hub-Signature-256")
        .context("X-Hub-Signature-256 header must be set")?
        .to_str()
        .context("X-Hub-Signature-256 header must be UTF-8 encoded")?;

    debug!("signature={signature}");

    check_payload_signed(ctx.webhook_secret.expose_secret().as_bytes(), signature, body)?;

    let payload = std::str::from_utf8(body).context("payload must be UTF-8")?;

    match event {
        EventName::IssueComment => {
            let payload = deserialize_payload::<IssueCommentEvent>(payload)
                .context("failed to deserialize IssueCommentEvent")?;

            tracing::info!("handling issue comment {payload:?}");

            Ok(Some(payload))
        }
        // Other events need not be handled
        EventName::Other => Ok(None),
    }
}

#[derive(Debug)]
pub struct SignedPayloadError;

impl fmt::Display for SignedPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to validate payload")
    }
}

impl std::error::Error for SignedPayloadError {}

pub fn check_payload_signed(
    secret: &[u8],
    signature: &str,
    payload: &[u8],
) -> Result<(), SignedPayloadError> {
    let signature = signature
        .strip_prefix("sha256=")
        .ok_or(SignedPayloadError)?;
    let signature = match hex::decode(signature) {
        Ok(e) => e,
        Err(e) => {
            tracing::trace!("hex decode failed for {signature:?}: {e:?}");
            return Err(SignedPayloadError);
        }
    };

    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(|_| SignedPayloadError)?;
    mac.update(payload);
    mac.verify_slice(&signature).map_err(|_| SignedPayloadError)
}
