pub(crate) mod app;
pub(crate) mod client;
pub(crate) mod issue;
pub(crate) mod utils;
mod webhook;

pub use app::GithubApp;
pub use client::GithubClient;
pub use issue::IssueRef;
pub use webhook::event::*;
pub use webhook::{ACK, EventName, MAX_PAYLOAD_SIZE, check_payload_signed, webhook};

pub type UserId = u64;
