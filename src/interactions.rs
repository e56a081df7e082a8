use crate::github::{GithubClient, IssueRef};

pub const ACCESS_DENIED: &str = "Access Denied! This user can't close this issue.";
pub const COMMAND_NOT_FOUND: &str = "Sorry, this command not found.";

/// A reply the bot posts on the issue that addressed it.
///
/// The message goes out verbatim, with no markup added.
pub struct BotReply<'a> {
    issue: &'a IssueRef,
    message: String,
}

impl<'a> BotReply<'a> {
    pub fn new<T>(issue: &'a IssueRef, message: T) -> BotReply<'a>
    where
        T: Into<String>,
    {
        BotReply {
            issue,
            message: message.into(),
        }
    }

    pub async fn post(&self, client: &GithubClient) -> anyhow::Result<()> {
        self.issue.post_comment(client, &self.message).await
    }
}
