use std::fmt;

use anyhow::Context;

use super::GithubClient;

/// Identifies an issue (or PR) on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    fn url(&self, client: &GithubClient) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            client.api_url, self.owner, self.repo, self.number
        )
    }

    pub async fn post_comment(&self, client: &GithubClient, body: &str) -> anyhow::Result<()> {
        #[derive(serde::Serialize)]
        struct PostComment<'a> {
            body: &'a str,
        }
        let comments_url = format!("{}/comments", self.url(client));
        client
            .send_req(client.post(&comments_url).json(&PostComment { body }))
            .await
            .with_context(|| format!("failed to post comment on {self}"))?;
        Ok(())
    }

    /// Closing an issue that is already closed succeeds on GitHub's side, so
    /// this is safe to repeat.
    pub async fn close(&self, client: &GithubClient) -> anyhow::Result<()> {
        #[derive(serde::Serialize)]
        struct CloseIssue<'a> {
            state: &'a str,
        }
        client
            .send_req(
                client
                    .patch(&self.url(client))
                    .json(&CloseIssue { state: "closed" }),
            )
            .await
            .with_context(|| format!("failed to close {self}"))?;
        Ok(())
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
