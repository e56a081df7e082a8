//! Allows to close an issue or a PR

use crate::github::{GithubClient, IssueRef};

pub(super) async fn handle_command(client: &GithubClient, issue: &IssueRef) -> anyhow::Result<()> {
    issue.close(client).await?;
    tracing::info!("closed {issue}");
    Ok(())
}
