use anyhow::Context as _;
use secrecy::SecretString;

use crate::command::Command;
use crate::config::BotConfig;
use crate::github::{GithubApp, IssueCommentEvent};
use crate::interactions::{ACCESS_DENIED, BotReply, COMMAND_NOT_FOUND};

mod close;

/// State shared by every request, built once at startup.
pub struct Context {
    pub bot: BotConfig,
    pub github: GithubApp,
    pub webhook_secret: SecretString,
}

/// The one side effect the bot performs in answer to a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueAction {
    /// Post a reply on the issue.
    Comment(String),
    /// Close the issue.
    Close,
}

impl From<Command> for IssueAction {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::CloseIssue => IssueAction::Close,
        }
    }
}

/// Decides what, if anything, the bot does about a comment.
///
/// Only supported actions (by default just `created`) on comments that start
/// with the bot mention get through. Past that, the sender must be
/// whitelisted and the whole body must be a known command. Every event that
/// gets through produces exactly one action.
pub fn plan(config: &BotConfig, event: &IssueCommentEvent) -> Option<IssueAction> {
    let body = &event.comment.body;
    if !config.is_action_supported(&event.action) || !config.is_comment_for_bot(body) {
        tracing::debug!(
            "skipping comment {}, action {:?}, not addressed to {}",
            event.comment.id,
            event.action,
            config.bot_name()
        );
        return None;
    }

    if !config.is_whitelisted(event.sender.id) {
        tracing::info!(
            "user {} ({}) is not allowed to run commands",
            event.sender.login,
            event.sender.id
        );
        return Some(IssueAction::Comment(ACCESS_DENIED.to_string()));
    }

    match config.commands().get(body) {
        Some(cmd) => Some(cmd.into()),
        None => {
            tracing::info!("unknown command {body:?}");
            Some(IssueAction::Comment(COMMAND_NOT_FOUND.to_string()))
        }
    }
}

/// Handles a verified comment event, performing at most one GitHub API
/// action after acquiring an installation token.
pub async fn handle(ctx: &Context, event: &IssueCommentEvent) -> anyhow::Result<()> {
    let Some(action) = plan(&ctx.bot, event) else {
        return Ok(());
    };
    let issue = event.issue_ref();
    let installation = event
        .installation
        .with_context(|| format!("event for {issue} has no installation"))?;
    tracing::info!(
        "{issue}: {action:?} as installation {}",
        installation.id
    );

    let client = ctx.github.installation_client(installation.id).await?;
    match action {
        IssueAction::Comment(message) => BotReply::new(&issue, message).post(&client).await,
        IssueAction::Close => close::handle_command(&client, &issue).await,
    }
}
