use std::ops::Deref;

use super::super::utils::opt_string;
use super::super::{IssueRef, UserId};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct User {
    pub login: String,
    pub id: UserId,
}

/// The GitHub user that triggered the event.
#[derive(Debug, serde::Deserialize)]
pub struct Sender {
    #[serde(flatten)]
    pub user: User,
}

impl Deref for Sender {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: User,
}

#[derive(Debug, serde::Deserialize)]
pub struct Issue {
    pub number: u64,
}

#[derive(Debug, serde::Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(deserialize_with = "opt_string")]
    pub body: String,
}

/// The App installation the event was delivered for.
///
/// Only present on deliveries to a GitHub App, not on plain repository
/// webhooks.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Installation {
    pub id: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCommentAction {
    Created,
    Edited,
    Deleted,
    /// Any action GitHub adds later.
    #[serde(other)]
    Other,
}

#[derive(Debug, serde::Deserialize)]
pub struct IssueCommentEvent {
    pub action: IssueCommentAction,
    pub issue: Issue,
    pub comment: Comment,
    pub repository: Repository,
    pub sender: Sender,
    #[serde(default)]
    pub installation: Option<Installation>,
}

impl IssueCommentEvent {
    /// The issue the comment was posted on.
    pub fn issue_ref(&self) -> IssueRef {
        IssueRef {
            owner: self.repository.owner.login.clone(),
            repo: self.repository.name.clone(),
            number: self.issue.number,
        }
    }
}
