//! Bot commands and the table that maps comment bodies onto them.

use std::collections::HashMap;

/// A command the bot knows how to carry out.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Closes the issue the command was posted on.
    CloseIssue,
}

/// Maps the exact text of a comment to the command it invokes.
///
/// Matching is on the whole comment body: case, whitespace and any trailing
/// text all count, so `"@bot close this issue "` matches nothing.
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    /// Builds the table by joining each suffix to the bot name with a space.
    pub fn new(bot_name: &str, commands: impl IntoIterator<Item = (String, Command)>) -> Self {
        CommandTable {
            commands: commands
                .into_iter()
                .map(|(suffix, cmd)| (format!("{bot_name} {suffix}"), cmd))
                .collect(),
        }
    }

    pub fn get(&self, body: &str) -> Option<Command> {
        self.commands.get(body).copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
