use crate::command::{Command, CommandTable};
use crate::github::{IssueCommentAction, UserId};
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_BOT_NAME: &str = "@simple-issues-bot";
const DEFAULT_WHITELIST: &[UserId] = &[13386468];
const DEFAULT_PRIVATE_KEY_PATH: &str = ".data/private-key.pem";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_URL: &str = "https://api.github.com";

/// The bot settings as written in the optional `BOT_CONFIG` TOML file.
///
/// Every key is optional and falls back to the built-in bot.
#[derive(PartialEq, Eq, Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct BotConfigFile {
    #[serde(default)]
    pub(crate) bot_name: Option<String>,
    #[serde(default)]
    pub(crate) whitelist: Option<Vec<UserId>>,
    #[serde(default)]
    pub(crate) supported_actions: Option<Vec<IssueCommentAction>>,
    /// command suffix -> command
    #[serde(default)]
    pub(crate) commands: Option<HashMap<String, Command>>,
}

/// Immutable bot configuration, built once at startup and shared by every
/// request.
#[derive(Debug, Clone)]
pub struct BotConfig {
    bot_name: String,
    whitelist: HashSet<UserId>,
    supported_actions: Vec<IssueCommentAction>,
    commands: CommandTable,
}

impl BotConfig {
    pub fn new(
        bot_name: impl Into<String>,
        whitelist: impl IntoIterator<Item = UserId>,
        supported_actions: Vec<IssueCommentAction>,
        commands: impl IntoIterator<Item = (String, Command)>,
    ) -> Self {
        let bot_name = bot_name.into();
        let commands = CommandTable::new(&bot_name, commands);
        BotConfig {
            bot_name,
            whitelist: whitelist.into_iter().collect(),
            supported_actions,
            commands,
        }
    }

    pub fn from_toml(contents: &str) -> Result<BotConfig, ConfigurationError> {
        let file = toml::from_str::<BotConfigFile>(contents).map_err(ConfigurationError::Toml)?;
        Ok(BotConfig::from_file(file))
    }

    pub fn load(path: &Path) -> Result<BotConfig, ConfigurationError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Io(path.to_path_buf(), e))?;
        let config = BotConfig::from_toml(&contents)?;
        tracing::debug!("bot configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    fn from_file(file: BotConfigFile) -> BotConfig {
        let default = BotConfig::default();
        BotConfig::new(
            file.bot_name.unwrap_or(default.bot_name),
            file.whitelist
                .map(|ids| ids.into_iter().collect())
                .unwrap_or(default.whitelist),
            file.supported_actions.unwrap_or(default.supported_actions),
            file.commands
                .unwrap_or_else(|| default_commands().collect()),
        )
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn is_action_supported(&self, action: &IssueCommentAction) -> bool {
        self.supported_actions.contains(action)
    }

    pub fn is_comment_for_bot(&self, body: &str) -> bool {
        body.starts_with(&self.bot_name)
    }

    pub fn is_whitelisted(&self, user: UserId) -> bool {
        self.whitelist.contains(&user)
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig::new(
            DEFAULT_BOT_NAME,
            DEFAULT_WHITELIST.iter().copied(),
            vec![IssueCommentAction::Created],
            default_commands(),
        )
    }
}

fn default_commands() -> impl Iterator<Item = (String, Command)> {
    [("close this issue".to_string(), Command::CloseIssue)].into_iter()
}

/// Process-level settings read from the environment.
pub struct ServerConfig {
    pub webhook_secret: SecretString,
    pub app_id: u64,
    pub private_key_path: PathBuf,
    pub port: u16,
    pub webhook_path: String,
    pub api_url: String,
    pub bot_config: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<ServerConfig, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ServerConfig, ConfigurationError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigurationError::MissingVar(name))
        };

        let webhook_secret: SecretString = required("WEBHOOK_SECRET")?.into();
        let app_id = required("APP_ID")?
            .parse()
            .map_err(|_| ConfigurationError::InvalidVar("APP_ID"))?;
        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigurationError::InvalidVar("PORT"))?,
            None => DEFAULT_PORT,
        };
        let webhook_path = lookup("WEBHOOK_PATH").unwrap_or_else(|| "/".to_string());
        // The router reads braces and `*` as path parameters.
        if !webhook_path.starts_with('/') || webhook_path.contains(['{', '}', '*']) {
            return Err(ConfigurationError::InvalidVar("WEBHOOK_PATH"));
        }

        Ok(ServerConfig {
            webhook_secret,
            app_id,
            private_key_path: lookup("PRIVATE_KEY_PATH")
                .unwrap_or_else(|| DEFAULT_PRIVATE_KEY_PATH.to_string())
                .into(),
            port,
            webhook_path,
            api_url: lookup("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            bot_config: lookup("BOT_CONFIG").map(PathBuf::from),
        })
    }

    pub fn load_bot_config(&self) -> Result<BotConfig, ConfigurationError> {
        match &self.bot_config {
            Some(path) => BotConfig::load(path),
            None => Ok(BotConfig::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigurationError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
    Io(PathBuf, std::io::Error),
    Toml(toml::de::Error),
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::MissingVar(name) => {
                write!(f, "environment variable `{name}` must be set")
            }
            ConfigurationError::InvalidVar(name) => {
                write!(f, "environment variable `{name}` has an invalid value")
            }
            ConfigurationError::Io(path, e) => {
                write!(f, "failed to read {}: {e}", path.display())
            }
            ConfigurationError::Toml(e) => {
                write!(f, "malformed bot configuration: {e}")
            }
        }
    }
}
