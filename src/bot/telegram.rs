//! Telegram Bot API session.
//!
//! # Responsibilities
//! - Validate the bot token shape at construction
//! - Verify the token against `getMe` when the session starts
//! - Track the connected flag for the lifecycle's shutdown check

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::bot::{BotError, BotFactory, BotSession};
use crate::config::BotConfig;

/// Identity reported by `getMe`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Bot API client holding one session.
pub struct TelegramBotClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    identity: Option<BotIdentity>,
    connected: bool,
}

/// Check the `<digits>:<secret>` token shape.
pub fn is_well_formed_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((id, secret)) => {
            !id.is_empty()
                && id.bytes().all(|b| b.is_ascii_digit())
                && !secret.is_empty()
                && !secret.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl TelegramBotClient {
    /// Create a client for the given token.
    ///
    /// Returns `Ok(None)` when no token is configured.
    pub fn new(config: &BotConfig) -> Result<Option<Self>, BotError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        if !is_well_formed_token(token) {
            return Err(BotError::InvalidToken);
        }

        let mut base = Url::parse(&config.api_base_url).map_err(|e| BotError::InvalidBaseUrl {
            url: config.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Some(Self {
            http: reqwest::Client::new(),
            base,
            token: token.to_string(),
            identity: None,
            connected: false,
        }))
    }

    /// Identity learned on start, if connected at least once.
    pub fn identity(&self) -> Option<&BotIdentity> {
        self.identity.as_ref()
    }

    fn method_url(&self, method: &str) -> Result<Url, BotError> {
        self.base
            .join(&format!("./bot{}/{}", self.token, method))
            .map_err(|e| BotError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_me(&self) -> Result<BotIdentity, BotError> {
        let url = self.method_url("getMe")?;
        let reply: ApiResponse<BotIdentity> = self.http.get(url).send().await?.json().await?;

        match (reply.ok, reply.result) {
            (true, Some(identity)) => Ok(identity),
            _ => Err(BotError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| "getMe returned no result".to_string()),
            )),
        }
    }
}

#[async_trait]
impl BotSession for TelegramBotClient {
    async fn start(&mut self) -> Result<(), BotError> {
        if self.connected {
            return Err(BotError::AlreadyConnected);
        }

        let identity = self.get_me().await?;
        tracing::info!(
            bot_id = identity.id,
            username = identity.username.as_deref().unwrap_or("-"),
            "Bot session established"
        );
        self.identity = Some(identity);
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn stop(&mut self) -> Result<(), BotError> {
        if !self.connected {
            return Err(BotError::NotConnected);
        }
        self.connected = false;
        tracing::info!("Bot session closed");
        Ok(())
    }
}

/// Builds [`TelegramBotClient`] sessions from [`BotConfig`].
#[derive(Debug, Clone)]
pub struct TelegramBotFactory {
    config: BotConfig,
}

impl TelegramBotFactory {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }
}

impl BotFactory for TelegramBotFactory {
    fn build(&self) -> Result<Option<Box<dyn BotSession>>, BotError> {
        Ok(TelegramBotClient::new(&self.config)?
            .map(|client| Box::new(client) as Box<dyn BotSession>))
    }
}
