//! Portal configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEND_TEXT_URL: &str = "http://127.0.0.1:4000";
pub const DEFAULT_ROLE_ATTRIBUTE: &str = "custom:role";
pub const DEFAULT_CHAT_ROOM_ID: &str = "1234";
pub const DEFAULT_CHAT_MESSAGE_LIMIT: u32 = 10;
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Timeouts applied to every outbound HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    /// Build a `reqwest` client honoring these timeouts.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn client(self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_secs))
            .connect_timeout(Duration::from_secs(self.connect_secs))
            .build()
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

/// Cognito Hosted UI settings. Sign-in is disabled when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedUiConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl HostedUiConfig {
    /// Load from `COGNITO_DOMAIN`, `COGNITO_CLIENT_ID`, `COGNITO_CLIENT_SECRET`,
    /// `COGNITO_REDIRECT_URI`. Returns `None` if any are missing.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let domain = std::env::var("COGNITO_DOMAIN").ok()?;
        let client_id = std::env::var("COGNITO_CLIENT_ID").ok()?;
        let client_secret = std::env::var("COGNITO_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("COGNITO_REDIRECT_URI").ok()?;
        Some(Self { domain: domain.trim_end_matches('/').to_owned(), client_id, client_secret, redirect_uri })
    }

    /// Build the Hosted UI authorization URL with every parameter percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `domain` is not a valid base URL.
    pub fn authorize_url(&self, state: &str) -> Result<reqwest::Url, ConfigError> {
        let endpoint = format!("{}/oauth2/authorize", self.domain);
        reqwest::Url::parse_with_params(
            &endpoint,
            [
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", "openid aws.cognito.signin.user.admin"),
                ("state", state),
            ],
        )
        .map_err(|_| ConfigError::Invalid { var: "COGNITO_DOMAIN", value: self.domain.clone() })
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.domain)
    }
}

/// Resend settings for the email channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    /// Override for the Resend API root, from `RESEND_BASE_URL`.
    pub base_url: Option<reqwest::Url>,
}

impl EmailConfig {
    /// Load from `RESEND_API_KEY` and `RESEND_FROM`. `Ok(None)` if either is missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `RESEND_BASE_URL` is set but is not a URL.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Ok(api_key), Ok(from)) = (std::env::var("RESEND_API_KEY"), std::env::var("RESEND_FROM")) else {
            return Ok(None);
        };
        let base_url = match std::env::var("RESEND_BASE_URL") {
            Ok(raw) => Some(
                reqwest::Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid { var: "RESEND_BASE_URL", value: raw })?,
            ),
            Err(_) => None,
        };
        Ok(Some(Self { api_key, from, base_url }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub port: u16,
    pub send_text_url: String,
    pub graphql_url: String,
    pub cognito_region: String,
    pub role_attribute: String,
    pub chat_room_id: String,
    pub chat_message_limit: u32,
    pub timeouts: HttpTimeouts,
    pub hosted_ui: Option<HostedUiConfig>,
    pub email: Option<EmailConfig>,
}

impl PortalConfig {
    /// Build typed portal config from environment variables.
    ///
    /// Required:
    /// - `GRAPHQL_URL`
    /// - `COGNITO_REGION`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SEND_TEXT_URL`: default `http://127.0.0.1:4000`
    /// - `ROLE_ATTRIBUTE`: default `custom:role`
    /// - `CHAT_ROOM_ID`: default `1234`
    /// - `CHAT_MESSAGE_LIMIT`: default 10
    /// - `HTTP_REQUEST_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS`: default 10 / 5
    /// - `COGNITO_*` Hosted UI settings, `RESEND_*` email settings
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };
        let send_text_url = std::env::var("SEND_TEXT_URL")
            .unwrap_or_else(|_| DEFAULT_SEND_TEXT_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let graphql_url = required("GRAPHQL_URL")?;
        let cognito_region = required("COGNITO_REGION")?;
        let role_attribute = std::env::var("ROLE_ATTRIBUTE").unwrap_or_else(|_| DEFAULT_ROLE_ATTRIBUTE.to_owned());
        let chat_room_id = std::env::var("CHAT_ROOM_ID").unwrap_or_else(|_| DEFAULT_CHAT_ROOM_ID.to_owned());
        let chat_message_limit = match std::env::var("CHAT_MESSAGE_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "CHAT_MESSAGE_LIMIT", value: raw })?,
            Err(_) => DEFAULT_CHAT_MESSAGE_LIMIT,
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            port,
            send_text_url,
            graphql_url,
            cognito_region,
            role_attribute,
            chat_room_id,
            chat_message_limit,
            timeouts,
            hosted_ui: HostedUiConfig::from_env(),
            email: EmailConfig::from_env()?,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => Err(ConfigError::Missing(var)),
    }
}

pub(crate) fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
