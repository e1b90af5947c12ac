//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `BOOKING_*` environment variables and the
//! optional configuration file, in increasing order of precedence as
//! OrthoConfig defines it. Everything except the bind address is optional;
//! missing values fall back to the defaults of the component they configure.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{ConfirmationSettings, ConfirmationSettingsError, TokenRetention};
use crate::outbound::email::SmtpRelay;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMS_TIMEOUT_SECS: u64 = 10;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("bind address `{value}` is not a socket address")]
    InvalidBindAddr { value: String },
    #[error("sms gateway url `{value}` is not a valid URL")]
    InvalidSmsGatewayUrl { value: String },
    #[error("sms gateway url is set but the api key is missing")]
    MissingSmsApiKey,
    #[error(transparent)]
    Confirmation(#[from] ConfirmationSettingsError),
}

/// Configuration for the booking service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BOOKING")]
pub struct BookingSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-process store is used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_checkout_timeout_secs: Option<u64>,
    /// Prefix of the confirmation link; the public booking id is appended.
    pub base_url: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub sms_sender_id: Option<String>,
    /// Highest accepted price per text message, e.g. `0.10`.
    pub sms_max_price: Option<String>,
    pub sms_gateway_url: Option<String>,
    pub sms_api_key: Option<String>,
    pub sms_timeout_secs: Option<u64>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_starttls: Option<bool>,
    /// IANA zone used to render slot times, e.g. `Europe/Rome`.
    pub time_zone: Option<String>,
    /// Locale for month names, e.g. `it_IT`.
    pub locale: Option<String>,
    /// `strftime` pattern for the slot date in confirmations.
    pub date_format: Option<String>,
    /// Seconds a consumed transaction token blocks replays.
    pub token_ttl_secs: Option<u64>,
}

/// Endpoint and credentials of the SMS gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsGateway {
    pub endpoint: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl BookingSettings {
    /// Address for the HTTP listener.
    ///
    /// # Errors
    /// [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Confirmation rendering settings with every configured override applied.
    ///
    /// # Errors
    /// Propagates invalid base URLs, time zones and locales.
    pub fn confirmation(&self) -> Result<ConfirmationSettings, SettingsError> {
        let mut settings = ConfirmationSettings::default();
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url)?;
        }
        if self.sender_name.is_some() || self.sender_email.is_some() {
            settings = settings.with_sender(
                self.sender_name
                    .as_deref()
                    .unwrap_or(ConfirmationSettings::DEFAULT_SENDER_NAME),
                self.sender_email
                    .as_deref()
                    .unwrap_or(ConfirmationSettings::DEFAULT_SENDER_EMAIL),
            );
        }
        if self.sms_sender_id.is_some() || self.sms_max_price.is_some() {
            settings = settings.with_sms_sender(
                self.sms_sender_id
                    .as_deref()
                    .unwrap_or(ConfirmationSettings::DEFAULT_SMS_SENDER_ID),
                self.sms_max_price
                    .as_deref()
                    .unwrap_or(ConfirmationSettings::DEFAULT_SMS_MAX_PRICE),
            );
        }
        if let Some(zone) = &self.time_zone {
            settings = settings.with_time_zone(zone)?;
        }
        if let Some(locale) = &self.locale {
            settings = settings.with_locale(locale)?;
        }
        if let Some(format) = &self.date_format {
            settings = settings.with_date_format(format.as_str());
        }
        Ok(settings)
    }

    /// Connection pool for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let mut config = PoolConfig::new(self.database_url.clone()?);
        if let Some(max) = self.db_max_connections {
            config = config.max_connections(max);
        }
        if let Some(secs) = self.db_checkout_timeout_secs {
            config = config.checkout_timeout(Duration::from_secs(secs));
        }
        Some(config)
    }

    /// Token retention window, clamped to the supported range.
    pub fn token_retention(&self) -> TokenRetention {
        TokenRetention::from_setting(self.token_ttl_secs)
    }

    /// SMTP relay, or `None` when no host is configured.
    pub fn smtp_relay(&self) -> Option<SmtpRelay> {
        let host = self.smtp_host.clone()?;
        Some(SmtpRelay {
            host,
            port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            starttls: self.smtp_starttls.unwrap_or(true),
        })
    }

    /// SMS gateway, or `None` when no gateway URL is configured.
    ///
    /// # Errors
    /// Rejects malformed URLs and a URL without an API key.
    pub fn sms_gateway(&self) -> Result<Option<SmsGateway>, SettingsError> {
        let Some(raw) = self.sms_gateway_url.as_deref() else {
            return Ok(None);
        };
        let endpoint = Url::parse(raw).map_err(|_| SettingsError::InvalidSmsGatewayUrl {
            value: raw.to_owned(),
        })?;
        let api_key = self
            .sms_api_key
            .clone()
            .ok_or(SettingsError::MissingSmsApiKey)?;
        Ok(Some(SmsGateway {
            endpoint,
            api_key,
            timeout: Duration::from_secs(self.sms_timeout_secs.unwrap_or(DEFAULT_SMS_TIMEOUT_SECS)),
        }))
    }
}
