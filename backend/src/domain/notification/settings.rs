//! Rendering and sender settings for confirmations.

use chrono::Locale;
use chrono_tz::Tz;
use url::Url;

/// Errors raised when confirmation settings are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationSettingsError {
    #[error("booking base url `{value}` is not a valid URL")]
    InvalidBaseUrl { value: String },
    #[error("time zone `{value}` is unknown")]
    UnknownTimeZone { value: String },
    #[error("locale `{value}` is unknown")]
    UnknownLocale { value: String },
}

/// How confirmations are addressed and formatted.
#[derive(Debug, Clone)]
pub struct ConfirmationSettings {
    pub(crate) base_url: String,
    pub(crate) sender_name: String,
    pub(crate) sender_email: String,
    pub(crate) sms_sender_id: String,
    pub(crate) sms_max_price: String,
    pub(crate) time_zone: Tz,
    pub(crate) locale: Locale,
    pub(crate) date_format: String,
}

impl ConfirmationSettings {
    pub const DEFAULT_BASE_URL: &'static str = "https://test.virgym.com/b/";
    pub const DEFAULT_SENDER_NAME: &'static str = "Avatarlab";
    pub const DEFAULT_SENDER_EMAIL: &'static str = "no-reply@test.virgym";
    pub const DEFAULT_SMS_SENDER_ID: &'static str = "Avatarlab";
    pub const DEFAULT_SMS_MAX_PRICE: &'static str = "0.10";
    pub const DEFAULT_TIME_ZONE: &'static str = "Europe/Rome";
    pub const DEFAULT_LOCALE: &'static str = "it_IT";
    pub const DEFAULT_DATE_FORMAT: &'static str = "%-d %B alle %-H:%M";

    /// Replace the booking base URL. The public id is appended verbatim, so
    /// the URL should end with `/`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfirmationSettingsError> {
        Url::parse(base_url).map_err(|_| ConfirmationSettingsError::InvalidBaseUrl {
            value: base_url.to_owned(),
        })?;
        self.base_url = base_url.to_owned();
        Ok(self)
    }

    pub fn with_sender(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self.sender_email = email.into();
        self
    }

    pub fn with_sms_sender(
        mut self,
        sender_id: impl Into<String>,
        max_price: impl Into<String>,
    ) -> Self {
        self.sms_sender_id = sender_id.into();
        self.sms_max_price = max_price.into();
        self
    }

    pub fn with_time_zone(mut self, name: &str) -> Result<Self, ConfirmationSettingsError> {
        self.time_zone = name
            .parse()
            .map_err(|_| ConfirmationSettingsError::UnknownTimeZone {
                value: name.to_owned(),
            })?;
        Ok(self)
    }

    pub fn with_locale(mut self, name: &str) -> Result<Self, ConfirmationSettingsError> {
        self.locale =
            Locale::try_from(name).map_err(|_| ConfirmationSettingsError::UnknownLocale {
                value: name.to_owned(),
            })?;
        Ok(self)
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// `Name <address>` mailbox used as the email sender.
    pub fn sender_mailbox(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender_email)
    }
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            sender_name: Self::DEFAULT_SENDER_NAME.to_owned(),
            sender_email: Self::DEFAULT_SENDER_EMAIL.to_owned(),
            sms_sender_id: Self::DEFAULT_SMS_SENDER_ID.to_owned(),
            sms_max_price: Self::DEFAULT_SMS_MAX_PRICE.to_owned(),
            time_zone: chrono_tz::Europe::Rome,
            locale: Locale::it_IT,
            date_format: Self::DEFAULT_DATE_FORMAT.to_owned(),
        }
    }
}
