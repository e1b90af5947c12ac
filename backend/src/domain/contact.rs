//! Contact identifiers: email addresses and phone numbers.
//!
//! Validation is syntactic only. Phone normalisation assumes a single default
//! country (`+39`) for numbers written without an international prefix.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const DEFAULT_COUNTRY_PREFIX: &str = "+39";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .unwrap_or_else(|err| panic!("email pattern must compile: {err}"))
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\+39\d{9,10}$")
            .unwrap_or_else(|err| panic!("phone pattern must compile: {err}"))
    })
}

/// Syntactic email check.
///
/// Accepts dot-separated unquoted atoms or a quoted local part, at either a
/// bracketed IPv4 literal or dotted labels ending in a TLD of two or more
/// letters. Lowercasing is left to the caller.
///
/// # Examples
/// ```
/// use booking::domain::validate_email;
///
/// assert!(validate_email("anna.rossi@example.it"));
/// assert!(!validate_email("anna@localhost"));
/// ```
pub fn validate_email(candidate: &str) -> bool {
    email_pattern().is_match(candidate)
}

/// Errors raised while validating contact details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("phone number is not valid")]
    InvalidPhone,
}

/// Lowercased, syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Lowercase `raw` and validate it.
    ///
    /// # Errors
    /// [`ContactValidationError::InvalidEmail`] when the address is malformed.
    pub fn parse(raw: &str) -> Result<Self, ContactValidationError> {
        let lowered = raw.trim().to_lowercase();
        if validate_email(&lowered) {
            Ok(Self(lowered))
        } else {
            Err(ContactValidationError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Phone number in normalised international form (`+39` followed by 9 or 10
/// digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize_phone(&value)
    }
}

/// Normalise a phone number to international form.
///
/// Whitespace and parentheses are removed. Without a leading `+`, a leading
/// `00` becomes `+`; any other number gets the default `+39` prefix. The
/// result must be an Italian number of 9 or 10 digits. Normalising an already
/// normalised number returns it unchanged.
///
/// # Examples
/// ```
/// use booking::domain::normalize_phone;
///
/// let phone = normalize_phone("(0039) 333 123 4567").expect("valid number");
/// assert_eq!(phone.as_str(), "+393331234567");
/// assert!(normalize_phone("+441234567890").is_err());
/// ```
pub fn normalize_phone(raw: &str) -> Result<PhoneNumber, ContactValidationError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();

    let international = if compact.starts_with('+') {
        compact
    } else if let Some(rest) = compact.strip_prefix("00") {
        format!("+{rest}")
    } else {
        format!("{DEFAULT_COUNTRY_PREFIX}{compact}")
    };

    if phone_pattern().is_match(&international) {
        Ok(PhoneNumber(international))
    } else {
        Err(ContactValidationError::InvalidPhone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123456789", "+39123456789")]
    #[case("0039 12 345 67  890", "+391234567890")]
    #[case("00391234567890", "+391234567890")]
    #[case("0039123456789", "+39123456789")]
    #[case("0039 12 34 56 789", "+39123456789")]
    #[case("+39123456789", "+39123456789")]
    #[case("(0039)123456789", "+39123456789")]
    fn normalises_valid_numbers(#[case] raw: &str, #[case] expected: &str) {
        let phone = normalize_phone(raw).expect("number is valid");
        assert_eq!(phone.as_str(), expected);
        assert_eq!(
            normalize_phone(phone.as_str()).expect("normalised number stays valid"),
            phone
        );
    }

    #[rstest]
    #[case("+441234567890")]
    #[case("+3912345678")]
    #[case("12345678")]
    #[case("+39123456789012")]
    #[case("")]
    fn rejects_invalid_numbers(#[case] raw: &str) {
        assert_eq!(normalize_phone(raw), Err(ContactValidationError::InvalidPhone));
    }

    #[rstest]
    #[case("user@example.com")]
    #[case("first.last@sub.example.co")]
    #[case("\"quoted local\"@example.org")]
    #[case("ops@[192.168.0.1]")]
    #[case("a+tag@example.io")]
    fn accepts_valid_emails(#[case] candidate: &str) {
        assert!(validate_email(candidate));
    }

    #[rstest]
    #[case("plainaddress")]
    #[case("user@localhost")]
    #[case("user@@example.com")]
    #[case(".user@example.com")]
    #[case("user@example.c")]
    #[case("us er@example.com")]
    fn rejects_invalid_emails(#[case] candidate: &str) {
        assert!(!validate_email(candidate));
    }

    #[test]
    fn email_address_is_lowercased_before_validation() {
        let email = EmailAddress::parse(" Anna.Rossi@Example.IT ").expect("valid email");
        assert_eq!(email.as_str(), "anna.rossi@example.it");
    }
}
