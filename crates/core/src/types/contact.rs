//! Contact details: email addresses and phone numbers.
//!
//! Both types validate on construction and store a canonical form, so two
//! spellings of the same phone number collide on the database's unique
//! index instead of creating duplicate accounts.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation failures for [`Email`] and [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("email cannot be empty")]
    EmptyEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("email must look like name@domain")]
    MalformedEmail,
    #[error("phone number may only contain digits, spaces, dashes and a leading +")]
    InvalidPhoneCharacter,
    #[error("phone number must have between {min} and {max} digits")]
    PhoneLength { min: usize, max: usize },
}

/// An email address with one `@`, a non-empty local part and a dotted
/// domain. Stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Column width of `users.email`.
    pub const MAX_LENGTH: usize = 100;

    /// Validate and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError`] when the address is empty, too long or
    /// structurally invalid.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::EmptyEmail);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ContactError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(ContactError::MalformedEmail)?;
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok || s.chars().any(char::is_whitespace) {
            return Err(ContactError::MalformedEmail);
        }

        Ok(Self(s.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl FromStr for Email {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A phone number reduced to its digits, keeping a leading `+` when one was
/// given. `"+84 912-345-678"` becomes `"+84912345678"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 7;
    /// E.164 upper bound.
    pub const MAX_DIGITS: usize = 15;
    /// Longest canonical form: `+` and [`Self::MAX_DIGITS`] digits. Width of
    /// the `phone` columns.
    pub const MAX_LENGTH: usize = Self::MAX_DIGITS + 1;

    /// Validate and canonicalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError`] for characters other than digits, spaces and
    /// dashes (plus one leading `+`), or when the digit count is out of range.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        let (plus, rest) = s.strip_prefix('+').map_or((false, s), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len() + 1);
        if plus {
            digits.push('+');
        }
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(ContactError::InvalidPhoneCharacter),
            }
        }

        let count = digits.len() - usize::from(plus);
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(ContactError::PhoneLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl FromStr for PhoneNumber {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::parse("diner@example.com").is_ok());
        assert!(Email::parse("first.last+food@mail.example.vn").is_ok());
    }

    #[test]
    fn test_email_is_lowercased() {
        let email = Email::parse("  Chef@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "chef@example.com");
    }

    #[test]
    fn test_email_rejects_malformed() {
        assert_eq!(Email::parse(""), Err(ContactError::EmptyEmail));
        assert_eq!(Email::parse("no-at"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("@example.com"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("a@localhost"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("a@b@c.com"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("a b@c.com"), Err(ContactError::MalformedEmail));
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(95));
        assert!(matches!(
            Email::parse(&long),
            Err(ContactError::EmailTooLong { .. })
        ));
    }

    #[test]
    fn test_phone_canonical_form() {
        let phone = PhoneNumber::parse("+84 912-345-678").unwrap();
        assert_eq!(phone.as_str(), "+84912345678");

        let local = PhoneNumber::parse("0912 345 678").unwrap();
        assert_eq!(local.as_str(), "0912345678");
    }

    #[test]
    fn test_phone_rejects_letters() {
        assert_eq!(
            PhoneNumber::parse("09x2345678"),
            Err(ContactError::InvalidPhoneCharacter)
        );
        assert_eq!(
            PhoneNumber::parse("++84912345678"),
            Err(ContactError::InvalidPhoneCharacter)
        );
    }

    #[test]
    fn test_phone_length_bounds() {
        assert!(matches!(
            PhoneNumber::parse("12345"),
            Err(ContactError::PhoneLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("1234567890123456"),
            Err(ContactError::PhoneLength { .. })
        ));
        assert!(PhoneNumber::parse("1234567").is_ok());
    }

    #[test]
    fn test_phone_longest_fits_column() {
        let phone = PhoneNumber::parse("+84 912 345 678 901 2").unwrap();
        assert_eq!(phone.as_str(), "+849123456789012");
        assert_eq!(phone.as_str().len(), PhoneNumber::MAX_LENGTH);

        let local = PhoneNumber::parse("849 123 456 789 012").unwrap();
        assert!(local.as_str().len() <= PhoneNumber::MAX_LENGTH);
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
        let phone: PhoneNumber = serde_json::from_str("\"090 1234 567\"").unwrap();
        assert_eq!(phone.as_str(), "0901234567");
    }
}
