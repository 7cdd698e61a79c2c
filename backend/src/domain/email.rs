//! Email address value object with masking support.
//!
//! Passcodes are bound to an email address, so the address doubles as the
//! voter's authentication identity. The masked rendering confirms the
//! delivery target to the client without disclosing the full address.

use serde::{Deserialize, Serialize};

/// Validation errors for [`EmailAddress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailAddressError {
    /// The address is empty or whitespace.
    #[error("email address must not be empty")]
    Empty,
    /// The address has no local part or no domain around a single `@`.
    #[error("email address is malformed: {value}")]
    Malformed { value: String },
}

/// A syntactically plausible email address.
///
/// Validation is deliberately shallow (non-empty local part and domain around
/// one `@`); deliverability is the transport's concern, not the domain's.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("grace@example.com").expect("valid address");
/// assert_eq!(email.as_str(), "grace@example.com");
/// assert_eq!(email.masked(), "gra***@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and validate an address.
    pub fn new(value: impl Into<String>) -> Result<Self, EmailAddressError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmailAddressError::Empty);
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailAddressError::Malformed { value }),
        }
    }

    /// The raw address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Partially redacted rendering, e.g. `gra***@example.com`.
    ///
    /// Local parts longer than three characters keep their first three;
    /// anything shorter keeps only the first character, so `ab@example.com`
    /// renders as `a***@example.com`. The constructor guarantees an `@` is
    /// present; should the invariant ever be violated the fully-redacted form
    /// is returned rather than leaking the raw value.
    pub fn masked(&self) -> String {
        match self.0.split_once('@') {
            Some((local, domain)) => {
                let keep = if local.chars().count() > 3 { 3 } else { 1 };
                let visible: String = local.chars().take(keep).collect();
                format!("{visible}***@{domain}")
            }
            None => "***@***.***".to_owned(),
        }
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
