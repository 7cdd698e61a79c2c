//! Passcode entities and their explicit lifecycle state.
//!
//! Each issued passcode is a durable record keyed by email. The record moves
//! through exactly one transition, `Live -> Used`, performed either by a
//! successful verification or by a superseding issuance. Expiry is derived at
//! check time from the stored deadline; it is never a stored state of its
//! own and records are never swept.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::EmailAddress;

/// Default number of digits in a generated passcode.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Validation errors for [`OtpCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpCodeError {
    /// The code contains non-digit characters or is empty.
    #[error("passcode must be a non-empty string of ASCII digits")]
    NotNumeric,
}

/// A fixed-length numeric passcode.
///
/// # Examples
/// ```
/// use backend::domain::OtpCode;
///
/// let code = OtpCode::new("004217").expect("numeric code");
/// assert_eq!(code.as_str(), "004217");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OtpCode(String);

impl OtpCode {
    /// Validate a code supplied as text.
    pub fn new(value: impl Into<String>) -> Result<Self, OtpCodeError> {
        let value = value.into();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NotNumeric);
        }
        Ok(Self(value))
    }

    /// Draw a uniformly random code of `length` digits.
    ///
    /// Leading zeros are legal, so the code is drawn digit by digit rather
    /// than formatted from an integer.
    pub fn generate<R: Rng>(rng: &mut R, length: usize) -> Self {
        let digits: String = (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(digits)
    }

    /// The code as displayed to the voter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a passcode record.
///
/// `Live` records are candidates for verification; `Used` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    /// Issued and not yet consumed or superseded.
    Live,
    /// Consumed by a verification or invalidated by a newer issuance.
    Used,
}

impl OtpState {
    /// Database representation of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Used => "used",
        }
    }
}

impl std::str::FromStr for OtpState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "used" => Ok(Self::Used),
            other => Err(format!("unknown passcode state: {other}")),
        }
    }
}

/// A persisted passcode bound to an email address.
#[derive(Debug, Clone, PartialEq)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: EmailAddress,
    pub code: OtpCode,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: OtpState,
}

impl OtpRecord {
    /// Whether the stored deadline has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the record could still be consumed at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.state == OtpState::Live && !self.is_expired(now)
    }
}
