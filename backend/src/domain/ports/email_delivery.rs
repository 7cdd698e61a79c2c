//! Port for outbound email delivery.
//!
//! The transport offers no delivery guarantee; the contract is only "attempt
//! to hand this text to this address, succeed or fail". Timeout enforcement
//! is the caller's job ([`OtpService::deliver`]), not the adapter's.
//!
//! [`OtpService::deliver`]: crate::domain::OtpService

use async_trait::async_trait;

use crate::domain::EmailAddress;

/// Errors raised by email delivery adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailDeliveryError {
    /// The message could not be built or handed to the transport.
    #[error("email delivery failed: {message}")]
    Transport { message: String },
}

impl EmailDeliveryError {
    /// Transport-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Port for the email delivery capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailDelivery: Send + Sync {
    /// Attempt delivery of one message.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailDeliveryError>;
}

/// Fixture implementation that discards every message successfully.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailDelivery;

#[async_trait]
impl EmailDelivery for FixtureEmailDelivery {
    async fn send(&self, _message: &EmailMessage) -> Result<(), EmailDeliveryError> {
        Ok(())
    }
}
