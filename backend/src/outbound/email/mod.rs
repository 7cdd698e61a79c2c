//! Email delivery adapters.

pub mod smtp;

pub use smtp::{SmtpConfig, SmtpMailer};
