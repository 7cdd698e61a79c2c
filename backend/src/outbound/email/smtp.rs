//! SMTP email delivery adapter built on `lettre`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::ports::{EmailDelivery, EmailDeliveryError, EmailMessage};

/// SMTP relay configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender address placed in the `From` header.
    pub from_address: String,
}

/// Async SMTP mailer implementing the email delivery port.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Build a mailer for the configured relay.
    ///
    /// # Errors
    ///
    /// Fails when the relay host is not a valid SMTP endpoint.
    pub fn new(config: SmtpConfig) -> Result<Self, EmailDeliveryError> {
        let credentials = Credentials::new(config.username, config.password);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|err| EmailDeliveryError::transport(err.to_string()))?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address,
        })
    }
}

#[async_trait]
impl EmailDelivery for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailDeliveryError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|err| EmailDeliveryError::transport(format!("from address: {err}")))?,
            )
            .to(message
                .to
                .as_str()
                .parse()
                .map_err(|err| EmailDeliveryError::transport(format!("to address: {err}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| EmailDeliveryError::transport(err.to_string()))?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|err| EmailDeliveryError::transport(err.to_string()))
    }
}
