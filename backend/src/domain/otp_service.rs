//! Passcode issuance, delivery, and verification.
//!
//! Implements the [`PasscodeService`] driving port on top of the
//! [`OtpRepository`] and [`EmailDelivery`] driven ports. The service owns
//! code generation and the delivery timeout; the single-use and
//! single-live-code guarantees live in the repository's atomic operations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    DeliveryOutcome, EmailDelivery, EmailMessage, OtpConsumeOutcome, OtpRepository,
    OtpRepositoryError, PasscodeEmailContext, PasscodeService,
};
use crate::domain::{EmailAddress, Error, OtpCode, OtpRecord, OtpState, DEFAULT_CODE_LENGTH};

/// Generic invalid-code message.
///
/// Never-issued, already-used, and mistyped codes all surface this exact
/// text so a caller cannot probe which codes were ever live.
pub const INVALID_CODE_MESSAGE: &str = "Invalid OTP code. Please check and try again.";

/// Message for a matched but out-of-date code.
pub const EXPIRED_CODE_MESSAGE: &str = "OTP has expired. Please request a new one.";

/// Tunable passcode parameters.
#[derive(Debug, Clone, Copy)]
pub struct OtpConfig {
    /// Digits per generated code.
    pub code_length: usize,
    /// Validity window from issuance.
    pub ttl: TimeDelta,
    /// Upper bound on how long a delivery attempt may hold the request.
    pub delivery_timeout: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            ttl: TimeDelta::seconds(600),
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

/// Passcode service over a repository and a mail transport.
#[derive(Clone)]
pub struct OtpService<R, M> {
    repo: Arc<R>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
    config: OtpConfig,
}

impl<R, M> OtpService<R, M> {
    /// Create a new service.
    pub fn new(repo: Arc<R>, mailer: Arc<M>, clock: Arc<dyn Clock>, config: OtpConfig) -> Self {
        Self {
            repo,
            mailer,
            clock,
            config,
        }
    }
}

fn map_repo_error(error: OtpRepositoryError) -> Error {
    match error {
        OtpRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("passcode store unavailable: {message}"))
        }
        OtpRepositoryError::Query { message } => {
            Error::internal(format!("passcode store error: {message}"))
        }
    }
}

impl<R, M> OtpService<R, M>
where
    M: EmailDelivery + 'static,
{
    fn render_message(&self, record: &OtpRecord, context: &PasscodeEmailContext) -> EmailMessage {
        let minutes = self.config.ttl.num_minutes();
        let body = format!(
            "Hello,\n\n\
             Your One-Time Password (OTP) for voting is: {code}\n\n\
             IMPORTANT INFORMATION:\n\
             - This OTP can only be used once\n\
             - It will expire in {minutes} minutes\n\
             - Election: {election}\n\
             - Registration Number: {reg_no}\n\n\
             Please do not share this OTP with anyone.\n\n\
             Thank you for participating in the election!\n\
             KuraVote Team",
            code = record.code,
            election = context.election_title,
            reg_no = context.registration_number,
        );
        EmailMessage {
            to: record.email.clone(),
            subject: format!("Your Voting OTP - {}", context.election_title),
            body,
        }
    }
}

#[async_trait]
impl<R, M> PasscodeService for OtpService<R, M>
where
    R: OtpRepository,
    M: EmailDelivery + 'static,
{
    async fn generate(&self, email: &EmailAddress) -> Result<OtpRecord, Error> {
        let now = self.clock.utc();
        let mut rng = SmallRng::from_entropy();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: email.clone(),
            code: OtpCode::generate(&mut rng, self.config.code_length),
            created_at: now,
            expires_at: now + self.config.ttl,
            state: OtpState::Live,
        };

        // Supersession of prior live codes happens inside the repository
        // transaction; after this returns, `record` is the only live code
        // for the address.
        self.repo.issue(&record).await.map_err(map_repo_error)?;
        info!(email = %email.masked(), "issued passcode");
        Ok(record)
    }

    async fn deliver(
        &self,
        record: &OtpRecord,
        context: &PasscodeEmailContext,
    ) -> DeliveryOutcome {
        let message = self.render_message(record, context);
        let mailer = Arc::clone(&self.mailer);
        let email_hint = record.email.masked();

        // The transport runs on its own task: a timeout abandons the join,
        // not the attempt, so a slow relay may still deliver while the
        // request proceeds with the fallback path.
        let attempt = tokio::spawn(async move { mailer.send(&message).await });

        match tokio::time::timeout(self.config.delivery_timeout, attempt).await {
            Ok(Ok(Ok(()))) => {
                info!(email = %email_hint, "passcode email sent");
                DeliveryOutcome::Sent
            }
            Ok(Ok(Err(send_error))) => {
                warn!(email = %email_hint, error = %send_error, "passcode email failed");
                DeliveryOutcome::Failed {
                    reason: send_error.to_string(),
                }
            }
            Ok(Err(join_error)) => {
                warn!(email = %email_hint, error = %join_error, "delivery task aborted");
                DeliveryOutcome::Failed {
                    reason: format!("delivery task aborted: {join_error}"),
                }
            }
            Err(_elapsed) => {
                warn!(email = %email_hint, "passcode email timed out");
                DeliveryOutcome::Failed {
                    reason: "Email service timeout".to_owned(),
                }
            }
        }
    }

    async fn verify(&self, email: &EmailAddress, code: &str) -> Result<(), Error> {
        // A non-numeric submission can never match a stored code; reject it
        // with the same generic message so the fast path is not an oracle.
        let Ok(code) = OtpCode::new(code) else {
            return Err(Error::invalid_request(INVALID_CODE_MESSAGE));
        };

        let outcome = self
            .repo
            .consume_live(email, &code, self.clock.utc())
            .await
            .map_err(map_repo_error)?;

        match outcome {
            OtpConsumeOutcome::Consumed => {
                info!(email = %email.masked(), "passcode verified");
                Ok(())
            }
            OtpConsumeOutcome::Expired => {
                warn!(email = %email.masked(), "expired passcode attempted");
                Err(Error::invalid_request(EXPIRED_CODE_MESSAGE))
            }
            OtpConsumeOutcome::NotFound => {
                warn!(email = %email.masked(), "invalid passcode attempted");
                Err(Error::invalid_request(INVALID_CODE_MESSAGE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockOtpRepository, OtpConsumeOutcome};
    use chrono::{DateTime, Local, Utc};
    use std::sync::Mutex;

    struct FixtureClock(DateTime<Utc>);

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-20T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn voter_email() -> EmailAddress {
        EmailAddress::new("voter@example.com").expect("valid address")
    }

    fn context() -> PasscodeEmailContext {
        PasscodeEmailContext {
            election_title: "Student Council 2026".to_owned(),
            registration_number: "REG-001".to_owned(),
        }
    }

    fn service<M: EmailDelivery + 'static>(
        repo: MockOtpRepository,
        mailer: M,
        config: OtpConfig,
    ) -> OtpService<MockOtpRepository, M> {
        OtpService::new(
            Arc::new(repo),
            Arc::new(mailer),
            Arc::new(FixtureClock(fixed_now())),
            config,
        )
    }

    /// Recording transport double capturing every message.
    #[derive(Default)]
    struct RecordingMailer(Mutex<Vec<EmailMessage>>);

    #[async_trait]
    impl EmailDelivery for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), super::super::ports::EmailDeliveryError> {
            self.0
                .lock()
                .expect("mailer mutex")
                .push(message.clone());
            Ok(())
        }
    }

    /// Transport double that never completes within any sane timeout.
    struct StalledMailer;

    #[async_trait]
    impl EmailDelivery for StalledMailer {
        async fn send(
            &self,
            _message: &EmailMessage,
        ) -> Result<(), super::super::ports::EmailDeliveryError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Transport double failing every attempt.
    struct BrokenMailer;

    #[async_trait]
    impl EmailDelivery for BrokenMailer {
        async fn send(
            &self,
            _message: &EmailMessage,
        ) -> Result<(), super::super::ports::EmailDeliveryError> {
            Err(super::super::ports::EmailDeliveryError::transport(
                "relay refused connection",
            ))
        }
    }

    #[tokio::test]
    async fn generate_issues_a_live_code_with_configured_expiry() {
        let email = voter_email();
        let expected_email = email.clone();
        let mut repo = MockOtpRepository::new();
        repo.expect_issue()
            .withf(move |record| {
                record.email == expected_email
                    && record.state == OtpState::Live
                    && record.code.as_str().len() == DEFAULT_CODE_LENGTH
                    && record.created_at == fixed_now()
                    && record.expires_at == fixed_now() + TimeDelta::seconds(600)
            })
            .times(1)
            .return_once(|_| Ok(()));

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        let record = svc.generate(&email).await.expect("issue succeeds");
        assert!(record.is_usable(fixed_now()));
    }

    #[tokio::test]
    async fn generate_maps_store_outage_to_service_unavailable() {
        let mut repo = MockOtpRepository::new();
        repo.expect_issue()
            .return_once(|_| Err(OtpRepositoryError::connection("pool exhausted")));

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        let err = svc.generate(&voter_email()).await.expect_err("fails");
        assert_eq!(err.code(), crate::domain::ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn deliver_renders_code_election_and_registration_into_the_body() {
        let repo = MockOtpRepository::new();
        let mailer = Arc::new(RecordingMailer::default());
        let svc = OtpService::new(
            Arc::new(repo),
            Arc::clone(&mailer),
            Arc::new(FixtureClock(fixed_now())),
            OtpConfig::default(),
        );
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: voter_email(),
            code: OtpCode::new("440061").expect("numeric"),
            created_at: fixed_now(),
            expires_at: fixed_now() + TimeDelta::seconds(600),
            state: OtpState::Live,
        };

        let outcome = svc.deliver(&record, &context()).await;
        assert_eq!(outcome, DeliveryOutcome::Sent);

        let sent = mailer.0.lock().expect("mailer mutex");
        let message = sent.first().expect("one message sent");
        assert_eq!(message.to, voter_email());
        assert!(message.subject.contains("Student Council 2026"));
        assert!(message.body.contains("440061"));
        assert!(message.body.contains("REG-001"));
        assert!(message.body.contains("expire in 10 minutes"));
    }

    #[tokio::test(start_paused = true)]
    async fn deliver_times_out_instead_of_blocking_on_a_stalled_transport() {
        let svc = service(MockOtpRepository::new(), StalledMailer, OtpConfig::default());
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: voter_email(),
            code: OtpCode::new("123456").expect("numeric"),
            created_at: fixed_now(),
            expires_at: fixed_now() + TimeDelta::seconds(600),
            state: OtpState::Live,
        };

        let outcome = svc.deliver(&record, &context()).await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Failed {
                reason: "Email service timeout".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn deliver_reports_transport_failure_with_reason() {
        let svc = service(MockOtpRepository::new(), BrokenMailer, OtpConfig::default());
        let record = OtpRecord {
            id: Uuid::new_v4(),
            email: voter_email(),
            code: OtpCode::new("123456").expect("numeric"),
            created_at: fixed_now(),
            expires_at: fixed_now() + TimeDelta::seconds(600),
            state: OtpState::Live,
        };

        match svc.deliver(&record, &context()).await {
            DeliveryOutcome::Failed { reason } => {
                assert!(reason.contains("relay refused connection"));
            }
            DeliveryOutcome::Sent => panic!("delivery should fail"),
        }
    }

    #[tokio::test]
    async fn verify_consumes_a_live_matching_code() {
        let mut repo = MockOtpRepository::new();
        repo.expect_consume_live()
            .withf(|email, code, now| {
                email.as_str() == "voter@example.com"
                    && code.as_str() == "123456"
                    && *now == fixed_now()
            })
            .times(1)
            .return_once(|_, _, _| Ok(OtpConsumeOutcome::Consumed));

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        svc.verify(&voter_email(), "123456")
            .await
            .expect("verification succeeds");
    }

    #[tokio::test]
    async fn verify_reports_unknown_and_used_codes_identically() {
        let mut repo = MockOtpRepository::new();
        repo.expect_consume_live()
            .return_once(|_, _, _| Ok(OtpConsumeOutcome::NotFound));

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        let err = svc
            .verify(&voter_email(), "999999")
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), INVALID_CODE_MESSAGE);
    }

    #[tokio::test]
    async fn verify_reports_expired_codes_distinctly() {
        let mut repo = MockOtpRepository::new();
        repo.expect_consume_live()
            .return_once(|_, _, _| Ok(OtpConsumeOutcome::Expired));

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        let err = svc
            .verify(&voter_email(), "123456")
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), EXPIRED_CODE_MESSAGE);
    }

    #[tokio::test]
    async fn verify_rejects_non_numeric_input_without_touching_the_store() {
        let mut repo = MockOtpRepository::new();
        repo.expect_consume_live().times(0);

        let svc = service(repo, RecordingMailer::default(), OtpConfig::default());
        let err = svc
            .verify(&voter_email(), "12a456")
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), INVALID_CODE_MESSAGE);
    }
}
