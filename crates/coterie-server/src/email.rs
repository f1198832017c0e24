use async_trait::async_trait;
use coterie_core::config::SmtpConfig;
use coterie_core::{CoterieError, CoterieResult};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

/// Outbound notification seam. Dispatches are best-effort: callers log
/// failures and carry on, so implementations just report them.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Invitation/activation email carrying the account's single-use token.
    async fn send_activation_email(&self, to: &str, token: &str) -> CoterieResult<()>;

    /// Tell one moderator a new membership application is waiting.
    async fn send_application_notification(
        &self,
        to: &str,
        applicant_name: &str,
    ) -> CoterieResult<()>;
}

pub struct EmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    site_name: String,
    public_url: String,
}

impl EmailSender {
    pub fn new(config: &SmtpConfig, site_name: &str, public_url: &str) -> CoterieResult<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| CoterieError::InternalError(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();
        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            site_name: site_name.to_string(),
            public_url: public_url.to_string(),
        })
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> CoterieResult<()> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| CoterieError::InternalError(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| CoterieError::InternalError(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| CoterieError::InternalError(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| CoterieError::InternalError(format!("Failed to send email: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailSender {
    async fn send_activation_email(&self, to: &str, token: &str) -> CoterieResult<()> {
        let subject = format!("Activate your {} account", self.site_name);
        let body = format!(
            "You have been invited to join {}.\n\nActivate your account here: \
             {}/activate/{token}\n\nThis link can only be used once.",
            self.site_name, self.public_url
        );
        self.send_email(to, &subject, &body).await
    }

    async fn send_application_notification(
        &self,
        to: &str,
        applicant_name: &str,
    ) -> CoterieResult<()> {
        let subject = format!("New account request at {}", self.site_name);
        let body = format!(
            "{applicant_name} has applied to join {}.\n\nReview pending applications: \
             {}/moderation/review-applications",
            self.site_name, self.public_url
        );
        self.send_email(to, &subject, &body).await
    }
}
