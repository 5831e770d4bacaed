// src/notify/email.rs
//! SMTP delivery over STARTTLS. Configuration is environment-only; a missing
//! variable fails the run before any page is fetched.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::{MailTransport, Notification};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} missing"))
}

impl EmailSender {
    /// Reads SMTP_HOST, SMTP_USER, SMTP_PASS, NOTIFY_EMAIL_FROM and
    /// NOTIFY_EMAIL_TO. SMTP_PORT overrides the STARTTLS default when set.
    pub fn from_env() -> Result<Self> {
        let host = required_env("SMTP_HOST")?;
        let user = required_env("SMTP_USER")?;
        let pass = required_env("SMTP_PASS")?;
        let from_addr = required_env("NOTIFY_EMAIL_FROM")?;
        let to_addr = required_env("NOTIFY_EMAIL_TO")?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(Credentials::new(user, pass));
        if let Some(port) = std::env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()) {
            builder = builder.port(port);
        }

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Self { mailer: builder.build(), from, to })
    }
}

#[async_trait]
impl MailTransport for EmailSender {
    async fn deliver(&self, message: &Notification) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
