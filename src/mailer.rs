use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Outbound mail boundary. The webhook handler hands a fully rendered
/// document to this trait and performs no retries of its own.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), String>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &[String],
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), String> {
        let mut builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .subject(subject);

        for addr in to {
            builder = builder.to(addr
                .parse()
                .map_err(|e| format!("Invalid to address {addr}: {e}"))?);
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

/// Stand-in used when SMTP env vars are absent; every delivery fails with a
/// configuration message so the endpoint reports a server error.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _: &[String], _: &str, _: &str, _: &str) -> Result<(), String> {
        Err("SMTP transport not configured".to_string())
    }
}
