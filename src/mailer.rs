use std::sync::Arc;

use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{error, info};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let (user, pass) = cfg.credentials().context("smtp credentials missing")?;
        let from = cfg
            .from
            .as_deref()
            .unwrap_or(user)
            .parse::<Mailbox>()
            .context("parse MAIL_FROM")?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .with_context(|| format!("smtp relay {}", cfg.smtp_host))?
            .port(cfg.smtp_port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Used when no SMTP credentials are configured: logs instead of sending.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), MailError> {
        info!(to, subject, "mail transport not configured; email not sent");
        Ok(())
    }
}

pub fn from_config(cfg: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if cfg.credentials().is_some() {
        info!(host = %cfg.smtp_host, port = cfg.smtp_port, "smtp mailer configured");
        Ok(Arc::new(SmtpMailer::new(cfg)?))
    } else {
        tracing::warn!("EMAIL_USER/EMAIL_PASS not set; welcome emails will only be logged");
        Ok(Arc::new(LogMailer))
    }
}

pub fn welcome_subject(brand: &str) -> String {
    format!("Registration Successful - Welcome to {}!", brand)
}

pub fn welcome_body(name: &str) -> String {
    format!(
        "<h1>Welcome, {}!</h1><p>Thank you for registering. We're excited to have you.</p>",
        escape_html(name)
    )
}

/// Sends the welcome email in the background. The outcome is only logged.
pub fn notify_welcome(mailer: Arc<dyn Mailer>, brand: &str, to: String, name: &str) {
    let subject = welcome_subject(brand);
    let body = welcome_body(name);
    tokio::spawn(async move {
        match mailer.send(&to, &subject, &body).await {
            Ok(()) => info!(to = %to, "welcome email sent"),
            Err(e) => error!(error = %e, to = %to, "welcome email failed"),
        }
    });
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
