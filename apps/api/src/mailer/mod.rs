//! Outgoing application email over SMTP.
//!
//! Each send authenticates as the user's own account (address + app
//! password), so the transport is built per message.

use async_trait::async_trait;
use bytes::Bytes;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::template::to_html_body;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from_address: String,
    pub app_password: String,
    pub to_address: String,
    pub subject: String,
    /// Plain text; sent as HTML with newlines turned into `<br>`.
    pub body_text: String,
    pub attachment: Option<MailAttachment>,
}

impl OutgoingEmail {
    pub fn validate(&self) -> Result<(), MailError> {
        let required = [
            ("from_address", &self.from_address),
            ("app_password", &self.app_password),
            ("to_address", &self.to_address),
            ("body", &self.body_text),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(MailError::MissingField(*name)),
            None => Ok(()),
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

/// Builds the MIME message: an HTML part, plus the resume when present.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, MailError> {
    email.validate()?;

    let builder = Message::builder()
        .from(mailbox(&email.from_address)?)
        .to(mailbox(&email.to_address)?)
        .subject(email.subject.as_str());

    let html = SinglePart::html(to_html_body(&email.body_text));

    let message = match &email.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.mime_type)
                .map_err(|e| MailError::Build(format!("bad attachment type: {e}")))?;
            let part = Attachment::new(attachment.file_name.clone())
                .body(attachment.bytes.to_vec(), content_type);
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(part))
        }
        None => builder.singlepart(html),
    };

    message.map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    host: String,
}

impl SmtpMailer {
    pub fn new(host: String) -> Self {
        Self { host }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .credentials(Credentials::new(
                email.from_address.trim().to_string(),
                email.app_password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        info!("Email sent to {} via {}", email.to_address, self.host);
        Ok(())
    }
}
