use crate::config::{ConfigError, EmailConfig};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("SMTP error: {0}")]
    SmtpError(String),
    #[error("Message building error: {0}")]
    MessageError(String),
    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// A rendered mail with plain text and HTML alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl EmailMessage {
    /// Verification mail carrying a one-time code.
    pub fn otp(to: &str, code: &str, valid_minutes: u64) -> Self {
        let text_body = format!("Your OTP code is {code}. It expires in {valid_minutes} minutes.");
        let html_body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
    <h2>Verify your email</h2>
    <p>Use the code below to finish creating your account:</p>
    <p style="font-size: 28px; font-weight: bold; letter-spacing: 6px;">{code}</p>
    <p>It expires in {valid_minutes} minutes. If you did not sign up, ignore this email.</p>
</body>
</html>"#,
            code = html_escape::encode_text(code),
            valid_minutes = valid_minutes,
        );
        EmailMessage {
            to: to.to_string(),
            subject: "Verify Your Email".to_string(),
            text_body,
            html_body,
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

pub struct SmtpEmailService {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        config.validate()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        builder = if config.use_tls {
            let params = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;
            if config.use_starttls {
                builder.tls(Tls::Required(params))
            } else {
                builder.tls(Tls::Wrapper(params))
            }
        } else {
            builder.tls(Tls::None)
        };

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        info!("SMTP email service initialized");
        Ok(SmtpEmailService { from, transport: builder.build() })
    }

    fn build(&self, message: EmailMessage) -> Result<Message, EmailError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(message.text_body))
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(message.html_body)),
            )
            .map_err(|e| EmailError::MessageError(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let mail = self.build(message)?;
        self.transport.send(mail).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(e.to_string())
        })?;
        info!("Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_template_mentions_code_and_expiry() {
        let msg = EmailMessage::otp("a@b.com", "123456", 5);
        assert_eq!(msg.subject, "Verify Your Email");
        assert_eq!(msg.text_body, "Your OTP code is 123456. It expires in 5 minutes.");
        assert!(msg.html_body.contains("123456"));
    }
}
