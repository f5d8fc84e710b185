use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{ReminderError, ReminderResult};
use crate::notify::{ReminderEmail, ReminderSender};

/// Sends over SMTP with STARTTLS and login credentials. One attempt, no retry.
pub struct SmtpSender {
    server: String,
    port: u16,
    username: String,
    password: String,
    recipient: String,
}

impl SmtpSender {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            server: cfg.smtp_server.clone(),
            port: cfg.smtp_port,
            username: cfg.email_username.clone(),
            password: cfg.email_password.clone(),
            recipient: cfg.recipient_email.clone(),
        }
    }

    fn message(&self, email: &ReminderEmail) -> Result<Message> {
        let from: Mailbox = self
            .username
            .parse()
            .with_context(|| format!("sender address {:?}", self.username))?;
        let to: Mailbox = self
            .recipient
            .parse()
            .with_context(|| format!("recipient address {:?}", self.recipient))?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .context("building message")
    }

    fn deliver(&self, email: &ReminderEmail) -> Result<()> {
        let message = self.message(email)?;
        let mailer = SmtpTransport::starttls_relay(&self.server)
            .with_context(|| format!("configuring STARTTLS relay {}", self.server))?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();
        mailer
            .send(&message)
            .with_context(|| format!("SMTP session with {}:{}", self.server, self.port))?;
        Ok(())
    }
}

impl ReminderSender for SmtpSender {
    #[instrument(level = "info", skip_all, fields(server = %self.server, port = self.port))]
    fn send(&self, email: &ReminderEmail) -> ReminderResult<()> {
        self.deliver(email)
            .map_err(|e| ReminderError::Delivery(format!("{:#}", e)))?;
        info!(recipient = %self.recipient, "reminder email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(username: &str) -> SmtpSender {
        SmtpSender {
            server: "smtp.invalid".into(),
            port: 587,
            username: username.into(),
            password: "secret".into(),
            recipient: "ops@example.com".into(),
        }
    }

    fn email() -> ReminderEmail {
        ReminderEmail {
            subject: "Cheque Transfer Reminder - 1 payment(s) due in 3 days".into(),
            html: "<html></html>".into(),
        }
    }

    #[test]
    fn builds_html_message() {
        let msg = sender("bot@example.com").message(&email()).unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("Subject: Cheque Transfer Reminder - 1 payment(s) due in 3 days"));
        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("To: ops@example.com"));
    }

    #[test]
    fn bad_sender_address_is_a_delivery_error() {
        let err = sender("not an address").send(&email()).unwrap_err();
        assert!(matches!(err, ReminderError::Delivery(_)));
    }
}
