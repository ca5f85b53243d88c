use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use log::{debug, info, warn};

use crate::domain::models::suggestion::Suggestion;

/// SMTP settings for the notification sink. Unset configuration simply
/// disables delivery; the rest of the system never depends on it.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub to_emails: Vec<String>,
}

impl EmailConfig {
    /// Read the SMTP configuration from the environment. Returns `None`
    /// when no host is configured.
    pub fn from_env() -> Option<Self> {
        let smtp_server = std::env::var("FAMILY_TREE_SMTP_HOST").ok()?;
        let smtp_port = std::env::var("FAMILY_TREE_SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);
        let username = std::env::var("FAMILY_TREE_SMTP_USER").unwrap_or_default();
        let password = std::env::var("FAMILY_TREE_SMTP_PASS").unwrap_or_default();
        let from_email = std::env::var("FAMILY_TREE_MAIL_FROM").unwrap_or_else(|_| username.clone());
        let to_emails = std::env::var("FAMILY_TREE_MAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Some(Self {
            smtp_server,
            smtp_port,
            username,
            password,
            from_email,
            to_emails,
        })
    }
}

/// Fire-and-forget email notifications.
///
/// Delivery is strictly best-effort: failures are logged and never surface
/// to the operation that triggered them.
#[derive(Clone)]
pub struct EmailService {
    config: Option<EmailConfig>,
    transport: Option<SmtpTransport>,
}

impl EmailService {
    pub fn new(config: Option<EmailConfig>) -> Self {
        let transport = config.as_ref().and_then(|cfg| match build_transport(cfg) {
            Ok(transport) => {
                info!(
                    "Email notifications enabled via {}:{}",
                    cfg.smtp_server, cfg.smtp_port
                );
                Some(transport)
            }
            Err(e) => {
                warn!("Failed to initialize email transport, notifications disabled: {}", e);
                None
            }
        });

        Self { config, transport }
    }

    /// A service that never sends anything.
    pub fn disabled() -> Self {
        Self {
            config: None,
            transport: None,
        }
    }

    /// Tell the tree owner a new suggestion arrived. Best-effort.
    pub fn notify_suggestion_received(&self, suggestion: &Suggestion) {
        let kind = kind_label(suggestion.kind);
        let subject = format!("New {} suggestion for your family tree", kind);
        let body = format!(
            "A visitor submitted a suggestion for tree {}.\n\nType: {}\nSubmitted by: {}\nStatus: {}\n",
            suggestion.view_code, kind, suggestion.submitter.name, suggestion.status,
        );

        if let Err(e) = self.send(&subject, body) {
            warn!("Failed to send suggestion notification: {}", e);
        }
    }

    fn send(&self, subject: &str, body: String) -> Result<()> {
        let (config, transport) = match (&self.config, &self.transport) {
            (Some(config), Some(transport)) => (config, transport),
            _ => {
                debug!("Email notifications disabled, dropping message '{}'", subject);
                return Ok(());
            }
        };

        let from: Mailbox = config
            .from_email
            .parse()
            .context("Invalid sender address in email configuration")?;

        for recipient in &config.to_emails {
            let to: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", recipient))?;

            let message = Message::builder()
                .from(from.clone())
                .to(to)
                .subject(subject)
                .body(body.clone())
                .context("Failed to build notification email")?;

            transport
                .send(&message)
                .with_context(|| format!("Failed to send notification to {}", recipient))?;
        }

        Ok(())
    }
}

fn kind_label(kind: shared::SuggestionKind) -> &'static str {
    match kind {
        shared::SuggestionKind::Add => "add",
        shared::SuggestionKind::Edit => "edit",
        shared::SuggestionKind::Report => "report",
    }
}

fn build_transport(config: &EmailConfig) -> Result<SmtpTransport> {
    let tls_params =
        TlsParameters::new(config.smtp_server.clone()).context("Failed to create TLS parameters")?;

    Ok(SmtpTransport::relay(&config.smtp_server)
        .context("Failed to create SMTP relay")?
        .port(config.smtp_port)
        .tls(Tls::Required(tls_params))
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{Submitter, SuggestionKind, SuggestionStatus};

    #[test]
    fn test_disabled_service_swallows_notifications() {
        let service = EmailService::disabled();
        let now = Utc::now();
        let suggestion = Suggestion {
            id: "suggestion::1".to_string(),
            kind: SuggestionKind::Report,
            status: SuggestionStatus::Pending,
            view_code: "AB12CD34".to_string(),
            tree_owner: "user-1".to_string(),
            new_member: None,
            edit_member: None,
            report: None,
            submitter: Submitter {
                name: "Visitor".to_string(),
                ..Submitter::default()
            },
            created_at: now,
            updated_at: now,
        };

        // Must not panic or error out.
        service.notify_suggestion_received(&suggestion);
    }
}
