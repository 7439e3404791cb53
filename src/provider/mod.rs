mod ses;
mod smtp;

pub use ses::SesProvider;
pub use smtp::SmtpProvider;

use async_trait::async_trait;

use std::sync::Arc;

use crate::{config::ProviderConfig, dto::InboundEnvelope};

/// Send request handed to a delivery provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub source: String,
    pub destination: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl From<InboundEnvelope> for OutboundEmail {
    fn from(envelope: InboundEnvelope) -> Self {
        Self {
            source: envelope.sender,
            destination: vec![envelope.recipient],
            subject: envelope.subject,
            text: envelope.text,
            html: envelope.html,
        }
    }
}

/// Failure reported by a provider. The text is passed back to the caller as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// Email delivery backend.
///
/// Implementations are constructed once at startup and shared between
/// requests, so `send` must be safe to call concurrently.
#[async_trait]
pub trait EmailProvider: Send + Sync + 'static {
    /// Make a single delivery attempt.
    async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError>;
}

pub async fn from_config(config: &ProviderConfig) -> Result<Arc<dyn EmailProvider>, ProviderError> {
    match config {
        ProviderConfig::Ses { region } => {
            tracing::info!("Using SES provider in region {}", region);
            Ok(Arc::new(SesProvider::new(region.clone()).await))
        }
        ProviderConfig::Smtp {
            relay,
            port,
            username,
            password,
        } => {
            tracing::info!("Using SMTP provider with relay {}", relay);
            let credentials = username.clone().zip(password.clone());
            Ok(Arc::new(SmtpProvider::new(relay, *port, credentials)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_email_maps_envelope_fields() {
        let envelope = InboundEnvelope {
            sender: "a@x.com".to_string(),
            recipient: "b@y.com".to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "<p>h</p>".to_string(),
        };

        let email = OutboundEmail::from(envelope);

        assert_eq!(email.source, "a@x.com");
        assert_eq!(email.destination, vec!["b@y.com".to_string()]);
        assert_eq!(email.subject, "s");
        assert_eq!(email.text, "t");
        assert_eq!(email.html, "<p>h</p>");
    }

    #[tokio::test]
    async fn smtp_provider_is_built_from_config() {
        let config = ProviderConfig::Smtp {
            relay: "smtp.example.com".to_string(),
            port: Some(2525),
            username: Some("user".to_string()),
            password: Some("secret".to_string()),
        };

        assert!(from_config(&config).await.is_ok());
    }
}
