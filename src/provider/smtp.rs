use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailProvider, OutboundEmail, ProviderError};

#[derive(Debug, thiserror::Error)]
enum SmtpError {
    #[error("Invalid email address format: {0}")]
    AddressFormat(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<SmtpError> for ProviderError {
    fn from(e: SmtpError) -> Self {
        Self(e.to_string())
    }
}

/// SMTP relay provider. The transport keeps a connection pool and is
/// built once.
#[derive(Clone)]
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpProvider {
    pub fn new(
        relay: &str,
        port: Option<u16>,
        credentials: Option<(String, String)>,
    ) -> Result<Self, ProviderError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(relay).map_err(SmtpError::Transport)?;

        if let Some(port) = port {
            builder = builder.port(port);
        }

        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_message(email: &OutboundEmail) -> Result<Message, SmtpError> {
        let mut builder = Message::builder()
            .from(email.source.parse::<Mailbox>()?)
            .subject(email.subject.as_str());

        for recipient in &email.destination {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        let message = builder.multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))?;

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError> {
        let message = Self::build_message(email)?;
        self.transport.send(message).await.map_err(SmtpError::from)?;
        Ok(())
    }
}
