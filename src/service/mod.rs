use axum::http::StatusCode;

use std::{fmt, sync::Arc};

use crate::{
    dto::{InboundEnvelope, ResponseEnvelope},
    provider::{EmailProvider, OutboundEmail, ProviderError},
};

pub const SUCCESS_MESSAGE: &str = "Message is sent";

/// Envelope fields that must be non-empty before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Sender,
    Recipient,
    Subject,
    Text,
    Html,
}

impl Field {
    pub const fn missing_message(self) -> &'static str {
        match self {
            Self::Sender => "Missing sender",
            Self::Recipient => "Missing recipient",
            Self::Subject => "Missing subject",
            Self::Text => "Missing body text",
            Self::Html => "Missing body HTML",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.missing_message())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    MissingField(Field),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl RelayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) | Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Checked in this order; the first empty field is reported.
fn required_fields(envelope: &InboundEnvelope) -> [(Field, &str); 5] {
    [
        (Field::Sender, envelope.sender.as_str()),
        (Field::Recipient, envelope.recipient.as_str()),
        (Field::Subject, envelope.subject.as_str()),
        (Field::Text, envelope.text.as_str()),
        (Field::Html, envelope.html.as_str()),
    ]
}

pub fn validate(envelope: &InboundEnvelope) -> Result<(), RelayError> {
    match required_fields(envelope)
        .into_iter()
        .find(|(_, value)| value.is_empty())
    {
        Some((field, _)) => Err(RelayError::MissingField(field)),
        None => Ok(()),
    }
}

pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
}

impl EmailService {
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Decode, validate and forward a raw request body.
    pub async fn send(&self, body: &[u8]) -> Result<(), RelayError> {
        // A bare `null` body decodes to an empty envelope and fails validation
        let envelope =
            serde_json::from_slice::<Option<InboundEnvelope>>(body)?.unwrap_or_default();
        validate(&envelope)?;

        let email = OutboundEmail::from(envelope);

        tracing::info!(
            "Sending email to '{}' with subject '{}'",
            email.destination.join(", "),
            email.subject
        );

        self.provider.send(&email).await?;

        tracing::info!("Message to {} sent successfully", email.destination.join(", "));

        Ok(())
    }

    /// Like [`EmailService::send`], with the outcome mapped to a status and response envelope.
    pub async fn handle(&self, body: &[u8]) -> (StatusCode, ResponseEnvelope) {
        match self.send(body).await {
            Ok(()) => (StatusCode::OK, ResponseEnvelope::success(SUCCESS_MESSAGE)),
            Err(e) => {
                tracing::error!("{e}");
                (e.status(), ResponseEnvelope::error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    use async_trait::async_trait;

    use std::sync::Mutex;

    use crate::provider::{EmailProvider, OutboundEmail, ProviderError};

    /// Records every send and optionally fails with a fixed message.
    #[derive(Default)]
    pub struct FakeProvider {
        pub sent: Mutex<Vec<OutboundEmail>>,
        pub failure: Option<String>,
    }

    impl FakeProvider {
        pub fn failing(message: &str) -> Self {
            Self {
                sent: Mutex::default(),
                failure: Some(message.to_string()),
            }
        }

        pub fn sent(&self) -> Vec<OutboundEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailProvider for FakeProvider {
        async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError> {
            self.sent.lock().unwrap().push(email.clone());
            match &self.failure {
                Some(message) => Err(ProviderError(message.clone())),
                None => Ok(()),
            }
        }
    }
}
