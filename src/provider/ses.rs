use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    config::Region,
    error::DisplayErrorContext,
    types::{Body, Content, Destination, EmailContent, Message},
};

use super::{EmailProvider, OutboundEmail, ProviderError};

const CHARSET: &str = "UTF-8";

/// Amazon SES (v2 API) provider.
#[derive(Clone)]
pub struct SesProvider {
    client: Client,
}

impl SesProvider {
    /// Credentials come from the default AWS provider chain.
    pub async fn new(region: String) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: Client::new(&config),
        }
    }
}

fn content(data: &str) -> Result<Content, ProviderError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| ProviderError(e.to_string()))
}

#[async_trait]
impl EmailProvider for SesProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ProviderError> {
        let body = Body::builder()
            .text(content(&email.text)?)
            .html(content(&email.html)?)
            .build();

        let message = Message::builder()
            .subject(content(&email.subject)?)
            .body(body)
            .build();

        let destination = Destination::builder()
            .set_to_addresses(Some(email.destination.clone()))
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(email.source.as_str())
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| ProviderError(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("SES accepted message with id {:?}", output.message_id());

        Ok(())
    }
}
