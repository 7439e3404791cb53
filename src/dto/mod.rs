use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};
use utoipa::ToSchema;

use std::fmt;

/// Decoded leniently: keys match case-insensitively, the last duplicate
/// wins, `null` leaves a field as it was and unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct InboundEnvelope {
    /// Sender address, used as the message source
    pub sender: String,
    /// Single recipient address
    pub recipient: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text: String,
    /// HTML body
    pub html: String,
}

impl<'de> Deserialize<'de> for InboundEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = InboundEnvelope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an email envelope object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut envelope = InboundEnvelope::default();

        while let Some(key) = map.next_key::<String>()? {
            let slot = match key.to_lowercase().as_str() {
                "sender" => &mut envelope.sender,
                "recipient" => &mut envelope.recipient,
                "subject" => &mut envelope.subject,
                "text" => &mut envelope.text,
                "html" => &mut envelope.html,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };

            if let Some(value) = map.next_value::<Option<String>>()? {
                *slot = value;
            }
        }

        Ok(envelope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub message: String,
}

impl ResponseEnvelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Error,
            message: message.into(),
        }
    }
}
