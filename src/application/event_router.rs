// Event router - Classifies raw stream messages and hands them to typed handlers
use crate::domain::telemetry::{AlertInsight, TelemetryFrame};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("message is not a JSON object: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A message after classification by its `type` discriminator
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Telemetry(TelemetryFrame),
    /// `None` means the backend reports no active alert
    Insight(Option<AlertInsight>),
    /// Unknown, missing or non-string discriminator
    Ignored(Option<String>),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    // Any JSON value; only the two known strings are routed
    #[serde(rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    payload: Value,
}

/// Receives classified messages. Each call is applied as one indivisible update.
pub trait EventHandler: Send + Sync {
    fn on_telemetry(&self, frame: TelemetryFrame);
    fn on_insight(&self, insight: Option<AlertInsight>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EventRouter;

impl EventRouter {
    pub const TELEMETRY: &'static str = "TELEMETRY";
    pub const AI_INSIGHT: &'static str = "AI_INSIGHT";

    pub fn new() -> Self {
        Self
    }

    pub fn route(&self, raw: &str) -> Result<Classified, ParseError> {
        let Envelope { kind, payload } =
            serde_json::from_str(raw).map_err(ParseError::Envelope)?;

        match kind.as_ref().and_then(Value::as_str) {
            Some(Self::TELEMETRY) => serde_json::from_value(payload)
                .map(Classified::Telemetry)
                .map_err(|source| ParseError::Payload {
                    kind: Self::TELEMETRY,
                    source,
                }),
            Some(Self::AI_INSIGHT) => serde_json::from_value(payload)
                .map(Classified::Insight)
                .map_err(|source| ParseError::Payload {
                    kind: Self::AI_INSIGHT,
                    source,
                }),
            _ => Ok(Classified::Ignored(kind.map(|kind| match kind {
                Value::String(kind) => kind,
                other => other.to_string(),
            }))),
        }
    }

    /// Route a raw message and deliver it. Parse failures are logged and dropped
    /// so the caller can keep reading the stream.
    pub fn dispatch(&self, raw: &str, handler: &dyn EventHandler) -> Option<Classified> {
        let classified = match self.route(raw) {
            Ok(classified) => classified,
            Err(e) => {
                tracing::warn!("Dropping stream message: {}", e);
                return None;
            }
        };

        match &classified {
            Classified::Telemetry(frame) => handler.on_telemetry(*frame),
            Classified::Insight(insight) => handler.on_insight(insight.clone()),
            Classified::Ignored(kind) => {
                tracing::debug!("Ignoring stream message of type {:?}", kind);
            }
        }

        Some(classified)
    }
}
