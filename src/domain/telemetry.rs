// Telemetry and alert domain models
use serde::{Deserialize, Serialize};

/// Headline shown while the backend has raised an insight without a prediction yet
pub const PENDING_PREDICTION: &str = "ANALYZING...";

/// One snapshot of autoclave sensor readings, replaced wholesale on every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    #[serde(rename = "temp_c")]
    pub temperature_c: f64,
    pub pressure_bar: f64,
    pub vacuum_bar: f64,
}

impl TelemetryFrame {
    pub fn new(temperature_c: f64, pressure_bar: f64, vacuum_bar: f64) -> Self {
        Self {
            temperature_c,
            pressure_bar,
            vacuum_bar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    None,
    Warning,
    Critical,
}

/// Risk assessment pushed by the backend AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertInsight {
    // `null` and a missing key both mean no risk
    #[serde(default, deserialize_with = "nullable_risk")]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "nullable_string")]
    pub prediction: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub recommendation: String,
}

impl AlertInsight {
    pub fn new(
        risk_level: RiskLevel,
        prediction: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            risk_level,
            prediction: prediction.into(),
            recommendation: recommendation.into(),
        }
    }

    pub fn headline(&self) -> &str {
        if self.prediction.is_empty() {
            PENDING_PREDICTION
        } else {
            &self.prediction
        }
    }

    /// Only critical alerts offer the backup-pump mitigation
    pub fn requires_intervention(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }
}

fn nullable_risk<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<RiskLevel>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether the operator already sent a mitigation for the current insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InterventionState {
    pub sent: bool,
}
