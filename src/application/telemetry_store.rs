// Telemetry store - Current telemetry, current alert and the per-alert intervention flag
use crate::domain::suppression::{SuppressionGate, SuppressionWindow};
use crate::domain::telemetry::{AlertInsight, InterventionState, TelemetryFrame};
use std::time::Duration;

pub const DEFAULT_SUPPRESSION: Duration = Duration::from_millis(4000);

/// What happened to an inbound insight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightOutcome {
    Accepted,
    Cleared,
    Suppressed,
}

pub struct TelemetryStore {
    telemetry: Option<TelemetryFrame>,
    insight: Option<AlertInsight>,
    intervention: InterventionState,
    gate: SuppressionGate,
    suppression: Duration,
    generation: u64,
}

impl TelemetryStore {
    pub fn new(gate: SuppressionGate, suppression: Duration) -> Self {
        Self {
            telemetry: None,
            insight: None,
            intervention: InterventionState::default(),
            gate,
            suppression,
            generation: 0,
        }
    }

    pub fn telemetry(&self) -> Option<&TelemetryFrame> {
        self.telemetry.as_ref()
    }

    pub fn insight(&self) -> Option<&AlertInsight> {
        self.insight.as_ref()
    }

    pub fn intervention(&self) -> InterventionState {
        self.intervention
    }

    /// Bumped whenever the alert slot is replaced or cleared
    pub fn insight_generation(&self) -> u64 {
        self.generation
    }

    pub fn suppression_window(&self) -> SuppressionWindow {
        self.gate.window()
    }

    pub fn is_suppressing(&self) -> bool {
        self.gate.is_suppressing()
    }

    pub fn apply_telemetry(&mut self, frame: TelemetryFrame) {
        self.telemetry = Some(frame);
    }

    pub fn apply_insight(&mut self, insight: Option<AlertInsight>) -> InsightOutcome {
        if self.gate.is_suppressing() {
            return InsightOutcome::Suppressed;
        }

        let outcome = if insight.is_some() {
            InsightOutcome::Accepted
        } else {
            InsightOutcome::Cleared
        };
        self.insight = insight;
        self.intervention = InterventionState::default();
        self.generation += 1;
        outcome
    }

    /// Clear the alert, then open the suppression window.
    pub fn reset(&mut self) {
        self.insight = None;
        self.intervention = InterventionState::default();
        self.generation += 1;
        self.gate.arm(self.suppression);
    }

    /// Returns whether the flag was set. Without a current insight this is a no-op.
    pub fn mark_intervention_sent(&mut self) -> bool {
        if self.insight.is_none() {
            return false;
        }
        self.intervention.sent = true;
        true
    }
}
