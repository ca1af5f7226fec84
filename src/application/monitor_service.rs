// Monitor service - Applies stream events to the store and runs operator actions
use crate::application::control_api::{ControlApi, TriggerError};
use crate::application::event_router::EventHandler;
use crate::application::telemetry_store::{InsightOutcome, TelemetryStore};
use crate::domain::scenario::{ControlCommand, Scenario};
use crate::domain::suppression::SuppressionWindow;
use crate::domain::telemetry::{AlertInsight, TelemetryFrame};
use crate::domain::thermal::{Color, ColorScale};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Current-state view handed to the operator surface
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub telemetry: Option<TelemetryFrame>,
    pub insight: Option<AlertInsight>,
    pub headline: Option<String>,
    pub intervention_sent: bool,
    pub suppressing: bool,
    pub suppression: SuppressionWindow,
    pub active_mode: Scenario,
    pub temperature_c: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionOutcome {
    Sent,
    AlreadySent,
    NoActiveAlert,
    NotCritical,
    /// The alert changed while the request was in flight
    Superseded,
}

pub struct MonitorService {
    store: Mutex<TelemetryStore>,
    control: Arc<dyn ControlApi>,
    scale: ColorScale,
    idle_temperature_c: f64,
    active_mode: Mutex<Scenario>,
    intervention_in_flight: tokio::sync::Mutex<()>,
    revision: watch::Sender<u64>,
}

impl MonitorService {
    pub fn new(
        store: TelemetryStore,
        control: Arc<dyn ControlApi>,
        scale: ColorScale,
        idle_temperature_c: f64,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store: Mutex::new(store),
            control,
            scale,
            idle_temperature_c,
            active_mode: Mutex::new(Scenario::default()),
            intervention_in_flight: tokio::sync::Mutex::new(()),
            revision,
        }
    }

    // A panic elsewhere must not wedge the monitor; the store has no multi-step
    // invariants that a poisoned guard could expose.
    fn store(&self) -> MutexGuard<'_, TelemetryStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn mode(&self) -> MutexGuard<'_, Scenario> {
        self.active_mode
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Ticks once per visible state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Live temperature, or the idle temperature before the first frame
    pub fn current_temperature(&self) -> f64 {
        self.store()
            .telemetry()
            .map(|frame| frame.temperature_c)
            .unwrap_or(self.idle_temperature_c)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let store = self.store();
        let temperature_c = store
            .telemetry()
            .map(|frame| frame.temperature_c)
            .unwrap_or(self.idle_temperature_c);
        let insight = store.insight().cloned();
        let suppression = store.suppression_window();

        MonitorSnapshot {
            telemetry: store.telemetry().copied(),
            headline: insight.as_ref().map(|i| i.headline().to_string()),
            insight,
            intervention_sent: store.intervention().sent,
            suppressing: suppression.active,
            suppression,
            active_mode: *self.mode(),
            temperature_c,
            color: self.scale.color_for(temperature_c),
        }
    }

    pub async fn trigger_scenario(&self, scenario: Scenario) -> Result<(), TriggerError> {
        self.fire(ControlCommand::Simulate(scenario)).await?;
        self.set_mode(scenario);
        Ok(())
    }

    /// Clear the alert locally and open the suppression window, then ask the backend to
    /// reset. The local reset stands even if the backend call fails.
    pub async fn reset(&self) -> Result<(), TriggerError> {
        self.store().reset();
        tracing::info!("Alert cleared, ignoring insights for the suppression window");
        self.notify();

        self.fire(ControlCommand::Reset).await?;
        self.set_mode(Scenario::Normal);
        Ok(())
    }

    /// Send the backup-pump mitigation for the current critical alert, at most once per alert
    pub async fn intervene(&self) -> Result<InterventionOutcome, TriggerError> {
        let _in_flight = self.intervention_in_flight.lock().await;

        let generation = {
            let store = self.store();
            match store.insight() {
                None => return Ok(InterventionOutcome::NoActiveAlert),
                Some(insight) if !insight.requires_intervention() => {
                    return Ok(InterventionOutcome::NotCritical);
                }
                Some(_) if store.intervention().sent => {
                    return Ok(InterventionOutcome::AlreadySent);
                }
                Some(_) => store.insight_generation(),
            }
        };

        self.fire(ControlCommand::Intervene).await?;

        let mut store = self.store();
        if store.insight_generation() != generation {
            tracing::warn!("Alert changed while the intervention was in flight");
            return Ok(InterventionOutcome::Superseded);
        }
        store.mark_intervention_sent();
        drop(store);

        tracing::info!("Mitigation sent for current alert");
        self.notify();
        Ok(InterventionOutcome::Sent)
    }

    async fn fire(&self, command: ControlCommand) -> Result<(), TriggerError> {
        self.control.trigger(command).await.inspect_err(|e| {
            tracing::warn!("Control call failed: {}", e);
        })
    }

    fn set_mode(&self, scenario: Scenario) {
        *self.mode() = scenario;
        self.notify();
    }
}

impl EventHandler for MonitorService {
    fn on_telemetry(&self, frame: TelemetryFrame) {
        self.store().apply_telemetry(frame);
        tracing::debug!(
            "Telemetry: {:.1}°C {:.2} bar vacuum {:.2} bar",
            frame.temperature_c,
            frame.pressure_bar,
            frame.vacuum_bar
        );
        self.notify();
    }

    fn on_insight(&self, insight: Option<AlertInsight>) {
        let summary = insight
            .as_ref()
            .map(|i| format!("{:?}: {}", i.risk_level, i.headline()));

        match self.store().apply_insight(insight) {
            InsightOutcome::Accepted => {
                tracing::info!("Insight accepted ({})", summary.unwrap_or_default());
            }
            InsightOutcome::Cleared => tracing::info!("Insight cleared by backend"),
            InsightOutcome::Suppressed => {
                tracing::info!("Suppressed stale insight after reset");
                return;
            }
        }
        self.notify();
    }
}
