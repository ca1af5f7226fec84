// Overlay service - Animated thermal colour for the render layer
use crate::application::monitor_service::MonitorService;
use crate::domain::thermal::{Color, ColorScale, ThermalSmoother};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub temperature_c: f64,
    pub color: Color,
}

pub struct OverlayService {
    monitor: Arc<MonitorService>,
    scale: ColorScale,
    smoother: Mutex<ThermalSmoother>,
    frames: watch::Sender<OverlayFrame>,
}

impl OverlayService {
    pub fn new(monitor: Arc<MonitorService>, scale: ColorScale, smoothing_factor: f64) -> Self {
        let start = monitor.current_temperature();
        let (frames, _) = watch::channel(OverlayFrame {
            temperature_c: start,
            color: scale.color_for(start),
        });

        Self {
            monitor,
            scale,
            smoother: Mutex::new(ThermalSmoother::new(start, smoothing_factor)),
            frames,
        }
    }

    pub fn latest(&self) -> OverlayFrame {
        *self.frames.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<OverlayFrame> {
        self.frames.subscribe()
    }

    /// Advance one animation frame toward the live temperature
    pub fn tick(&self) -> OverlayFrame {
        let target = self.monitor.current_temperature();
        let temperature_c = self
            .smoother
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .step(target);

        let frame = OverlayFrame {
            temperature_c,
            color: self.scale.color_for(temperature_c),
        };
        self.frames.send_if_modified(|current| {
            let changed = *current != frame;
            *current = frame;
            changed
        });
        frame
    }

    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}
