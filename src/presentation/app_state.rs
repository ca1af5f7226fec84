// Application state for HTTP handlers
use crate::application::monitor_service::MonitorService;
use crate::application::overlay_service::OverlayService;
use crate::infrastructure::connection_manager::ConnectionManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<MonitorService>,
    pub overlay: Arc<OverlayService>,
    pub connection: Arc<ConnectionManager>,
    pub stream_url: String,
}
