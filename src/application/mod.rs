// Application layer - Routing, state and operator use cases
pub mod control_api;
pub mod event_router;
pub mod monitor_service;
pub mod overlay_service;
pub mod telemetry_store;
