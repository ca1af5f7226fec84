// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod connection_manager;
pub mod http_control_api;
