// Domain layer - Telemetry, alert, suppression and thermal models
pub mod connection;
pub mod scenario;
pub mod suppression;
pub mod telemetry;
pub mod thermal;
