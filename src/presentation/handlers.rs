// HTTP request handlers for the operator surface
use crate::application::control_api::TriggerError;
use crate::application::monitor_service::{InterventionOutcome, MonitorSnapshot};
use crate::domain::connection::ConnectionState;
use crate::domain::scenario::Scenario;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub status: ConnectionState,
    pub status_label: &'static str,
    #[serde(flatten)]
    pub snapshot: MonitorSnapshot,
}

#[derive(Debug, Serialize)]
struct ActionResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct InterventionResponse {
    outcome: InterventionOutcome,
}

#[derive(Debug, Serialize)]
struct ConnectResponse {
    connected: bool,
    status: ConnectionState,
}

fn current_state(state: &AppState) -> StateResponse {
    let status = state.connection.state();
    StateResponse {
        status,
        status_label: status.label(),
        snapshot: state.monitor.snapshot(),
    }
}

fn trigger_response(result: Result<(), TriggerError>) -> Response {
    match result {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(ActionResponse {
                accepted: true,
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ActionResponse {
                accepted: false,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current telemetry, alert and connection status
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(current_state(&state))
}

/// Latest animated overlay frame
pub async fn get_overlay(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.overlay.latest())
}

/// Server-sent events, one state document per change
pub async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut changes = Box::pin(
        WatchStream::new(state.monitor.subscribe())
            .map(|_| ())
            .merge(WatchStream::new(state.connection.subscribe()).map(|_| ())),
    );

    let stream = async_stream::stream! {
        while changes.next().await.is_some() {
            match Event::default().event("state").json_data(current_state(&state)) {
                Ok(event) => {
                    yield Ok::<Event, Infallible>(event);
                }
                Err(e) => {
                    tracing::warn!("Failed to encode state event: {}", e);
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Start a backend simulation scenario
pub async fn trigger_scenario(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let scenario: Scenario = match name.parse() {
        Ok(scenario) => scenario,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ActionResponse {
                    accepted: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response();
        }
    };

    trigger_response(state.monitor.trigger_scenario(scenario).await)
}

/// Operator reset: clears the alert locally, then resets the backend
pub async fn reset(State(state): State<Arc<AppState>>) -> Response {
    trigger_response(state.monitor.reset().await)
}

/// Engage the backup pump for the current critical alert
pub async fn intervene(State(state): State<Arc<AppState>>) -> Response {
    match state.monitor.intervene().await {
        Ok(outcome) => Json(InterventionResponse { outcome }).into_response(),
        Err(e) => trigger_response(Err(e)),
    }
}

/// Explicit reconnect to the telemetry stream
pub async fn connect(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let connected = state.connection.connect(&state.stream_url).await;
    Json(ConnectResponse {
        connected,
        status: state.connection.state(),
    })
}
