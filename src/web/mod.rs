use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    error::SimulationError,
    scenario::{Scenario, ScenarioParams},
    simulation::{RunReport, Simulation},
};

/// Largest batch a single request may ask for.
pub const MAX_REQUEST_COUNT: usize = 1_000_000;

struct AppState {
    scenario: Scenario,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub host: String,
    pub port: u16,
}

pub fn router(scenario: Scenario) -> Router {
    let state = Arc::new(AppState { scenario });
    Router::new()
        .route("/api/defaults", get(defaults))
        .route("/api/profiles", get(profiles))
        .route("/api/run", post(run_batch))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        host,
        port,
    } = config;

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, scenario = %scenario.name, "serving simulation API");
    axum::serve(listener, router(scenario))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down simulation API");
}

async fn defaults(State(state): State<Arc<AppState>>) -> Json<ScenarioParams> {
    Json(state.scenario.params.clone())
}

#[derive(Debug, Serialize)]
struct ProfilesResponse {
    default: String,
    profiles: Vec<String>,
}

async fn profiles(State(state): State<Arc<AppState>>) -> Json<ProfilesResponse> {
    Json(ProfilesResponse {
        default: state.scenario.params.resource_profile.clone(),
        profiles: state.scenario.profile_names(),
    })
}

async fn run_batch(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ScenarioParams>,
) -> Result<Json<RunReport>, ApiError> {
    if params.count > MAX_REQUEST_COUNT {
        return Err(ApiError::TooLarge(params.count));
    }
    let table = state.scenario.resolve_profile(&params.resource_profile)?;
    let simulation = Simulation::new(state.scenario.name.clone(), params, table)?;
    let run = tokio::task::spawn_blocking(move || simulation.run())
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(run.report))
}

#[derive(Debug)]
enum ApiError {
    Invalid(SimulationError),
    TooLarge(usize),
    Internal(String),
}

impl From<SimulationError> for ApiError {
    fn from(value: SimulationError) -> Self {
        ApiError::Invalid(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::TooLarge(count) => (
                StatusCode::BAD_REQUEST,
                format!("count {count} exceeds the limit of {MAX_REQUEST_COUNT}"),
            ),
            ApiError::Internal(message) => {
                warn!(%message, "simulation task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HousingCategory;

    fn state() -> Arc<AppState> {
        let scenario: Scenario = serde_yaml::from_str("name: web_test\ncount: 50").unwrap();
        Arc::new(AppState { scenario })
    }

    #[tokio::test]
    async fn defaults_echo_scenario_params() {
        let Json(params) = defaults(State(state())).await;
        assert_eq!(params.count, 50);
    }

    #[tokio::test]
    async fn profiles_list_builtin_preset() {
        let Json(body) = profiles(State(state())).await;
        assert_eq!(body.default, "ostrava");
        assert_eq!(body.profiles, vec!["ostrava".to_string()]);
    }

    #[tokio::test]
    async fn run_returns_report() {
        let params = ScenarioParams {
            count: 40,
            seed: Some(8),
            ..ScenarioParams::default()
        };
        let Json(report) = run_batch(State(state()), Json(params)).await.unwrap();
        assert_eq!(report.count, 40);
        assert_eq!(report.scenario, "web_test");
        assert_eq!(report.housing.count(HousingCategory::StandardApartment), 40);
    }

    #[tokio::test]
    async fn invalid_request_maps_to_bad_request() {
        let params = ScenarioParams {
            count: 0,
            ..ScenarioParams::default()
        };
        let err = run_batch(State(state()), Json(params)).await.unwrap_err();
        assert!(matches!(err, ApiError::Invalid(SimulationError::InvalidCount(0))));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overflowing_weights_map_to_bad_request() {
        let mut params = ScenarioParams {
            count: 3,
            seed: Some(1),
            ..ScenarioParams::default()
        };
        params.weights.education = vec![1e308, 1e308, 1.0, 1.0];
        let err = run_batch(State(state()), Json(params)).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Invalid(SimulationError::InvalidWeights { .. })
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_request_is_refused() {
        let params = ScenarioParams {
            count: MAX_REQUEST_COUNT + 1,
            ..ScenarioParams::default()
        };
        let err = run_batch(State(state()), Json(params)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
