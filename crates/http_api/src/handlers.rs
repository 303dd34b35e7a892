use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde::Serialize;
use tracker_app::AppServices;

use crate::{errors::HttpError, state::HttpState};

/// Runs a service call on the blocking pool; every service opens the store
/// and some reach the quota endpoint.
async fn blocking<T, F>(state: HttpState, call: F) -> Result<Json<T>, HttpError>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&AppServices) -> tracker_app::Result<T> + Send + 'static,
{
    let response = tokio::task::spawn_blocking(move || call(&state.app.services)).await??;
    Ok(Json(response))
}

pub async fn usage(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| services.usage.snapshot()).await
}

pub async fn history(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| services.history.history()).await
}

pub async fn forecast(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| services.forecast.report()).await
}

pub async fn calibration(
    State(state): State<HttpState>,
) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| services.calibration.calibration()).await
}

pub async fn refresh(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| {
        let result = services.ingest.refresh()?;
        tracing::info!(
            new_records = result.new_records,
            total_in_db = result.total_in_db,
            watcher_active = result.watcher_active,
            "manual refresh"
        );
        Ok(result)
    })
    .await
}

pub async fn status(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    blocking(state, |services| services.ingest.status()).await
}
