//! Connector status endpoint

use axum::{Json, extract::State};
use tracing::instrument;

use crate::api::{error::ApiResult, state::ApiState};
use crate::report::StatusReport;

/// GET /api/v1/connectors/status
///
/// Runs one aggregation cycle. Connector failures show up as items; only a
/// registry failure turns into an error response.
#[instrument(skip_all)]
pub async fn connector_status(State(state): State<ApiState>) -> ApiResult<Json<StatusReport>> {
    let report = state
        .aggregator
        .run_configured(state.registry.as_ref())
        .await?;

    Ok(Json(report))
}
