use crate::state::RosterState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jiff::Timestamp;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Ok,
    Error,
}

#[derive(Serialize, Debug)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub database: DatabaseStatus,
    pub timestamp: Timestamp,
}

impl HealthReport {
    pub fn new(database_reachable: bool) -> Self {
        let (status, database) = if database_reachable {
            (OverallStatus::Healthy, DatabaseStatus::Ok)
        } else {
            (OverallStatus::Unhealthy, DatabaseStatus::Error)
        };

        Self {
            status,
            database,
            timestamp: Timestamp::now(),
        }
    }
}

impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            OverallStatus::Healthy => StatusCode::OK,
            OverallStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status_code, Json(self)).into_response()
    }
}

pub async fn get_healthcheck(State(state): State<RosterState>) -> HealthReport {
    let database_reachable = match state.ping().await {
        Ok(()) => true,
        Err(e) => {
            error!(?e, "Healthcheck could not reach the database");
            false
        }
    };

    HealthReport::new(database_reachable)
}
