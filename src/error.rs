use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error rolling back SQL transaction"))]
    RollbackTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to parse maximum connection count {:?}", original))]
    ParseMaxConnections {
        source: ParseIntError,
        original: String,
    },
}

impl RosterError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found

        match self {
            Self::MakeQuery {
                source: sqlx::Error::RowNotFound,
            } => NF,
            Self::OpenDatabase { .. }
            | Self::GetDatabaseConnection { .. }
            | Self::MakeQuery { .. }
            | Self::CommitTransaction { .. }
            | Self::RollbackTransaction { .. }
            | Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } | Self::ParseMaxConnections { .. } => {
                ISE
            }
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Roster Error "}
                    span {(desc)}
                }
            }
        };

        let status_code = self.status_code();

        error!(?self, "Error!");
        (status_code, Html(basic_error(self.to_string()))).into_response()
    }
}
