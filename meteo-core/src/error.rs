use reqwest::StatusCode;
use thiserror::Error;

use crate::model::Coordinate;

/// Failure of a forecast fetch. Normalization itself never fails.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Coordinate {0:?} is not a pair of finite numbers")]
    InvalidCoordinate(Coordinate),

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach forecast API")]
    Transport(#[source] reqwest::Error),

    #[error("Forecast API responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Forecast API returned a body that is not JSON")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CityError {
    #[error("Unknown city '{0}'. Run `meteo cities` to list the supported cities.")]
    Unknown(String),
}
