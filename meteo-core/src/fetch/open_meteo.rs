use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

use crate::{config::ApiConfig, error::FetchError, model::Coordinate};

use super::{Fetcher, RawPayload};

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

/// Variables requested for the `current` section.
///
/// These three lists are what the normalizer reads back; changing them
/// changes the shape of every snapshot.
pub const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "is_day",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

pub const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "snow_depth",
    "weather_code",
    "surface_pressure",
    "cloud_cover",
    "cloud_cover_low",
    "cloud_cover_mid",
    "cloud_cover_high",
    "visibility",
    "wind_speed_10m",
    "wind_speed_80m",
    "wind_speed_120m",
    "wind_speed_180m",
    "wind_direction_10m",
    "wind_direction_80m",
    "wind_direction_120m",
    "wind_direction_180m",
    "wind_gusts_10m",
    "temperature_80m",
    "temperature_120m",
    "temperature_180m",
];

pub const DAILY_VARIABLES: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "daylight_duration",
    "sunshine_duration",
    "uv_index_max",
    "uv_index_clear_sky_max",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_hours",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
];

#[derive(Debug, Clone)]
pub struct OpenMeteoFetcher {
    base_url: String,
    timezone: String,
    http: Client,
}

impl OpenMeteoFetcher {
    pub fn new(api: &ApiConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            base_url: api.base_url.clone(),
            timezone: api.timezone.clone(),
            http,
        })
    }

    fn query(&self, coordinate: Coordinate) -> [(&'static str, String); 6] {
        [
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("current", CURRENT_VARIABLES.join(",")),
            ("hourly", HOURLY_VARIABLES.join(",")),
            ("daily", DAILY_VARIABLES.join(",")),
            ("timezone", self.timezone.clone()),
        ]
    }
}

#[async_trait]
impl Fetcher for OpenMeteoFetcher {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, coordinate: Coordinate) -> Result<RawPayload, FetchError> {
        if !coordinate.is_finite() {
            return Err(FetchError::InvalidCoordinate(coordinate));
        }

        debug!(url = %self.base_url, timezone = %self.timezone, "requesting forecast");

        let res = self
            .http
            .get(&self.base_url)
            .query(&self.query(coordinate))
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        debug!(%status, "forecast response received");

        if !status.is_success() {
            // Only kept as a diagnostic; the body of a failed response is never parsed.
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "forecast request failed");
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let payload: RawPayload = res.json().await.map_err(FetchError::Decode)?;
        trace!(%payload, "raw forecast payload");

        Ok(payload)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
