//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - Fetching forecasts from the Open-Meteo API
//! - Normalizing the loosely-typed response into a [`WeatherSnapshot`]
//! - Latest-request-wins loading through [`ForecastSession`]
//! - Configuration and the catalogue of Czech regional cities
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod cities;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod session;

pub use cities::{CITIES, City};
pub use config::{ApiConfig, Config};
pub use error::{CityError, FetchError};
pub use fetch::{Fetcher, OpenMeteoFetcher, RawPayload, fetch_snapshot};
pub use model::{
    Coordinate, CurrentConditions, DailySeries, HourlySeries, Metadata, WeatherCondition,
    WeatherSnapshot,
};
pub use normalize::normalize;
pub use session::{ForecastSession, LoadOutcome, SessionState};
