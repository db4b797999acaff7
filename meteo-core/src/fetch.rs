use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::FetchError,
    model::{Coordinate, WeatherSnapshot},
    normalize::normalize,
};

pub mod open_meteo;

pub use open_meteo::OpenMeteoFetcher;

/// Untyped forecast response body, validated only by the normalizer.
pub type RawPayload = serde_json::Value;

/// One outbound forecast request per call. No retry, no caching.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    async fn fetch(&self, coordinate: Coordinate) -> Result<RawPayload, FetchError>;
}

/// Fetch the forecast for `coordinate` and normalize it.
pub async fn fetch_snapshot<F>(fetcher: &F, coordinate: Coordinate) -> Result<WeatherSnapshot, FetchError>
where
    F: Fetcher + ?Sized,
{
    let payload = fetcher.fetch(coordinate).await?;
    Ok(normalize(&payload))
}
