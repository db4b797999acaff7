use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Location a forecast is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Snapshot of the `current` section. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: Option<NaiveDateTime>,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub is_day: Option<i64>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    pub weather_code: Option<i64>,
    pub cloud_cover: Option<f64>,
    /// Mean sea level pressure.
    pub pressure: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
}

/// Per-day forecast as parallel sequences; index `i` is the same day in every field.
///
/// A field absent from the response is an empty vector, otherwise it has
/// [`DailySeries::len`] entries. A `null` inside the source array stays `None`
/// at its index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub times: Vec<Option<NaiveDateTime>>,
    pub weather_codes: Vec<Option<i64>>,
    pub temperature_max: Vec<Option<f64>>,
    pub temperature_min: Vec<Option<f64>>,
    pub apparent_temperature_max: Vec<Option<f64>>,
    pub apparent_temperature_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<NaiveDateTime>>,
    pub sunset: Vec<Option<NaiveDateTime>>,
    pub daylight_duration: Vec<Option<f64>>,
    pub sunshine_duration: Vec<Option<f64>>,
    pub uv_index_max: Vec<Option<f64>>,
    pub uv_index_clear_sky_max: Vec<Option<f64>>,
    pub precipitation_sum: Vec<Option<f64>>,
    pub rain_sum: Vec<Option<f64>>,
    pub showers_sum: Vec<Option<f64>>,
    pub snowfall_sum: Vec<Option<f64>>,
    pub precipitation_hours: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub wind_speed_max: Vec<Option<f64>>,
    pub wind_gusts_max: Vec<Option<f64>>,
    pub wind_direction_dominant: Vec<Option<f64>>,
}

impl DailySeries {
    /// Number of forecast days, taken from the time axis.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Per-hour forecast as parallel sequences, same layout rules as [`DailySeries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub times: Vec<Option<NaiveDateTime>>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub apparent_temperature: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub rain: Vec<Option<f64>>,
    pub showers: Vec<Option<f64>>,
    pub snowfall: Vec<Option<f64>>,
    pub snow_depth: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i64>>,
    pub surface_pressure: Vec<Option<f64>>,
    pub cloud_cover: Vec<Option<f64>>,
    pub cloud_cover_low: Vec<Option<f64>>,
    pub cloud_cover_mid: Vec<Option<f64>>,
    pub cloud_cover_high: Vec<Option<f64>>,
    pub visibility: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<Option<f64>>,
    pub wind_speed_80m: Vec<Option<f64>>,
    pub wind_speed_120m: Vec<Option<f64>>,
    pub wind_speed_180m: Vec<Option<f64>>,
    pub wind_direction_10m: Vec<Option<f64>>,
    pub wind_direction_80m: Vec<Option<f64>>,
    pub wind_direction_120m: Vec<Option<f64>>,
    pub wind_direction_180m: Vec<Option<f64>>,
    pub wind_gusts_10m: Vec<Option<f64>>,
    pub temperature_80m: Vec<Option<f64>>,
    pub temperature_120m: Vec<Option<f64>>,
    pub temperature_180m: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Number of forecast hours, taken from the time axis.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Where the forecast was computed. The API snaps to its grid, so this can
/// differ slightly from the requested [`Coordinate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub timezone_abbreviation: Option<String>,
    pub utc_offset_seconds: Option<i64>,
    pub elevation: Option<f64>,
}

impl Metadata {
    /// UTC offset of the forecast timezone, if reported and in range.
    pub fn offset(&self) -> Option<FixedOffset> {
        let secs = i32::try_from(self.utc_offset_seconds?).ok()?;
        FixedOffset::east_opt(secs)
    }

    /// Attach the forecast timezone offset to a local timestamp.
    pub fn localize(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        local.and_local_timezone(self.offset()?).single()
    }
}

/// Normalized result of one forecast fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub daily: DailySeries,
    pub hourly: HourlySeries,
    pub metadata: Metadata,
}

/// Sky and precipitation categories of WMO weather interpretation codes.
/// See: https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherCondition {
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with hail",
            Self::Unknown => "Unknown",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "🌤️",
            Self::Fog => "🌫️",
            Self::Drizzle | Self::Rain | Self::RainShowers => "🌧️",
            Self::FreezingDrizzle | Self::FreezingRain => "🌧️❄️",
            Self::Snow | Self::SnowShowers => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::ThunderstormWithHail => "⛈️🌨️",
            Self::Unknown => "❓",
        }
    }
}
