//! Turns a raw Open-Meteo response into a [`WeatherSnapshot`].
//!
//! Every read goes through [`Section`], which yields `None` (scalars) or an
//! empty vector (series) for anything absent or `null`. Values are copied
//! through unchanged; no units are converted and nothing defaults to zero.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::{
    fetch::RawPayload,
    model::{CurrentConditions, DailySeries, HourlySeries, Metadata, WeatherSnapshot},
};

/// Build a snapshot from a forecast payload. Never fails.
pub fn normalize(payload: &RawPayload) -> WeatherSnapshot {
    let root = Section::new(Some(payload));

    WeatherSnapshot {
        current: current(&root.child("current")),
        daily: daily(&root.child("daily")),
        hourly: hourly(&root.child("hourly")),
        metadata: metadata(&root),
    }
}

fn current(s: &Section<'_>) -> CurrentConditions {
    CurrentConditions {
        time: s.timestamp("time"),
        temperature: s.number("temperature_2m"),
        apparent_temperature: s.number("apparent_temperature"),
        humidity: s.number("relative_humidity_2m"),
        is_day: s.integer("is_day"),
        precipitation: s.number("precipitation"),
        rain: s.number("rain"),
        showers: s.number("showers"),
        snowfall: s.number("snowfall"),
        weather_code: s.integer("weather_code"),
        cloud_cover: s.number("cloud_cover"),
        pressure: s.number("pressure_msl"),
        surface_pressure: s.number("surface_pressure"),
        wind_speed: s.number("wind_speed_10m"),
        wind_direction: s.number("wind_direction_10m"),
        wind_gusts: s.number("wind_gusts_10m"),
    }
}

fn daily(s: &Section<'_>) -> DailySeries {
    DailySeries {
        times: s.timestamps("time"),
        weather_codes: s.integers("weather_code"),
        temperature_max: s.numbers("temperature_2m_max"),
        temperature_min: s.numbers("temperature_2m_min"),
        apparent_temperature_max: s.numbers("apparent_temperature_max"),
        apparent_temperature_min: s.numbers("apparent_temperature_min"),
        sunrise: s.timestamps("sunrise"),
        sunset: s.timestamps("sunset"),
        daylight_duration: s.numbers("daylight_duration"),
        sunshine_duration: s.numbers("sunshine_duration"),
        uv_index_max: s.numbers("uv_index_max"),
        uv_index_clear_sky_max: s.numbers("uv_index_clear_sky_max"),
        precipitation_sum: s.numbers("precipitation_sum"),
        rain_sum: s.numbers("rain_sum"),
        showers_sum: s.numbers("showers_sum"),
        snowfall_sum: s.numbers("snowfall_sum"),
        precipitation_hours: s.numbers("precipitation_hours"),
        precipitation_probability_max: s.numbers("precipitation_probability_max"),
        wind_speed_max: s.numbers("wind_speed_10m_max"),
        wind_gusts_max: s.numbers("wind_gusts_10m_max"),
        wind_direction_dominant: s.numbers("wind_direction_10m_dominant"),
    }
}

fn hourly(s: &Section<'_>) -> HourlySeries {
    HourlySeries {
        times: s.timestamps("time"),
        temperature: s.numbers("temperature_2m"),
        humidity: s.numbers("relative_humidity_2m"),
        apparent_temperature: s.numbers("apparent_temperature"),
        precipitation_probability: s.numbers("precipitation_probability"),
        precipitation: s.numbers("precipitation"),
        rain: s.numbers("rain"),
        showers: s.numbers("showers"),
        snowfall: s.numbers("snowfall"),
        snow_depth: s.numbers("snow_depth"),
        weather_code: s.integers("weather_code"),
        surface_pressure: s.numbers("surface_pressure"),
        cloud_cover: s.numbers("cloud_cover"),
        cloud_cover_low: s.numbers("cloud_cover_low"),
        cloud_cover_mid: s.numbers("cloud_cover_mid"),
        cloud_cover_high: s.numbers("cloud_cover_high"),
        visibility: s.numbers("visibility"),
        wind_speed_10m: s.numbers("wind_speed_10m"),
        wind_speed_80m: s.numbers("wind_speed_80m"),
        wind_speed_120m: s.numbers("wind_speed_120m"),
        wind_speed_180m: s.numbers("wind_speed_180m"),
        wind_direction_10m: s.numbers("wind_direction_10m"),
        wind_direction_80m: s.numbers("wind_direction_80m"),
        wind_direction_120m: s.numbers("wind_direction_120m"),
        wind_direction_180m: s.numbers("wind_direction_180m"),
        wind_gusts_10m: s.numbers("wind_gusts_10m"),
        temperature_80m: s.numbers("temperature_80m"),
        temperature_120m: s.numbers("temperature_120m"),
        temperature_180m: s.numbers("temperature_180m"),
    }
}

fn metadata(root: &Section<'_>) -> Metadata {
    Metadata {
        latitude: root.number("latitude"),
        longitude: root.number("longitude"),
        timezone: root.text("timezone"),
        timezone_abbreviation: root.text("timezone_abbreviation"),
        utc_offset_seconds: root.integer("utc_offset_seconds"),
        elevation: root.number("elevation"),
    }
}

/// Read-only view of one JSON object that may not exist.
struct Section<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    fn new(value: Option<&'a Value>) -> Self {
        Self {
            fields: value.and_then(Value::as_object),
        }
    }

    fn child(&self, key: &str) -> Section<'a> {
        Section::new(self.get(key))
    }

    /// Present and not `null`.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields?.get(key).filter(|v| !v.is_null())
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(as_integer)
    }

    fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    fn timestamp(&self, key: &str) -> Option<NaiveDateTime> {
        self.get(key).and_then(Value::as_str).and_then(parse_timestamp)
    }

    fn series<T>(&self, key: &str, element: impl Fn(&Value) -> Option<T>) -> Vec<Option<T>> {
        match self.get(key).and_then(Value::as_array) {
            Some(items) => items.iter().map(element).collect(),
            None => Vec::new(),
        }
    }

    fn numbers(&self, key: &str) -> Vec<Option<f64>> {
        self.series(key, Value::as_f64)
    }

    fn integers(&self, key: &str) -> Vec<Option<i64>> {
        self.series(key, as_integer)
    }

    fn timestamps(&self, key: &str) -> Vec<Option<NaiveDateTime>> {
        self.series(key, |v| v.as_str().and_then(parse_timestamp))
    }
}

// Weather codes arrive as integers, but accept an integral float too.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Parse an Open-Meteo local timestamp (`2024-05-01T12:00`) or a bare date
/// (`2024-05-01`, used by the daily time axis, read as midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn empty_object_normalizes_to_all_missing() {
        let snapshot = normalize(&json!({}));

        assert_eq!(snapshot, WeatherSnapshot::default());
        assert!(snapshot.current.temperature.is_none());
        assert!(snapshot.daily.is_empty());
        assert!(snapshot.hourly.is_empty());
        assert!(snapshot.metadata.timezone.is_none());
    }

    #[test]
    fn non_object_payload_normalizes_to_all_missing() {
        assert_eq!(normalize(&json!([1, 2, 3])), WeatherSnapshot::default());
        assert_eq!(normalize(&Value::Null), WeatherSnapshot::default());
        assert_eq!(normalize(&json!({ "current": 5, "daily": "x" })), WeatherSnapshot::default());
    }

    #[test]
    fn null_field_is_missing_not_zero() {
        let snapshot = normalize(&json!({ "current": { "temperature_2m": null } }));

        assert_eq!(snapshot.current.temperature, None);
    }

    #[test]
    fn present_number_passes_through_unmodified() {
        let snapshot = normalize(&json!({
            "current": {
                "temperature_2m": 21.3,
                "pressure_msl": 1013.25,
                "wind_speed_10m": 11.9,
                "relative_humidity_2m": 64,
                "weather_code": 3,
                "is_day": 1
            }
        }));

        assert_eq!(snapshot.current.temperature, Some(21.3));
        assert_eq!(snapshot.current.pressure, Some(1013.25));
        assert_eq!(snapshot.current.wind_speed, Some(11.9));
        assert_eq!(snapshot.current.humidity, Some(64.0));
        assert_eq!(snapshot.current.weather_code, Some(3));
        assert_eq!(snapshot.current.is_day, Some(1));
    }

    #[test]
    fn current_time_is_parsed_as_local_datetime() {
        let snapshot = normalize(&json!({ "current": { "time": "2024-05-01T12:00" } }));

        let time = snapshot.current.time.expect("time parsed");
        assert_eq!((time.year(), time.month(), time.day()), (2024, 5, 1));
        assert_eq!((time.hour(), time.minute()), (12, 0));
    }

    #[test]
    fn daily_series_stay_index_aligned() {
        let snapshot = normalize(&json!({
            "daily": {
                "time": ["2024-05-01", "2024-05-02", "2024-05-03"],
                "weather_code": [0, 61, 95],
                "temperature_2m_max": [18.4, 15.1, 20.0],
                "temperature_2m_min": [6.2, 8.0, 9.9],
                "sunrise": ["2024-05-01T05:36", "2024-05-02T05:34", "2024-05-03T05:32"],
                "sunset": ["2024-05-01T20:22", "2024-05-02T20:24", "2024-05-03T20:25"],
                "precipitation_sum": [0.0, 4.2, 1.1]
            }
        }));
        let daily = &snapshot.daily;

        assert_eq!(daily.len(), 3);
        assert_eq!(daily.weather_codes, vec![Some(0), Some(61), Some(95)]);
        assert_eq!(daily.temperature_max, vec![Some(18.4), Some(15.1), Some(20.0)]);
        assert_eq!(daily.temperature_min.len(), 3);
        assert_eq!(daily.sunrise.len(), 3);
        assert_eq!(daily.sunset[2], Some(at(2024, 5, 3, 20, 25)));
        assert_eq!(daily.times[1], Some(at(2024, 5, 2, 0, 0)));
        assert_eq!(daily.precipitation_sum[0], Some(0.0));

        // absent fields are empty, independently of their siblings
        assert!(daily.uv_index_max.is_empty());
        assert!(daily.wind_direction_dominant.is_empty());
    }

    #[test]
    fn null_elements_keep_their_index() {
        let snapshot = normalize(&json!({
            "hourly": {
                "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
                "temperature_2m": [10.5, null, 9.8],
                "weather_code": [null, 2, 3]
            }
        }));

        assert_eq!(snapshot.hourly.temperature, vec![Some(10.5), None, Some(9.8)]);
        assert_eq!(snapshot.hourly.weather_code, vec![None, Some(2), Some(3)]);
    }

    #[test]
    fn hourly_reads_altitude_banded_fields() {
        let snapshot = normalize(&json!({
            "hourly": {
                "time": ["2024-05-01T00:00"],
                "wind_speed_80m": [14.0],
                "wind_direction_180m": [270],
                "temperature_120m": [7.7],
                "cloud_cover_mid": [40],
                "visibility": [24140.0],
                "snow_depth": [0.0]
            }
        }));
        let hourly = &snapshot.hourly;

        assert_eq!(hourly.times, vec![Some(at(2024, 5, 1, 0, 0))]);
        assert_eq!(hourly.wind_speed_80m, vec![Some(14.0)]);
        assert_eq!(hourly.wind_direction_180m, vec![Some(270.0)]);
        assert_eq!(hourly.temperature_120m, vec![Some(7.7)]);
        assert_eq!(hourly.cloud_cover_mid, vec![Some(40.0)]);
        assert_eq!(hourly.visibility, vec![Some(24140.0)]);
        assert_eq!(hourly.snow_depth, vec![Some(0.0)]);
        assert!(hourly.wind_speed_10m.is_empty());
    }

    #[test]
    fn order_is_preserved_without_sorting() {
        let snapshot = normalize(&json!({
            "hourly": {
                "time": ["2024-05-01T02:00", "2024-05-01T01:00", "2024-05-01T01:00"],
                "temperature_2m": [3.0, 1.0, 1.0]
            }
        }));

        assert_eq!(
            snapshot.hourly.times,
            vec![
                Some(at(2024, 5, 1, 2, 0)),
                Some(at(2024, 5, 1, 1, 0)),
                Some(at(2024, 5, 1, 1, 0)),
            ]
        );
        assert_eq!(snapshot.hourly.temperature, vec![Some(3.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn metadata_is_read_from_top_level() {
        let snapshot = normalize(&json!({
            "latitude": 50.08,
            "longitude": 14.439999,
            "timezone": "Europe/Berlin",
            "timezone_abbreviation": "CEST",
            "utc_offset_seconds": 7200,
            "elevation": 219.0
        }));
        let meta = &snapshot.metadata;

        assert_eq!(meta.latitude, Some(50.08));
        assert_eq!(meta.longitude, Some(14.439999));
        assert_eq!(meta.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(meta.timezone_abbreviation.as_deref(), Some("CEST"));
        assert_eq!(meta.utc_offset_seconds, Some(7200));
        assert_eq!(meta.elevation, Some(219.0));
    }

    #[test]
    fn wrongly_typed_values_are_missing() {
        let snapshot = normalize(&json!({
            "current": { "temperature_2m": "warm", "time": 12 },
            "daily": { "time": "2024-05-01", "temperature_2m_max": [true, 3.5] }
        }));

        assert_eq!(snapshot.current.temperature, None);
        assert_eq!(snapshot.current.time, None);
        assert!(snapshot.daily.times.is_empty());
        assert_eq!(snapshot.daily.temperature_max, vec![None, Some(3.5)]);
    }

    #[test]
    fn parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-05-01T12:00"), Some(at(2024, 5, 1, 12, 0)));
        assert_eq!(
            parse_timestamp("2024-05-01T12:00:30").map(|t| t.second()),
            Some(30)
        );
        assert_eq!(parse_timestamp("2024-05-01"), Some(at(2024, 5, 1, 0, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
