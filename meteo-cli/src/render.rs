use chrono::NaiveDateTime;
use clap::ValueEnum;
use meteo_core::{CurrentConditions, DailySeries, HourlySeries, Metadata, WeatherCondition, WeatherSnapshot};

const MISSING: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Current,
    Daily,
    Hourly,
    All,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Current => "Current conditions",
            View::Daily => "Daily forecast",
            View::Hourly => "Hourly forecast",
            View::All => "All views",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn snapshot(place: &str, snapshot: &WeatherSnapshot, view: View, hours: usize) -> String {
    let mut blocks = vec![header(place, &snapshot.metadata)];

    if matches!(view, View::Current | View::All) {
        blocks.push(current(&snapshot.current));
    }
    if matches!(view, View::Daily | View::All) {
        blocks.push(daily(&snapshot.daily));
    }
    if matches!(view, View::Hourly | View::All) {
        blocks.push(hourly(&snapshot.hourly, hours));
    }

    blocks.join("\n\n")
}

fn header(place: &str, meta: &Metadata) -> String {
    let grid = match (meta.latitude, meta.longitude) {
        (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
        _ => MISSING.to_string(),
    };
    format!(
        "Weather for {place}\n  grid point {grid}, elevation {}, timezone {}",
        value(meta.elevation, " m"),
        meta.timezone_abbreviation
            .as_deref()
            .or(meta.timezone.as_deref())
            .unwrap_or(MISSING),
    )
}

fn current(c: &CurrentConditions) -> String {
    let when = match c.time {
        Some(t) => format!("{} {}", date(Some(t)), time(Some(t))),
        None => MISSING.to_string(),
    };

    [
        format!("Current conditions ({when})"),
        format!("  {}", condition(c.weather_code)),
        format!("  Temperature   {}", value(c.temperature, "°C")),
        format!("  Feels like    {}", value(c.apparent_temperature, "°C")),
        format!("  Humidity      {}", value(c.humidity, "%")),
        format!("  Wind          {}", value(c.wind_speed, " km/h")),
        format!("  Precipitation {}", value(c.precipitation, " mm")),
        format!("  Pressure      {}", value(c.pressure, " hPa")),
    ]
    .join("\n")
}

fn daily(d: &DailySeries) -> String {
    let mut lines = vec![format!("{}-day forecast", d.len())];

    for i in 0..d.len() {
        lines.push(format!(
            "  {:<10}  {:<24}  {} / {}  precip {}  wind {}",
            date(at(&d.times, i)),
            condition(at(&d.weather_codes, i)),
            value(at(&d.temperature_min, i), "°"),
            value(at(&d.temperature_max, i), "°"),
            value(at(&d.precipitation_sum, i), " mm"),
            value(at(&d.wind_speed_max, i), " km/h"),
        ));
    }

    lines.join("\n")
}

fn hourly(h: &HourlySeries, hours: usize) -> String {
    let mut lines = vec![
        "Hourly forecast".to_string(),
        format!(
            "  {:<5}  {:<24}  {:>8}  {:>10}  {:>16}  {:>10}",
            "Time", "Weather", "Temp", "Feels", "Precip", "Wind"
        ),
    ];

    for i in 0..h.len().min(hours) {
        let probability = at(&h.precipitation_probability, i)
            .map(|p| format!(" ({p}%)"))
            .unwrap_or_default();
        lines.push(format!(
            "  {:<5}  {:<24}  {:>8}  {:>10}  {:>16}  {:>10}",
            time(at(&h.times, i)),
            condition(at(&h.weather_code, i)),
            value(at(&h.temperature, i), "°C"),
            value(at(&h.apparent_temperature, i), "°C"),
            format!("{}{probability}", value(at(&h.precipitation, i), " mm")),
            value(at(&h.wind_speed_10m, i), " km/h"),
        ));
    }

    lines.join("\n")
}

/// Element `i` of a series; a short or absent series reads as missing.
fn at<T: Copy>(series: &[Option<T>], i: usize) -> Option<T> {
    series.get(i).copied().flatten()
}

fn value(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) => format!("{v}{unit}"),
        None => MISSING.to_string(),
    }
}

fn condition(code: Option<i64>) -> String {
    let condition = code.map_or(WeatherCondition::Unknown, WeatherCondition::from_wmo_code);
    format!("{} {}", condition.symbol(), condition.description())
}

fn date(t: Option<NaiveDateTime>) -> String {
    t.map_or_else(|| MISSING.to_string(), |t| t.format("%d.%m.%Y").to_string())
}

fn time(t: Option<NaiveDateTime>) -> String {
    t.map_or_else(|| MISSING.to_string(), |t| t.format("%H:%M").to_string())
}
