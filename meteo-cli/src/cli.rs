use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use meteo_core::{
    CITIES, City, Config, Coordinate, ForecastSession, LoadOutcome, OpenMeteoFetcher, cities,
    fetch_snapshot,
};
use tracing::{debug, warn};

use crate::render::{self, View};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather forecasts for Czech regional cities")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported cities.
    Cities,

    /// Show the forecast for a city or coordinate.
    Show {
        /// City name, e.g. "Brno" or "plzen". Defaults to the configured city.
        city: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long, value_enum, default_value_t = View::Current)]
        view: View,

        /// Number of hours shown by the hourly view.
        #[arg(long, default_value_t = 24)]
        hours: usize,

        /// Print the normalized snapshot as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Choose the default city and forecast timezone.
    Configure,

    /// Interactively switch between cities and views.
    Browse,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Cities => list_cities(&Config::load()?),
            Command::Show { city, lat, lon, view, hours, json } => {
                show(city.as_deref(), lat.zip(lon), view, hours, json).await
            }
            Command::Configure => configure(),
            Command::Browse => browse().await,
        }
    }
}

fn list_cities(config: &Config) -> Result<()> {
    for line in city_lines(config) {
        println!("{line}");
    }
    Ok(())
}

/// One line per city; the default is starred when the configured one resolves.
fn city_lines(config: &Config) -> Vec<String> {
    let default = configured_default(config);
    CITIES
        .iter()
        .map(|city| {
            let marker = if default.is_some_and(|d| d.name == city.name) { "*" } else { " " };
            format!("{marker} {:<20} {}", city.name, city.coordinate)
        })
        .collect()
}

/// The default city, or `None` with a warning when the config names an unknown one.
fn configured_default(config: &Config) -> Option<&'static City> {
    match config.default_city() {
        Ok(city) => Some(city),
        Err(err) => {
            warn!("{err:#}");
            None
        }
    }
}

async fn show(
    city: Option<&str>,
    coordinate: Option<(f64, f64)>,
    view: View,
    hours: usize,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let (place, coordinate) = resolve_location(&config, city, coordinate)?;

    let fetcher = OpenMeteoFetcher::new(&config.api)?;
    let snapshot = fetch_snapshot(&fetcher, coordinate)
        .await
        .with_context(|| format!("Failed to load weather data for {place}"))?;

    if json {
        let out = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize weather snapshot")?;
        println!("{out}");
    } else {
        println!("{}", render::snapshot(&place, &snapshot, view, hours));
    }

    Ok(())
}

/// Pick the place to forecast: explicit city, explicit coordinate, or the configured default.
fn resolve_location(
    config: &Config,
    city: Option<&str>,
    coordinate: Option<(f64, f64)>,
) -> Result<(String, Coordinate)> {
    match (city, coordinate) {
        (Some(_), Some(_)) => bail!("Give either a city or --lat/--lon, not both"),
        (Some(name), None) => {
            let city = cities::find(name)?;
            Ok((city.name.to_string(), city.coordinate))
        }
        (None, Some((lat, lon))) => {
            let coordinate = Coordinate::new(lat, lon);
            if !coordinate.is_finite() {
                bail!("Latitude and longitude must be finite numbers");
            }
            Ok((coordinate.to_string(), coordinate))
        }
        (None, None) => {
            let city = config.default_city()?;
            debug!(city = city.name, "using configured default city");
            Ok((city.name.to_string(), city.coordinate))
        }
    }
}

/// Where the city picker starts: the configured default, else the first city.
fn starting_cursor(config: &Config, names: &[&str]) -> usize {
    configured_default(config)
        .and_then(|current| names.iter().position(|n| *n == current.name))
        .unwrap_or(0)
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let names: Vec<&str> = CITIES.iter().map(|c| c.name).collect();
    let cursor = starting_cursor(&config, &names);

    let chosen = Select::new("Default city:", names)
        .with_starting_cursor(cursor)
        .prompt()
        .context("City selection aborted")?;
    config.set_default_city(cities::find(chosen)?);

    let timezone = Text::new("Forecast timezone:")
        .with_default(&config.api.timezone)
        .prompt()
        .context("Timezone input aborted")?;
    config.api.timezone = timezone.trim().to_string();

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn browse() -> Result<()> {
    let config = Config::load()?;
    let session = ForecastSession::new(OpenMeteoFetcher::new(&config.api)?);
    let views = vec![View::Current, View::Daily, View::Hourly, View::All];

    loop {
        let names: Vec<&str> = CITIES.iter().map(|c| c.name).collect();
        let Some(name) = Select::new("City (Esc to quit):", names).prompt_skippable()? else {
            break;
        };
        let Some(view) = Select::new("View:", views.clone()).prompt_skippable()? else {
            continue;
        };

        let city = cities::find(name)?;
        println!("Loading weather data for {}...", city.name);

        match session.load(city.coordinate).await {
            LoadOutcome::Applied(snapshot) => {
                println!("{}\n", render::snapshot(city.name, &snapshot, view, 24));
            }
            LoadOutcome::Failed(err) => {
                warn!(city = city.name, error = %err, "forecast load failed");
                eprintln!("Failed to load weather data: {err}");
            }
            LoadOutcome::Superseded => debug!(city = city.name, "forecast load superseded"),
        }
    }

    Ok(())
}
