//! Routecast - Cycling Route Weather-Forecast Planning
//!
//! Command-line entry point: load a route and a rider profile, then either
//! plan the forecast fetch points or, given fetched weather samples, print
//! the forecast-dependent values.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use routecast::forecast::{
    compute_forecast_dependent_values, plan_forecast_points, ForecastDependentValues,
    WeatherSample, MILES_TO_METERS,
};
use routecast::rider;
use routecast::route::parse_gpx;

const USAGE: &str = "Usage: routecast <route.gpx> [--profile <profile.toml>] \
[--weather <forecast.json>] [--start <rfc3339>] [--interval <hours>] [--json]";

struct Args {
    route: PathBuf,
    profile: Option<PathBuf>,
    weather: Option<PathBuf>,
    start: Option<DateTime<Utc>>,
    interval_hours: f64,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut route = None;
    let mut profile = None;
    let mut weather = None;
    let mut start = None;
    let mut interval_hours = 1.0;
    let mut json = false;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => {
                profile = Some(PathBuf::from(
                    iter.next().context("--profile requires a path")?,
                ));
            }
            "--weather" => {
                weather = Some(PathBuf::from(
                    iter.next().context("--weather requires a path")?,
                ));
            }
            "--start" => {
                let value = iter.next().context("--start requires an RFC 3339 time")?;
                let parsed = DateTime::parse_from_rfc3339(&value)
                    .with_context(|| format!("invalid start time: {}", value))?;
                start = Some(parsed.with_timezone(&Utc));
            }
            "--interval" => {
                let value = iter.next().context("--interval requires hours")?;
                interval_hours = value
                    .parse()
                    .with_context(|| format!("invalid interval: {}", value))?;
            }
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if route.is_none() && !other.starts_with('-') => {
                route = Some(PathBuf::from(other));
            }
            other => bail!("unrecognized argument: {}\n{}", other, USAGE),
        }
    }

    let Some(route) = route else {
        bail!("missing route file\n{}", USAGE);
    };

    Ok(Args {
        route,
        profile,
        weather,
        start,
        interval_hours,
        json,
    })
}

fn print_summary(values: &ForecastDependentValues) {
    println!("--- Forecast summary ---");
    match values.finish_time {
        Some(finish) => println!("Projected finish: {}", finish.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Projected finish: n/a"),
    }
    if values.weather_correction_minutes >= 0.0 {
        println!(
            "Time lost to wind: {:.1} min",
            values.weather_correction_minutes
        );
    } else {
        println!(
            "Time gained from wind: {:.1} min",
            -values.weather_correction_minutes
        );
    }
    println!("Max gust: {:.0} mph", values.max_gust_speed);
    if !values.chart_data.is_empty() {
        println!("Per-segment wind delta:");
        for point in &values.chart_data {
            println!("  {:6.1} mi  {:+.2} min", point.distance, point.delta);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting routecast v{}", env!("CARGO_PKG_VERSION"));

    let args = parse_args()?;

    let profile = match &args.profile {
        Some(path) => rider::load_profile_from(path)
            .with_context(|| format!("loading profile from {}", path.display()))?,
        None => rider::load_profile().context("loading default profile")?,
    };

    let bytes = std::fs::read(&args.route)
        .with_context(|| format!("reading {}", args.route.display()))?;
    let route = parse_gpx(&bytes).context("parsing GPX route")?;
    tracing::info!(
        "Loaded route '{}': {:.1} mi, {} samples",
        route.name,
        route.total_distance_m() / MILES_TO_METERS,
        route.samples.len()
    );

    let start = args.start.unwrap_or_else(Utc::now);

    match &args.weather {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let samples: Vec<WeatherSample> =
                serde_json::from_str(&text).context("parsing weather samples")?;
            let values =
                compute_forecast_dependent_values(&route.samples, &samples, &profile, start);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                print_summary(&values);
            }
        }
        None => {
            let points = plan_forecast_points(&route.samples, &profile, start, args.interval_hours);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("--- Forecast fetch points ---");
                for point in &points {
                    println!(
                        "  {:6.1} mi  {}  ({:.4}, {:.4})",
                        point.distance,
                        point.time.format("%Y-%m-%d %H:%M"),
                        point.lat,
                        point.lon
                    );
                }
            }
        }
    }

    Ok(())
}
