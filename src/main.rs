use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use nearby_places::{
    config::{self, AppConfig},
    geo,
    models::{Coordinate, FetchOutcome},
    platform::{PermissionStatus, PlatformError, SimulatedPlatform},
    services::{DeviceLocationProvider, LocationService, MockPlaceGenerator, PlaceCatalog},
};
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);
    debug!(?app_config, "configuration");

    match cli.command {
        Commands::Fetch(args) => handle_fetch(&app_config, args, cli.json).await?,
        Commands::Places(args) => handle_places(&app_config, args, cli.json)?,
        Commands::Distance(args) => handle_distance(args, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "nearby-places",
    about = "Resolve a location and list the places around it",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full fetch against a simulated device
    Fetch(FetchArgs),
    /// List generated places around a coordinate
    Places(PlacesArgs),
    /// Distance between two coordinates
    Distance(DistanceArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum PermissionArg {
    Granted,
    Denied,
}

#[derive(Clone, Copy, ValueEnum)]
enum FixErrorArg {
    Timeout,
    NoFix,
    Hardware,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(long, value_enum, default_value = "granted")]
    permission: PermissionArg,
    #[arg(long, help = "Simulate location services switched off")]
    services_disabled: bool,
    #[arg(long, allow_hyphen_values = true, help = "Latitude of the simulated fix")]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Longitude of the simulated fix")]
    lng: Option<f64>,
    #[arg(
        long,
        value_enum,
        conflicts_with_all = ["lat", "lng"],
        help = "Make the simulated fix fail"
    )]
    fix_error: Option<FixErrorArg>,
    #[arg(long, help = "Accept the permission prompt when it is raised")]
    grant_on_request: bool,
    #[arg(long, default_value_t = 1, help = "Number of fetches to run in sequence")]
    attempts: u32,
}

#[derive(Args)]
struct PlacesArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
    #[arg(long, help = "JSON catalog replacing the configured one")]
    catalog: Option<PathBuf>,
}

#[derive(Args)]
struct DistanceArgs {
    #[arg(long, allow_hyphen_values = true, help = "Origin as LAT,LNG")]
    from: Coordinate,
    #[arg(long, allow_hyphen_values = true, help = "Destination as LAT,LNG")]
    to: Coordinate,
}

async fn handle_fetch(app_config: &AppConfig, args: FetchArgs, json: bool) -> Result<()> {
    let mut platform = SimulatedPlatform::new()
        .with_permission(match args.permission {
            PermissionArg::Granted => PermissionStatus::Granted,
            PermissionArg::Denied => PermissionStatus::Denied,
        })
        .with_services_enabled(!args.services_disabled)
        .with_grant_on_request(args.grant_on_request);

    platform = match (args.fix_error, args.lat, args.lng) {
        (Some(kind), _, _) => platform.with_fix_error(match kind {
            FixErrorArg::Timeout => PlatformError::Timeout,
            FixErrorArg::NoFix => PlatformError::NoFixAvailable,
            FixErrorArg::Hardware => PlatformError::Hardware("simulated failure".into()),
        }),
        (None, Some(lat), Some(lng)) => platform.with_fix(
            Coordinate::new(lat, lng).context("invalid simulated fix coordinate")?,
        ),
        (None, None, None) => platform,
        _ => anyhow::bail!("--lat and --lng must be given together"),
    };

    let options = app_config
        .provider_options()
        .context("invalid provider configuration")?;
    let provider = DeviceLocationProvider::with_options(Arc::new(platform), options);
    let generator = app_config
        .place_generator()
        .context("failed to build place generator")?;
    let service = LocationService::new(Arc::new(provider), Arc::new(generator));

    for attempt in 1..=args.attempts.max(1) {
        let outcome = service.fetch_location_and_places().await;
        if json {
            print_json(&outcome)?;
        } else {
            print_outcome(attempt, &outcome);
        }
    }

    Ok(())
}

fn handle_places(app_config: &AppConfig, args: PlacesArgs, json: bool) -> Result<()> {
    let center = Coordinate::new(args.lat, args.lng).context("invalid center coordinate")?;
    let generator = match args.catalog {
        Some(path) => MockPlaceGenerator::new(
            PlaceCatalog::from_json_file(&path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?,
        ),
        None => app_config
            .place_generator()
            .context("failed to build place generator")?,
    };

    let places = generator.generate(&center);
    if json {
        print_json(&places)?;
    } else {
        println!("Places around {}:", center);
        for place in &places {
            println!("  {:<8} {:<16} {}", place.id, place.name, place.distance_label());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DistanceReport {
    from: Coordinate,
    to: Coordinate,
    ellipsoidal_meters: f64,
    haversine_meters: f64,
}

fn handle_distance(args: DistanceArgs, json: bool) -> Result<()> {
    let report = DistanceReport {
        from: args.from,
        to: args.to,
        ellipsoidal_meters: geo::distance_meters(&args.from, &args.to),
        haversine_meters: geo::haversine_meters(&args.from, &args.to),
    };

    if json {
        print_json(&report)?;
    } else {
        println!(
            "{} -> {}: {:.2} m (WGS84), {:.2} m (haversine)",
            report.from, report.to, report.ellipsoidal_meters, report.haversine_meters
        );
    }

    Ok(())
}

fn print_outcome(attempt: u32, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::NoOp { reason } => println!("[{}] nothing yet: {}", attempt, reason),
        FetchOutcome::Failure { message } => println!("[{}] error: {}", attempt, message),
        FetchOutcome::Success(result) => {
            println!(
                "[{}] location {} ({:?}), {} places",
                attempt,
                result.location,
                result.source,
                result.places.len()
            );
            for place in &result.places {
                println!("    {:<16} {}", place.name, place.distance_label());
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
