use std::process::ExitCode;

use charge_finder::config::Settings;
use charge_finder::domain::LocationInput;
use charge_finder::location::{
    DeviceAddressClient, RequestEnvelope, resolve_device_address, resolve_device_geolocation,
};
use charge_finder::mapping::MappingClient;
use charge_finder::stations::{StationClient, StationFilter};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Look up charging stations for a saved request envelope.
///
/// Usage: `charge-finder <envelope.json> [fallback location text]`
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("charge_finder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let envelope_path = args
        .next()
        .ok_or("usage: charge-finder <envelope.json> [fallback location]")?;
    let fallback = args.next();

    let settings = Settings::from_env()?;
    let stations = StationClient::new(settings.nrel)?;
    let mapping = MappingClient::new(settings.here)?;

    let envelope = RequestEnvelope::from_json(&std::fs::read_to_string(&envelope_path)?)?;

    // Live fix first, then the registered address, then whatever the user said.
    let location = match resolve_device_geolocation(&envelope) {
        Some(c) => Some(LocationInput::Coordinates(c)),
        None => {
            let addresses = DeviceAddressClient::from_envelope(&envelope);
            resolve_device_address(&envelope, &addresses, &mapping)
                .await?
                .map(LocationInput::Coordinates)
        }
    }
    .or_else(|| fallback.map(LocationInput::Text));

    let Some(location) = location else {
        warn!("no usable location for this request");
        println!("{}", serde_json::json!({ "location": null, "stations": [] }));
        return Ok(());
    };
    info!(%location, "searching for stations");

    let found = stations
        .find_stations(&location, &StationFilter::new())
        .await?;
    info!(count = found.len(), "stations found");

    let route = match (location.as_coordinate(), found.first().and_then(|s| s.coordinate())) {
        (Some(from), Some(to)) => Some(mapping.estimate_distance(from, to, &location).await?),
        _ => None,
    };

    let output = serde_json::json!({
        "location": location.to_string(),
        "stations": found,
        "route": route,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
