mod address;
mod config;
mod errors;
mod geocoder;
mod pipeline;
mod records;
mod resolver;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use address::{build_query, derive_address, simplified_query, AddressTarget, QueryPlan};
pub use config::AppConfig;
pub use errors::{AppError, AppResult, GeocodeError};
pub use geocoder::{Geocoder, Location, NominatimClient};
pub use pipeline::{enrich_file, enrich_lines, BatchOutcome, RunSummary};
pub use records::{parse_line, Coordinates, InputRecord, LineRejection, Metadata, OutputRecord};
pub use resolver::AddressResolver;

pub fn init_tracing() {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,address_geocoder=debug"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

pub async fn run(config: &AppConfig) -> AppResult<RunSummary> {
    let geocoder = NominatimClient::from_config(config)?;
    run_with_geocoder(config, Arc::new(geocoder)).await
}

pub async fn run_with_geocoder(
    config: &AppConfig,
    geocoder: Arc<dyn Geocoder>,
) -> AppResult<RunSummary> {
    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        user_agent = %config.user_agent,
        "starting geocoding run"
    );
    let resolver = AddressResolver::new(geocoder, config.request_delay());
    enrich_file(&config.input_path, &config.output_path, &resolver).await
}
