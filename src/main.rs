use std::process::ExitCode;

use address_geocoder::{init_tracing, run, AppConfig};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let config = AppConfig::from_env();
    match run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "geocoding run aborted");
            ExitCode::FAILURE
        }
    }
}
