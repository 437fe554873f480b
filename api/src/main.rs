use std::process;

use bd_api::{server, telemetry};
use bd_shared::Settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Configuration errors are fatal before anything is served
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            process::exit(1);
        }
    };

    telemetry::init_tracing(&settings.log)?;
    tracing::info!("Starting Bedrock API server");

    server::run(settings).await
}
