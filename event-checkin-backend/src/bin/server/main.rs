use event_checkin_backend::error::AppError;
use event_checkin_backend::run_server;
use event_checkin_backend::telemetry::setup_logging;
use event_checkin_config::get_config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // avoid putting more code here as this is outside of all spans so doesn't get traced
    setup_logging();
    let config = get_config()?;
    run_server(config).await?.await;
    Ok(())
}
