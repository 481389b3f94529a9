use anyhow::Context;
use libris_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load libris settings")?;
    libris_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        data_dir = ?settings.database.data_dir,
        "libris-app bootstrap starting"
    );

    libris_app::bootstrap::serve(settings).await?;

    tracing::info!("libris-app shut down");
    Ok(())
}
