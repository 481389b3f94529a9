use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about = "Library catalog server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the catalog over HTTP until Ctrl-C
    Serve,
    /// Fill the configured data directory with a sample catalog
    Seed {
        /// Seed even when the catalog already has books
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load libris settings")?;

    match cli.command {
        Command::Serve => {
            libris_telemetry::init(&settings.telemetry)?;
            libris_app::bootstrap::serve(settings).await
        }
        Command::Seed { force } => {
            libris_telemetry::init(&settings.telemetry)?;
            if settings.database.data_dir.is_none() {
                anyhow::bail!("database.data_dir is not set; nothing to seed");
            }
            let catalog = libris_app::bootstrap::open_catalog(&settings).await?;
            let report = libris_app::seed::seed(&catalog, force).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
