use anyhow::Context;
use bookstore_kernel::settings::{redact_url, Settings};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Run and administer the bookstore service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the resolved configuration without connecting to anything
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry);
            bookstore_app::app::serve(&settings).await
        }
        Command::Migrate => {
            bookstore_telemetry::init(&settings.telemetry);
            let applied = bookstore_app::app::migrate(&settings).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Config => {
            let mut resolved = serde_json::to_value(&settings)
                .with_context(|| "failed to serialize settings")?;
            resolved["database"]["url"] = redact_url(&settings.database_url()).into();
            // The login may embed a password; the redacted URL already shows it.
            if let Some(database) = resolved["database"].as_object_mut() {
                database.remove("login");
            }
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(())
        }
    }
}
