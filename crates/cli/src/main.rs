mod call_commands;
mod property_commands;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "webcall", version, about = "webcall: HTTP calls described by property files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    sources: property_commands::SourceArgs,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "WEBCALL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved value of a property.
    Get {
        key: String,
        /// Value used when the key is missing.
        #[arg(long)]
        default: Option<String>,
        /// Read the value as a number.
        #[arg(long)]
        numeric: bool,
    },
    /// List every loaded key.
    Keys,
    /// Show the request the loaded properties describe.
    Request,
    /// Perform the request the loaded properties describe.
    Call(call_commands::CallArgs),
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "webcall starting");

    let props = property_commands::build_loader(&cli.sources)?;

    match cli.command {
        Commands::Get {
            key,
            default,
            numeric,
        } => property_commands::get(&props, &key, default.as_deref(), numeric),
        Commands::Keys => {
            property_commands::keys(&props);
            Ok(())
        },
        Commands::Request => call_commands::show_request(&props),
        Commands::Call(args) => call_commands::call(&props, args).await,
    }
}
