use crate::commands::{
    run_all, run_free_dimensions, run_free_transport, run_prices, AllArgs, FreeDimensionsArgs,
    FreeTransportArgs, PricesArgs,
};
use crate::render::OutputFormat;
use clap::{Parser, Subcommand};
use genius_control::config::{AppConfig, SourceConfig};
use genius_control::error::AppError;
use genius_control::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "genius-audit",
    about = "Audit parcel exports for pricing and free-transport anomalies",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Directory holding parcel_dimension.csv, no_genius/ and emag_clubs_01.csv
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,
    /// Report output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find parcels of one customer billed at different prices for the same attributes
    Prices(PricesArgs),
    /// Check that every free-dimension parcel is flagged for free transport
    FreeDimensions(FreeDimensionsArgs),
    /// Compare free-transport flags against carrier, eMag Club and no_genius rules
    FreeTransport(FreeTransportArgs),
    /// Run every audit against the source directory
    All(AllArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(source_dir) = cli.source_dir {
        config.sources = SourceConfig::new(source_dir)?;
    }

    telemetry::init(&config.telemetry)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Prices(args) => run_prices(&config, args, cli.format, &mut out),
        Command::FreeDimensions(args) => run_free_dimensions(&config, args, cli.format, &mut out),
        Command::FreeTransport(args) => run_free_transport(&config, args, cli.format, &mut out),
        Command::All(args) => run_all(&config, args, cli.format, &mut out),
    }
}
