use crate::render::{self, OutputFormat};
use clap::Args;
use genius_control::audits::{
    eligibility, free_dimension, pricing, FreeDimensionAudit, FreeTransportAudit,
    FreeTransportRule, PriceConsistencyAudit,
};
use genius_control::config::{AppConfig, ConfigError};
use genius_control::error::AppError;
use genius_control::parcels::ParcelSource;
use genius_control::reference::ReferenceSets;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct PricesArgs {
    /// Parcel export to audit (defaults to <source-dir>/parcel_dimension.csv)
    #[arg(long)]
    pub(crate) parcels: Option<PathBuf>,
    /// Customer username whose prices are compared
    #[arg(long)]
    pub(crate) username: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FreeDimensionsArgs {
    /// Parcel export to audit (defaults to <source-dir>/parcel_dimension.csv)
    #[arg(long)]
    pub(crate) parcels: Option<PathBuf>,
    /// Maximum discrepancy rows to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FreeTransportArgs {
    /// Parcel export to audit (defaults to <source-dir>/parcel_dimension.csv)
    #[arg(long)]
    pub(crate) parcels: Option<PathBuf>,
    /// Directory of no_genius exception lists (defaults to <source-dir>/no_genius)
    #[arg(long)]
    pub(crate) no_genius_dir: Option<PathBuf>,
    /// eMag Club membership list (defaults to <source-dir>/emag_clubs_01.csv)
    #[arg(long)]
    pub(crate) emag_clubs: Option<PathBuf>,
    /// Maximum discrepancy rows to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AllArgs {
    /// Customer username for the price audit
    #[arg(long)]
    pub(crate) username: Option<String>,
    /// Maximum discrepancy rows to print per audit
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_prices<W: Write>(
    config: &AppConfig,
    args: PricesArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    let PricesArgs { parcels, username } = args;
    let path = parcels.unwrap_or_else(|| config.sources.parcel_csv());
    let username = match username {
        Some(name) if name.trim().is_empty() => return Err(ConfigError::EmptyUsername.into()),
        Some(name) => name,
        None => config.audit.price_username.clone(),
    };
    let audit = PriceConsistencyAudit::new(username);

    if format == OutputFormat::Text {
        render::price_banner(out, audit.username())?;
    }

    let records = ParcelSource::from_path(&path, pricing::REQUIRED_COLUMNS)?;
    let report = audit.run(&records);
    info!(
        username = %report.username,
        parcels = report.parcels_matched,
        groups = report.groups_checked,
        deviations = report.deviations.len(),
        "price audit finished"
    );

    match format {
        OutputFormat::Text => render::price_report(out, &report)?,
        OutputFormat::Json => render::json(out, "prices", &report)?,
    }
    Ok(())
}

pub(crate) fn run_free_dimensions<W: Write>(
    config: &AppConfig,
    args: FreeDimensionsArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    let FreeDimensionsArgs { parcels, limit } = args;
    let path = parcels.unwrap_or_else(|| config.sources.parcel_csv());
    let limit = limit.unwrap_or(config.audit.report_limit);

    if format == OutputFormat::Text {
        render::free_dimension_banner(out)?;
    }

    let records = ParcelSource::from_path(&path, free_dimension::REQUIRED_COLUMNS)?;
    let report = FreeDimensionAudit::run(&records);
    info!(
        free_dimension_parcels = report.free_dimension_parcels,
        mismatches = report.mismatches.len(),
        "free dimension audit finished"
    );

    match format {
        OutputFormat::Text => render::free_dimension_report(out, &report, limit)?,
        OutputFormat::Json => render::json(out, "free-dimensions", &report)?,
    }
    Ok(())
}

pub(crate) fn run_free_transport<W: Write>(
    config: &AppConfig,
    args: FreeTransportArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    let FreeTransportArgs {
        parcels,
        no_genius_dir,
        emag_clubs,
        limit,
    } = args;
    let path = parcels.unwrap_or_else(|| config.sources.parcel_csv());
    let no_genius_dir = no_genius_dir.unwrap_or_else(|| config.sources.no_genius_dir());
    let emag_clubs = emag_clubs.unwrap_or_else(|| config.sources.emag_clubs_csv());
    let limit = limit.unwrap_or(config.audit.report_limit);
    let text = format == OutputFormat::Text;

    if text {
        render::loading_banner(out)?;
    }
    let references = ReferenceSets::load(&no_genius_dir, &emag_clubs);
    if text {
        render::reference_counts(out, &references)?;
    }

    let records = ParcelSource::from_path(&path, eligibility::REQUIRED_COLUMNS)?;
    let report = FreeTransportAudit::new(FreeTransportRule::standard(), &references).run(&records);
    info!(
        analyzed = report.total_analyzed,
        should_be_free = report.free_should_be,
        discrepancies = report.discrepancies.len(),
        "free transport audit finished"
    );

    match format {
        OutputFormat::Text => render::free_transport_report(out, &report, limit)?,
        OutputFormat::Json => render::json(out, "free-transport", &report)?,
    }
    Ok(())
}

/// Runs every audit against the configured source directory.
pub(crate) fn run_all<W: Write>(
    config: &AppConfig,
    args: AllArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    let AllArgs { username, limit } = args;

    run_prices(
        config,
        PricesArgs {
            parcels: None,
            username,
        },
        format,
        out,
    )?;
    writeln!(out)?;
    run_free_dimensions(
        config,
        FreeDimensionsArgs {
            parcels: None,
            limit,
        },
        format,
        out,
    )?;
    writeln!(out)?;
    run_free_transport(
        config,
        FreeTransportArgs {
            limit,
            ..FreeTransportArgs::default()
        },
        format,
        out,
    )
}
