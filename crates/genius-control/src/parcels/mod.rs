mod parser;

use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Columns of the parcel dimension export that the audits know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelColumn {
    TrackingNr,
    Username,
    CarrierId,
    Type,
    Weight,
    Price,
    DimensionId,
    FreeDimensionId,
    FreeTransport,
}

impl ParcelColumn {
    pub const fn header(self) -> &'static str {
        match self {
            Self::TrackingNr => "tracking_nr",
            Self::Username => "username",
            Self::CarrierId => "carrier_id",
            Self::Type => "type",
            Self::Weight => "weight",
            Self::Price => "price",
            Self::DimensionId => "dimension_id",
            Self::FreeDimensionId => "free_dimension_id",
            Self::FreeTransport => "free_transport",
        }
    }
}

/// One row of the parcel export with every text field trimmed.
///
/// Flags such as `free_transport` stay textual; the audits compare them
/// against the literal `"1"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcelRecord {
    pub tracking_nr: String,
    pub username: String,
    pub carrier_id: String,
    pub parcel_type: String,
    /// Malformed or empty weights load as `0.0`.
    pub weight: f64,
    pub price: String,
    pub dimension_id: String,
    pub free_dimension_id: String,
    pub free_transport: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParcelLoadError {
    #[error("file {} not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read parcel export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid parcel CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("parcel export is missing required column '{column}'")]
    MissingColumn { column: &'static str },
}

pub struct ParcelSource;

impl ParcelSource {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        required: &[ParcelColumn],
    ) -> Result<Vec<ParcelRecord>, ParcelLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ParcelLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ParcelLoadError::Io(err),
        })?;

        let records = Self::from_reader(file, required)?;
        info!(path = %path.display(), parcels = records.len(), "loaded parcel export");
        Ok(records)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        required: &[ParcelColumn],
    ) -> Result<Vec<ParcelRecord>, ParcelLoadError> {
        parser::parse_records(reader, required)
    }
}
