use super::{ParcelColumn, ParcelLoadError, ParcelRecord};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_records<R: Read>(
    reader: R,
    required: &[ParcelColumn],
) -> Result<Vec<ParcelRecord>, ParcelLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|header| header == column.header()))
    {
        return Err(ParcelLoadError::MissingColumn {
            column: missing.header(),
        });
    }

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while csv_reader.read_record(&mut raw)? {
        fit_to_headers(&mut raw, headers.len());
        let row: ParcelRow = raw.deserialize(Some(&headers))?;
        records.push(row.into_record());
    }

    Ok(records)
}

/// Drops fields past the last header and pads short rows with empty fields.
fn fit_to_headers(raw: &mut csv::StringRecord, width: usize) {
    raw.truncate(width);
    while raw.len() < width {
        raw.push_field("");
    }
}

#[derive(Debug, Deserialize)]
struct ParcelRow {
    #[serde(default)]
    tracking_nr: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    carrier_id: String,
    #[serde(rename = "type", default)]
    parcel_type: String,
    #[serde(default, deserialize_with = "lenient_weight")]
    weight: f64,
    #[serde(default)]
    price: String,
    #[serde(default)]
    dimension_id: String,
    #[serde(default)]
    free_dimension_id: String,
    #[serde(default)]
    free_transport: String,
}

impl ParcelRow {
    fn into_record(self) -> ParcelRecord {
        ParcelRecord {
            tracking_nr: self.tracking_nr.trim().to_string(),
            username: self.username.trim().to_string(),
            carrier_id: self.carrier_id.trim().to_string(),
            parcel_type: self.parcel_type.trim().to_string(),
            weight: self.weight,
            price: self.price.trim().to_string(),
            dimension_id: self.dimension_id.trim().to_string(),
            free_dimension_id: self.free_dimension_id.trim().to_string(),
            free_transport: self.free_transport.trim().to_string(),
        }
    }
}

fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(parse_weight).unwrap_or(0.0))
}

pub(crate) fn parse_weight(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}
