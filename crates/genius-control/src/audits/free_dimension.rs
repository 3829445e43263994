use crate::parcels::{ParcelColumn, ParcelRecord};
use serde::Serialize;

pub const REQUIRED_COLUMNS: &[ParcelColumn] = &[
    ParcelColumn::FreeDimensionId,
    ParcelColumn::FreeTransport,
    ParcelColumn::TrackingNr,
    ParcelColumn::Username,
];

const FREE_DIMENSION_ID: &str = "1";
const FREE_FLAG: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeDimensionMismatch {
    pub tracking_nr: String,
    pub username: String,
    pub free_transport: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeDimensionReport {
    pub free_dimension_parcels: usize,
    pub mismatches: Vec<FreeDimensionMismatch>,
}

impl FreeDimensionReport {
    pub fn is_aligned(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Checks that parcels packed in the free dimension also ship free.
pub struct FreeDimensionAudit;

impl FreeDimensionAudit {
    pub fn run(parcels: &[ParcelRecord]) -> FreeDimensionReport {
        let mut free_dimension_parcels = 0;
        let mut mismatches = Vec::new();

        for parcel in parcels
            .iter()
            .filter(|parcel| parcel.free_dimension_id == FREE_DIMENSION_ID)
        {
            free_dimension_parcels += 1;
            if parcel.free_transport != FREE_FLAG {
                mismatches.push(FreeDimensionMismatch {
                    tracking_nr: parcel.tracking_nr.clone(),
                    username: parcel.username.clone(),
                    free_transport: parcel.free_transport.clone(),
                });
            }
        }

        FreeDimensionReport {
            free_dimension_parcels,
            mismatches,
        }
    }
}
