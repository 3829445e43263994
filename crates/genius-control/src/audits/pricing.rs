use crate::parcels::{ParcelColumn, ParcelRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Maximum example tracking numbers kept per price bucket.
pub const EXAMPLES_PER_PRICE: usize = 3;

pub const REQUIRED_COLUMNS: &[ParcelColumn] = &[
    ParcelColumn::Username,
    ParcelColumn::Weight,
    ParcelColumn::CarrierId,
    ParcelColumn::Type,
    ParcelColumn::FreeTransport,
    ParcelColumn::Price,
    ParcelColumn::TrackingNr,
    ParcelColumn::DimensionId,
];

/// Attributes that should fully determine a parcel's price for one customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceGroupKey {
    pub weight: f64,
    pub carrier_id: String,
    pub parcel_type: String,
    pub free_transport: String,
}

impl PriceGroupKey {
    /// Float-literal rendering: integral weights keep one decimal (`2.0`),
    /// very small or large ones use a signed exponent (`1e-05`, `1e+16`).
    pub fn weight_label(&self) -> String {
        if self.weight.is_nan() {
            return "nan".to_string();
        }
        if self.weight.is_infinite() {
            return if self.weight > 0.0 { "inf" } else { "-inf" }.to_string();
        }

        let scientific = format!("{:e}", self.weight);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            if !(-4..16).contains(&exponent) {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
            }
        }

        if self.weight.fract() == 0.0 {
            format!("{:.1}", self.weight)
        } else {
            self.weight.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    pub price: String,
    pub parcels: usize,
    pub dimensions: BTreeSet<String>,
    pub examples: Vec<String>,
}

/// A group whose parcels were billed at more than one price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDeviation {
    pub key: PriceGroupKey,
    /// Distinct prices in lexicographic order.
    pub prices: Vec<String>,
    /// One bucket per distinct price, in first-seen order.
    pub buckets: Vec<PriceBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAuditReport {
    pub username: String,
    pub parcels_matched: usize,
    pub groups_checked: usize,
    pub deviations: Vec<PriceDeviation>,
}

impl PriceAuditReport {
    pub fn has_deviations(&self) -> bool {
        !self.deviations.is_empty()
    }
}

/// Flags price inconsistencies among one customer's parcels.
pub struct PriceConsistencyAudit {
    username: String,
}

impl PriceConsistencyAudit {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn run(&self, parcels: &[ParcelRecord]) -> PriceAuditReport {
        let mut index: HashMap<(u64, &str, &str, &str), usize> = HashMap::new();
        let mut groups: Vec<(PriceGroupKey, Vec<&ParcelRecord>)> = Vec::new();
        let mut parcels_matched = 0;

        for parcel in parcels.iter().filter(|parcel| parcel.username == self.username) {
            parcels_matched += 1;
            let slot = match weight_bits(parcel.weight) {
                Some(bits) => {
                    let lookup = (
                        bits,
                        parcel.carrier_id.as_str(),
                        parcel.parcel_type.as_str(),
                        parcel.free_transport.as_str(),
                    );
                    *index
                        .entry(lookup)
                        .or_insert_with(|| open_group(&mut groups, parcel))
                }
                None => open_group(&mut groups, parcel),
            };
            groups[slot].1.push(parcel);
        }

        let groups_checked = groups.len();
        let deviations = groups
            .into_iter()
            .filter_map(|(key, members)| deviation_for(key, &members))
            .collect();

        PriceAuditReport {
            username: self.username.clone(),
            parcels_matched,
            groups_checked,
            deviations,
        }
    }
}

fn open_group(groups: &mut Vec<(PriceGroupKey, Vec<&ParcelRecord>)>, parcel: &ParcelRecord) -> usize {
    groups.push((
        PriceGroupKey {
            weight: parcel.weight,
            carrier_id: parcel.carrier_id.clone(),
            parcel_type: parcel.parcel_type.clone(),
            free_transport: parcel.free_transport.clone(),
        },
        Vec::new(),
    ));
    groups.len() - 1
}

fn deviation_for(key: PriceGroupKey, members: &[&ParcelRecord]) -> Option<PriceDeviation> {
    let mut buckets: Vec<PriceBucket> = Vec::new();
    for parcel in members {
        let bucket = match buckets.iter().position(|bucket| bucket.price == parcel.price) {
            Some(position) => &mut buckets[position],
            None => {
                buckets.push(PriceBucket {
                    price: parcel.price.clone(),
                    parcels: 0,
                    dimensions: BTreeSet::new(),
                    examples: Vec::new(),
                });
                let last = buckets.len() - 1;
                &mut buckets[last]
            }
        };

        bucket.parcels += 1;
        bucket.dimensions.insert(parcel.dimension_id.clone());
        if bucket.examples.len() < EXAMPLES_PER_PRICE {
            bucket.examples.push(parcel.tracking_nr.clone());
        }
    }

    if buckets.len() < 2 {
        return None;
    }

    let mut prices: Vec<String> = buckets.iter().map(|bucket| bucket.price.clone()).collect();
    prices.sort();

    Some(PriceDeviation {
        key,
        prices,
        buckets,
    })
}

// Numeric equality for grouping: -0.0 joins 0.0. NaN equals nothing, so it
// has no shared key and every NaN row opens its own group.
fn weight_bits(weight: f64) -> Option<u64> {
    if weight.is_nan() {
        None
    } else if weight == 0.0 {
        Some(0.0f64.to_bits())
    } else {
        Some(weight.to_bits())
    }
}
