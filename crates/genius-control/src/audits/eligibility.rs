use crate::parcels::{ParcelColumn, ParcelRecord};
use crate::reference::ReferenceSets;
use serde::Serialize;

pub const REQUIRED_COLUMNS: &[ParcelColumn] = &[
    ParcelColumn::TrackingNr,
    ParcelColumn::CarrierId,
    ParcelColumn::Type,
    ParcelColumn::Weight,
    ParcelColumn::FreeTransport,
];

/// Carrier/type/weight combination that qualifies a parcel for free transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeTransportRule {
    pub carrier_ids: Vec<String>,
    pub parcel_type: String,
    /// Inclusive upper bound.
    pub max_weight: f64,
}

impl FreeTransportRule {
    /// Pickup-point deliveries up to 20 kg with carriers 24, 41 or 49.
    pub fn standard() -> Self {
        Self {
            carrier_ids: vec!["24".to_string(), "41".to_string(), "49".to_string()],
            parcel_type: "point".to_string(),
            max_weight: 20.0,
        }
    }

    pub fn matches(&self, parcel: &ParcelRecord) -> bool {
        self.carrier_ids.iter().any(|id| *id == parcel.carrier_id)
            && parcel.parcel_type == self.parcel_type
            && parcel.weight <= self.max_weight
    }
}

impl Default for FreeTransportRule {
    fn default() -> Self {
        Self::standard()
    }
}

/// Free-transport flag value as stored in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedFlag {
    #[serde(rename = "1")]
    Free,
    #[serde(rename = "0")]
    Charged,
}

impl ExpectedFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "1",
            Self::Charged => "0",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityDiscrepancy {
    pub tracking_nr: String,
    pub carrier_id: String,
    pub parcel_type: String,
    pub weight: f64,
    pub actual: String,
    pub expected: ExpectedFlag,
    pub is_exception: bool,
    pub is_emag_club: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeTransportReport {
    pub exceptions_loaded: usize,
    pub emag_clubs_loaded: usize,
    pub total_analyzed: usize,
    pub free_should_be: usize,
    pub discrepancies: Vec<EligibilityDiscrepancy>,
}

/// Compares each parcel's free-transport flag against the eligibility rule.
///
/// A parcel should ship free when it matches the rule or is an eMag Club
/// parcel, unless it appears on the no_genius exception list.
pub struct FreeTransportAudit<'a> {
    rule: FreeTransportRule,
    references: &'a ReferenceSets,
}

impl<'a> FreeTransportAudit<'a> {
    pub fn new(rule: FreeTransportRule, references: &'a ReferenceSets) -> Self {
        Self { rule, references }
    }

    pub fn expected_flag(&self, parcel: &ParcelRecord) -> ExpectedFlag {
        let eligible = self.rule.matches(parcel) || self.references.is_emag_club(&parcel.tracking_nr);
        if eligible && !self.references.is_exception(&parcel.tracking_nr) {
            ExpectedFlag::Free
        } else {
            ExpectedFlag::Charged
        }
    }

    pub fn run(&self, parcels: &[ParcelRecord]) -> FreeTransportReport {
        let mut free_should_be = 0;
        let mut discrepancies = Vec::new();

        for parcel in parcels {
            let expected = self.expected_flag(parcel);
            if expected == ExpectedFlag::Free {
                free_should_be += 1;
            }

            if parcel.free_transport != expected.as_str() {
                discrepancies.push(EligibilityDiscrepancy {
                    tracking_nr: parcel.tracking_nr.clone(),
                    carrier_id: parcel.carrier_id.clone(),
                    parcel_type: parcel.parcel_type.clone(),
                    weight: parcel.weight,
                    actual: parcel.free_transport.clone(),
                    expected,
                    is_exception: self.references.is_exception(&parcel.tracking_nr),
                    is_emag_club: self.references.is_emag_club(&parcel.tracking_nr),
                });
            }
        }

        FreeTransportReport {
            exceptions_loaded: self.references.exceptions.len(),
            emag_clubs_loaded: self.references.emag_clubs.len(),
            total_analyzed: parcels.len(),
            free_should_be,
            discrepancies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(tracking: &str, carrier: &str, kind: &str, weight: f64, flag: &str) -> ParcelRecord {
        ParcelRecord {
            tracking_nr: tracking.to_string(),
            username: "shop".to_string(),
            carrier_id: carrier.to_string(),
            parcel_type: kind.to_string(),
            weight,
            price: "0".to_string(),
            dimension_id: "1".to_string(),
            free_dimension_id: "0".to_string(),
            free_transport: flag.to_string(),
        }
    }

    fn references(exceptions: &[&str], clubs: &[&str]) -> ReferenceSets {
        ReferenceSets {
            exceptions: exceptions.iter().map(|value| value.to_string()).collect(),
            emag_clubs: clubs.iter().map(|value| value.to_string()).collect(),
        }
    }

    #[test]
    fn standard_rule_boundaries() {
        let rule = FreeTransportRule::standard();
        assert!(rule.matches(&parcel("A", "24", "point", 20.0, "1")));
        assert!(rule.matches(&parcel("B", "49", "point", 0.0, "1")));
        assert!(!rule.matches(&parcel("C", "41", "point", 20.01, "1")));
        assert!(!rule.matches(&parcel("D", "25", "point", 1.0, "1")));
        assert!(!rule.matches(&parcel("E", "41", "Point", 1.0, "1")));
        assert!(!rule.matches(&parcel("F", "41", "point", f64::NAN, "1")));
    }

    #[test]
    fn emag_club_overrides_rule_and_exception_overrides_both() {
        let refs = references(&["EXC", "BOTH"], &["CLUB", "BOTH"]);
        let audit = FreeTransportAudit::new(FreeTransportRule::standard(), &refs);

        assert_eq!(
            audit.expected_flag(&parcel("CLUB", "99", "home", 50.0, "0")),
            ExpectedFlag::Free
        );
        assert_eq!(
            audit.expected_flag(&parcel("EXC", "24", "point", 1.0, "1")),
            ExpectedFlag::Charged
        );
        assert_eq!(
            audit.expected_flag(&parcel("BOTH", "24", "point", 1.0, "1")),
            ExpectedFlag::Charged
        );
    }

    #[test]
    fn run_counts_and_collects_discrepancies() {
        let refs = references(&["EXC"], &["CLUB"]);
        let audit = FreeTransportAudit::new(FreeTransportRule::standard(), &refs);
        let parcels = vec![
            parcel("OK_FREE", "24", "point", 5.0, "1"),
            parcel("OK_PAID", "24", "home", 5.0, "0"),
            parcel("MISSED", "41", "point", 5.0, "0"),
            parcel("EXC", "49", "point", 5.0, "1"),
            parcel("CLUB", "7", "home", 30.0, ""),
        ];

        let report = audit.run(&parcels);
        assert_eq!(report.total_analyzed, 5);
        assert_eq!(report.free_should_be, 3);
        assert_eq!(report.exceptions_loaded, 1);
        assert_eq!(report.emag_clubs_loaded, 1);

        let flagged: Vec<_> = report
            .discrepancies
            .iter()
            .map(|d| (d.tracking_nr.as_str(), d.actual.as_str(), d.expected.as_str()))
            .collect();
        assert_eq!(
            flagged,
            vec![("MISSED", "0", "1"), ("EXC", "1", "0"), ("CLUB", "", "1")]
        );
        assert!(report.discrepancies[1].is_exception);
        assert!(report.discrepancies[2].is_emag_club);
    }
}
