use chrono::{DateTime, Utc};
use clap::ValueEnum;
use genius_control::audits::{FreeDimensionReport, FreeTransportReport, PriceAuditReport};
use genius_control::error::AppError;
use genius_control::reference::ReferenceSets;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width console report
    #[default]
    Text,
    /// Pretty-printed JSON document per audit
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a, T: Serialize> {
    audit: &'static str,
    generated_at: DateTime<Utc>,
    report: &'a T,
}

pub(crate) fn json<W: Write, T: Serialize>(
    out: &mut W,
    audit: &'static str,
    report: &T,
) -> Result<(), AppError> {
    let document = JsonReport {
        audit,
        generated_at: Utc::now(),
        report,
    };
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn price_banner<W: Write>(out: &mut W, username: &str) -> std::io::Result<()> {
    writeln!(out, "Starting price analysis for user '{username}'...")
}

pub(crate) fn price_report<W: Write>(out: &mut W, report: &PriceAuditReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<10} | {:<8} | {:<10} | {:<5} | Prices found",
        "Weight", "Carrier", "Type", "Free"
    )?;
    writeln!(out, "{}", "-".repeat(65))?;

    for deviation in &report.deviations {
        let key = &deviation.key;
        writeln!(
            out,
            "{:<10} | {:<8} | {:<10} | {:<5} | {}",
            key.weight_label(),
            key.carrier_id,
            key.parcel_type,
            key.free_transport,
            deviation.prices.join(", ")
        )?;

        for bucket in &deviation.buckets {
            writeln!(out, "  Price: {} ({} parcels)", bucket.price, bucket.parcels)?;
            let dimensions: Vec<&str> = bucket.dimensions.iter().map(String::as_str).collect();
            writeln!(out, "    Dimensions: {}", dimensions.join(", "))?;
            writeln!(out, "    Examples: {}", bucket.examples.join(", "))?;
        }
        writeln!(out)?;
    }

    if !report.has_deviations() {
        writeln!(
            out,
            "No price deviations found for user '{}' based on the specified criteria.",
            report.username
        )?;
    }

    Ok(())
}

pub(crate) fn free_dimension_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Checking free_dimension_id alignment...")
}

pub(crate) fn free_dimension_report<W: Write>(
    out: &mut W,
    report: &FreeDimensionReport,
    limit: usize,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Total parcels with free_dimension_id=1: {}",
        report.free_dimension_parcels
    )?;

    if report.is_aligned() {
        writeln!(
            out,
            "Success: All parcels with free_dimension_id=1 have free_transport=1."
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "Found {} parcels with free_dimension_id=1 BUT free_transport NOT equal to 1.",
        report.mismatches.len()
    )?;
    writeln!(out, "\nDiscrepancies:")?;
    writeln!(
        out,
        "{:<25} | {:<15} | Free Transport",
        "Tracking Nr", "Username"
    )?;
    writeln!(out, "{}", "-".repeat(60))?;
    for mismatch in report.mismatches.iter().take(limit) {
        writeln!(
            out,
            "{:<25} | {:<15} | {}",
            mismatch.tracking_nr, mismatch.username, mismatch.free_transport
        )?;
    }

    if report.mismatches.len() > limit {
        writeln!(out, "... and {} more.", report.mismatches.len() - limit)?;
    }

    Ok(())
}

pub(crate) fn loading_banner<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Loading data...")
}

pub(crate) fn reference_counts<W: Write>(
    out: &mut W,
    references: &ReferenceSets,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Loaded {} unique tracking numbers as exceptions.",
        references.exceptions.len()
    )?;
    writeln!(
        out,
        "Loaded {} tracking numbers from eMag Club list.",
        references.emag_clubs.len()
    )?;
    writeln!(out, "Analyzing parcels...")
}

pub(crate) fn free_transport_report<W: Write>(
    out: &mut W,
    report: &FreeTransportReport,
    limit: usize,
) -> std::io::Result<()> {
    writeln!(out, "\nAnalysis Summary:")?;
    writeln!(out, "Total parcels analyzed: {}", report.total_analyzed)?;
    writeln!(out, "Parcels that should be free: {}", report.free_should_be)?;
    writeln!(out, "Discrepancies found: {}", report.discrepancies.len())?;

    if report.discrepancies.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nFirst {limit} discrepancies:")?;
    let header = format!(
        "{:<25} | {:<3} | {:<3} | {:<5} | {:<5}",
        "Tracking Nr", "Act", "Exp", "Exc", "Club"
    );
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;
    for discrepancy in report.discrepancies.iter().take(limit) {
        writeln!(
            out,
            "{:<25} | {:<3} | {:<3} | {:<5} | {:<5}",
            discrepancy.tracking_nr,
            discrepancy.actual,
            discrepancy.expected.as_str(),
            bool_label(discrepancy.is_exception),
            bool_label(discrepancy.is_emag_club)
        )?;
    }

    Ok(())
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genius_control::audits::{
        EligibilityDiscrepancy, ExpectedFlag, FreeDimensionMismatch, PriceBucket,
        PriceDeviation, PriceGroupKey,
    };
    use std::collections::BTreeSet;

    fn rendered(render: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buffer = Vec::new();
        render(&mut buffer).expect("render succeeds");
        String::from_utf8(buffer).expect("utf8 output")
    }

    #[test]
    fn price_report_prints_groups_and_buckets() {
        let report = PriceAuditReport {
            username: "Apgo".to_string(),
            parcels_matched: 3,
            groups_checked: 1,
            deviations: vec![PriceDeviation {
                key: PriceGroupKey {
                    weight: 2.0,
                    carrier_id: "24".to_string(),
                    parcel_type: "point".to_string(),
                    free_transport: "0".to_string(),
                },
                prices: vec!["10.00".to_string(), "9.50".to_string()],
                buckets: vec![
                    PriceBucket {
                        price: "9.50".to_string(),
                        parcels: 2,
                        dimensions: BTreeSet::from(["5".to_string(), "7".to_string()]),
                        examples: vec!["T1".to_string(), "T2".to_string()],
                    },
                    PriceBucket {
                        price: "10.00".to_string(),
                        parcels: 1,
                        dimensions: BTreeSet::from(["6".to_string()]),
                        examples: vec!["T3".to_string()],
                    },
                ],
            }],
        };

        let output = rendered(|out| price_report(out, &report));
        let expected = format!(
            "Weight     | Carrier  | Type       | Free  | Prices found\n{}\n\
2.0        | 24       | point      | 0     | 10.00, 9.50\n\
\x20 Price: 9.50 (2 parcels)\n\
\x20   Dimensions: 5, 7\n\
\x20   Examples: T1, T2\n\
\x20 Price: 10.00 (1 parcels)\n\
\x20   Dimensions: 6\n\
\x20   Examples: T3\n\n",
            "-".repeat(65)
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn price_report_without_deviations_prints_header_and_notice() {
        let report = PriceAuditReport {
            username: "Apgo".to_string(),
            parcels_matched: 0,
            groups_checked: 0,
            deviations: Vec::new(),
        };

        let output = rendered(|out| price_report(out, &report));
        assert!(output.starts_with("Weight     | Carrier"));
        assert!(output.ends_with(
            "No price deviations found for user 'Apgo' based on the specified criteria.\n"
        ));
    }

    #[test]
    fn free_dimension_report_truncates_to_limit() {
        let report = FreeDimensionReport {
            free_dimension_parcels: 4,
            mismatches: (0..3)
                .map(|index| FreeDimensionMismatch {
                    tracking_nr: format!("TRK{index}"),
                    username: "shop".to_string(),
                    free_transport: "0".to_string(),
                })
                .collect(),
        };

        let output = rendered(|out| free_dimension_report(out, &report, 2));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Total parcels with free_dimension_id=1: 4");
        assert_eq!(
            lines[1],
            "Found 3 parcels with free_dimension_id=1 BUT free_transport NOT equal to 1."
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Discrepancies:");
        assert_eq!(lines[4], "Tracking Nr               | Username        | Free Transport");
        assert_eq!(lines[5], "-".repeat(60));
        assert_eq!(lines[6], "TRK0                      | shop            | 0");
        assert_eq!(lines[8], "... and 1 more.");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn free_dimension_report_success_line() {
        let report = FreeDimensionReport {
            free_dimension_parcels: 2,
            mismatches: Vec::new(),
        };
        let output = rendered(|out| free_dimension_report(out, &report, 20));
        assert_eq!(
            output,
            "Total parcels with free_dimension_id=1: 2\n\
Success: All parcels with free_dimension_id=1 have free_transport=1.\n"
        );
    }

    #[test]
    fn free_transport_report_prints_summary_and_table() {
        let report = FreeTransportReport {
            exceptions_loaded: 1,
            emag_clubs_loaded: 1,
            total_analyzed: 3,
            free_should_be: 2,
            discrepancies: vec![EligibilityDiscrepancy {
                tracking_nr: "TRK1".to_string(),
                carrier_id: "24".to_string(),
                parcel_type: "point".to_string(),
                weight: 1.0,
                actual: "0".to_string(),
                expected: ExpectedFlag::Free,
                is_exception: false,
                is_emag_club: true,
            }],
        };

        let output = rendered(|out| free_transport_report(out, &report, 20));
        let header = "Tracking Nr               | Act | Exp | Exc   | Club ";
        let expected = format!(
            "\nAnalysis Summary:\nTotal parcels analyzed: 3\nParcels that should be free: 2\n\
Discrepancies found: 1\n\nFirst 20 discrepancies:\n{header}\n{}\n\
TRK1                      | 0   | 1   | False | True \n",
            "-".repeat(53)
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn free_transport_report_omits_table_without_discrepancies() {
        let report = FreeTransportReport {
            exceptions_loaded: 0,
            emag_clubs_loaded: 0,
            total_analyzed: 1,
            free_should_be: 0,
            discrepancies: Vec::new(),
        };
        let output = rendered(|out| free_transport_report(out, &report, 20));
        assert!(output.ends_with("Discrepancies found: 0\n"));
    }

    #[test]
    fn json_wraps_report_with_audit_name() {
        let report = FreeDimensionReport {
            free_dimension_parcels: 0,
            mismatches: Vec::new(),
        };
        let mut buffer = Vec::new();
        json(&mut buffer, "free-dimensions", &report).expect("json renders");

        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["audit"], "free-dimensions");
        assert_eq!(value["report"]["free_dimension_parcels"], 0);
        assert!(value["generated_at"].is_string());
    }
}
