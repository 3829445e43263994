//! Rule evaluators over the parcel export.
//!
//! Each audit is a pure function of the loaded rows (and, for free transport,
//! the reference sets) and returns a serializable report.

pub mod eligibility;
pub mod free_dimension;
pub mod pricing;

pub use eligibility::{
    EligibilityDiscrepancy, ExpectedFlag, FreeTransportAudit, FreeTransportReport,
    FreeTransportRule,
};
pub use free_dimension::{FreeDimensionAudit, FreeDimensionMismatch, FreeDimensionReport};
pub use pricing::{
    PriceAuditReport, PriceBucket, PriceConsistencyAudit, PriceDeviation, PriceGroupKey,
};
