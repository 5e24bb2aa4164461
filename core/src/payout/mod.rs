/// Transfer-list finalization: payout threshold, exclusions and pay-to
/// address substitutions applied to aggregated transactions.

pub mod finalizer;

pub use finalizer::{finalize, PayTo, SubstitutionRule, SubstitutionTable, EXCLUDE_MARKER};
