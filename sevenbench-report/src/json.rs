//! JSON Output

use crate::record::RunRecord;

/// Serialize one run record as prettified JSON.
pub fn generate_json(record: &RunRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}
