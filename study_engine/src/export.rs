//! Calendar export seam.
//!
//! Rendering calendar files is left to a collaborator; the contract is the
//! plan record shape `{date, topic, hours}` with ISO 8601 dates.

use learning_records::StudyPlanEntry;

use crate::error::ExportError;

/// Turns a study plan into a downloadable document.
pub trait CalendarExport {
    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    fn export(&self, plan: &[StudyPlanEntry]) -> Result<Vec<u8>, ExportError>;
}

/// Exports the plan as a JSON array of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPlanExport {
    pub pretty: bool,
}

impl CalendarExport for JsonPlanExport {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn export(&self, plan: &[StudyPlanEntry]) -> Result<Vec<u8>, ExportError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(plan)?
        } else {
            serde_json::to_vec(plan)?
        };
        Ok(bytes)
    }
}
