//! Workbook sheets: the backend contract and the sheet-name resolution
//! heuristic shared by every "detect the right sheet for concept X" caller.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata for one sheet of the loaded workbook, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSheet {
    pub id: String,
    pub name: String,
    pub row_count: u64,
    pub column_count: u64,
    /// Last modification time (ISO 8601 format).
    pub last_modified: String,
}

/// Keywords identifying an incident sheet, in priority order.
pub const INCIDENT_KEYWORDS: &[&str] = &["incident", "incidents"];

/// Keywords identifying a hazard sheet, in priority order.
pub const HAZARD_KEYWORDS: &[&str] = &["hazard", "hazards"];

/// Resolves a sheet name from a keyword set.
///
/// Two phases, both case-insensitive and order-preserving over `keywords`:
/// first an exact match, then a substring match. The first hit wins. Returns
/// `None` when neither phase matches; callers chain keyword sets and fall
/// back to the first available name.
pub fn resolve_sheet_name<'a>(keywords: &[&str], names: &'a [String]) -> Option<&'a str> {
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if let Some(name) = names.iter().find(|n| n.to_lowercase() == keyword) {
            return Some(name);
        }
    }
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if let Some(name) = names.iter().find(|n| n.to_lowercase().contains(&keyword)) {
            return Some(name);
        }
    }
    None
}

/// Picks the default sheet for agent questions: incidents first, hazards
/// second, otherwise the first available sheet.
pub fn default_sheet(names: &[String]) -> Option<&str> {
    resolve_sheet_name(INCIDENT_KEYWORDS, names)
        .or_else(|| resolve_sheet_name(HAZARD_KEYWORDS, names))
        .or_else(|| names.first().map(String::as_str))
}

/// An abstract client for the workbook service.
///
/// Exposes whether a dataset is loaded (via the sheet list) and the bundled
/// example-dataset bootstrap the pipeline's auto-recovery relies on.
#[async_trait]
pub trait WorkbookBackend: Send + Sync {
    /// Lists the sheets of the currently loaded workbook.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<WorkbookSheet>)`: Available sheets (empty when no workbook
    ///   is loaded)
    /// - `Err(_)`: Backend or transport failure
    async fn list_sheets(&self) -> Result<Vec<WorkbookSheet>>;

    /// Loads the bundled example dataset into the workbook service.
    ///
    /// # Arguments
    ///
    /// * `example_type` - Optional example variant to load
    async fn load_example(&self, example_type: Option<&str>) -> Result<()>;

    /// Discards the currently loaded workbook.
    async fn reset(&self) -> Result<()>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substring_match_when_no_exact_match() {
        let available = names(&["Audit Log", "Incidents 2024", "Hazard Register"]);
        assert_eq!(
            resolve_sheet_name(INCIDENT_KEYWORDS, &available),
            Some("Incidents 2024")
        );
    }

    #[test]
    fn test_exact_match_wins_over_substring() {
        let available = names(&["INCIDENT", "Hazards"]);
        assert_eq!(
            resolve_sheet_name(INCIDENT_KEYWORDS, &available),
            Some("INCIDENT")
        );
    }

    #[test]
    fn test_keyword_order_is_priority_order() {
        // "incident" precedes "incidents", so its exact match is preferred
        // even though a later keyword also matches exactly.
        let available = names(&["Incidents", "Incident"]);
        assert_eq!(
            resolve_sheet_name(INCIDENT_KEYWORDS, &available),
            Some("Incident")
        );
    }

    #[test]
    fn test_no_match_yields_none() {
        let available = names(&["Audit Log", "Training"]);
        assert_eq!(resolve_sheet_name(INCIDENT_KEYWORDS, &available), None);
    }

    #[test]
    fn test_default_sheet_priority() {
        let available = names(&["Audit Log", "Hazard Register"]);
        assert_eq!(default_sheet(&available), Some("Hazard Register"));

        let available = names(&["Audit Log", "Training"]);
        assert_eq!(default_sheet(&available), Some("Audit Log"));

        assert_eq!(default_sheet(&[]), None);
    }
}
