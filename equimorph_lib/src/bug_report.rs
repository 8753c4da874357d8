//! The `bug_report` module contains the JSON report format produced by an analyzer run
//! and consumed by the guided selection strategy.

use crate::error::EquimorphError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An analyzer's verdict for one input program: whether it flagged any bugs, and the
/// 1-based source lines it flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    /// True when the analyzer reported at least one bug.
    pub has_bugs: bool,
    /// The 1-based line numbers the analyzer flagged.
    pub lines: Vec<i64>,
}

impl BugReport {
    /// Create a report, rejecting non-positive line numbers.
    ///
    /// # Arguments
    ///
    /// * `has_bugs` - Whether the analyzer reported bugs.
    /// * `lines` - The flagged 1-based line numbers.
    pub fn new(has_bugs: bool, lines: Vec<i64>) -> Result<BugReport, EquimorphError> {
        let report = BugReport { has_bugs, lines };
        report.validate()?;
        Ok(report)
    }

    /// Check the report's internal consistency.
    pub fn validate(&self) -> Result<(), EquimorphError> {
        for line in &self.lines {
            if *line <= 0 {
                return Err(EquimorphError::InvalidArgument(format!(
                    "bug report line numbers must be positive, found {}",
                    line
                )));
            }
        }
        if self.has_bugs && self.lines.is_empty() {
            return Err(EquimorphError::InvalidArgument(String::from(
                "bug report claims bugs but lists no lines",
            )));
        }
        Ok(())
    }

    /// Load and validate a report from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the JSON report.
    pub fn from_file(path: &Path) -> Result<BugReport, EquimorphError> {
        let text = std::fs::read_to_string(path)?;
        let report: BugReport = serde_json::from_str(&text)?;
        report.validate()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive_lines() {
        assert!(BugReport::new(true, vec![3, 0]).is_err());
        assert!(BugReport::new(true, vec![-1]).is_err());
        assert!(BugReport::new(true, vec![3, 7]).is_ok());
    }

    #[test]
    fn test_new_rejects_bugs_without_lines() {
        assert!(BugReport::new(true, vec![]).is_err());
        assert!(BugReport::new(false, vec![]).is_ok());
    }

    #[test]
    fn test_deserializes_camel_case() {
        let report: BugReport =
            serde_json::from_str("{\"hasBugs\": true, \"lines\": [4, 12]}").unwrap();
        assert!(report.has_bugs);
        assert_eq!(report.lines, vec![4, 12]);
    }
}
