// src/parse/header.rs
use serde::{Deserialize, Serialize};

/// Groups of substrings that identify a header row.
///
/// A row matches a group when every marker of the group occurs in at least
/// one of its cells; it is a header when any group matches. Empty groups
/// never match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSets(pub Vec<Vec<String>>);

impl Default for MarkerSets {
    fn default() -> Self {
        Self(vec![
            vec!["項番".to_string()],
            vec!["業種".to_string(), "案件名".to_string()],
        ])
    }
}

impl MarkerSets {
    pub fn matches(&self, cells: &[String]) -> bool {
        self.0.iter().any(|group| {
            !group.is_empty()
                && group
                    .iter()
                    .all(|marker| cells.iter().any(|cell| cell.contains(marker.as_str())))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|g| g.is_empty())
    }
}

/// Index of the first row among the first `max_scan` rows that matches `markers`.
pub fn detect_header(
    rows: &[Vec<String>],
    max_scan: usize,
    markers: &MarkerSets,
) -> Option<usize> {
    rows.iter()
        .take(max_scan)
        .position(|cells| markers.matches(cells))
}
