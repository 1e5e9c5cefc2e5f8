// src/parse/table.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::header::{detect_header, MarkerSets};
use super::line::{is_blank_row, parse_line};
use super::lines::{split_lines, LineMode};
use crate::record::Record;

pub const DEFAULT_MAX_SCAN: usize = 10;

fn default_max_scan() -> usize {
    DEFAULT_MAX_SCAN
}

/// Where the header row comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HeaderMode {
    /// The first non-blank line.
    #[default]
    Fixed,
    /// The first line within `max_scan` lines that matches `markers`.
    Detect {
        #[serde(default = "default_max_scan")]
        max_scan: usize,
        #[serde(default)]
        markers: MarkerSets,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableOptions {
    pub header: HeaderMode,
    pub line_mode: LineMode,
    /// A row becomes a record only if one of these columns is non-empty.
    /// An empty list keeps every non-blank row.
    pub identity: Vec<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            header: HeaderMode::Fixed,
            line_mode: LineMode::Physical,
            identity: vec!["項番".to_string()],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// 1-based source line of the header row; `None` when no header was found.
    pub header_line: Option<usize>,
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

/// Parse CSV text into records. Never fails; oddly shaped input yields
/// best-effort records or none at all.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = text.len()))]
pub fn parse_table(text: &str, opts: &TableOptions) -> Table {
    // Spreadsheet exports saved to disk often carry a UTF-8 BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines = split_lines(text, opts.line_mode);
    if lines.is_empty() {
        debug!("no non-blank lines");
        return Table::default();
    }
    let rows: Vec<Vec<String>> = lines.iter().map(|l| parse_line(l.text)).collect();

    let header_idx = match &opts.header {
        HeaderMode::Fixed => 0,
        HeaderMode::Detect { max_scan, markers } => {
            match detect_header(&rows, *max_scan, markers) {
                Some(i) => i,
                None => {
                    warn!(
                        scanned = rows.len().min(*max_scan),
                        "header row not found; treating sheet as empty"
                    );
                    return Table::default();
                }
            }
        }
    };
    let header = rows[header_idx].clone();
    debug!(line = lines[header_idx].number, columns = header.len(), "header row");

    let mut records = Vec::new();
    for (line, cells) in lines.iter().zip(&rows).skip(header_idx + 1) {
        if is_blank_row(cells) {
            continue;
        }
        let fields = zip_fields(&header, cells);
        if !is_identified(&fields, &opts.identity) {
            debug!(line = line.number, "row has no identity value; skipped");
            continue;
        }
        records.push(Record {
            line: line.number,
            index: records.len() + 1,
            fields,
        });
    }

    Table {
        header_line: Some(lines[header_idx].number),
        header,
        records,
    }
}

/// Pair header cells with values by position. Blank header cells are
/// skipped, missing values become `""` and a repeated column name keeps the
/// value of its last occurrence.
fn zip_fields(header: &[String], cells: &[String]) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for (i, name) in header.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        let value = cells.get(i).cloned().unwrap_or_default();
        fields.insert(name.clone(), value);
    }
    fields
}

fn is_identified(fields: &BTreeMap<String, String>, identity: &[String]) -> bool {
    identity.is_empty()
        || identity
            .iter()
            .any(|k| fields.get(k).is_some_and(|v| !v.trim().is_empty()))
}
