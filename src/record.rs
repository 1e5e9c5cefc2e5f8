// src/record.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One spreadsheet row keyed by its header cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 1-based line number of the row in the source text.
    pub line: usize,
    /// 1-based position among retained records.
    pub index: usize,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// First candidate column whose value is non-empty after trimming.
    pub fn first_of<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&str> {
        candidates
            .iter()
            .filter_map(|c| self.get(c.as_ref()))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    pub fn resolve(&self, fields: &FieldMap, field: Field) -> Option<&str> {
        self.first_of(fields.candidates(field))
    }
}

/// Logical attributes a project card is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Sequence,
    Title,
    Period,
    Headcount,
    Industry,
    Role,
    Technologies,
    Work,
    Phase,
}

/// Ordered candidate column names per logical attribute.
///
/// Source sheets do not agree on header wording, so each attribute resolves
/// to the first candidate with a non-empty value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMap {
    pub sequence: Vec<String>,
    pub title: Vec<String>,
    pub period: Vec<String>,
    pub headcount: Vec<String>,
    pub industry: Vec<String>,
    pub role: Vec<String>,
    pub technologies: Vec<String>,
    pub work: Vec<String>,
    pub phase: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            sequence: names(&["項番", "No", "No."]),
            title: names(&["案件名", "プロジェクト名", "PJ名"]),
            period: names(&["期間", "作業期間"]),
            headcount: names(&["人数", "規模"]),
            industry: names(&["業種"]),
            role: names(&["役割", "担当"]),
            technologies: names(&["使用技術", "技術", "言語"]),
            work: names(&["作業内容", "業務内容"]),
            phase: names(&["担当フェーズ", "フェーズ"]),
        }
    }
}

impl FieldMap {
    pub fn candidates(&self, field: Field) -> &[String] {
        match field {
            Field::Sequence => &self.sequence,
            Field::Title => &self.title,
            Field::Period => &self.period,
            Field::Headcount => &self.headcount,
            Field::Industry => &self.industry,
            Field::Role => &self.role,
            Field::Technologies => &self.technologies,
            Field::Work => &self.work,
            Field::Phase => &self.phase,
        }
    }
}
