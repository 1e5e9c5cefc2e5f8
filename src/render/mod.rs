// src/render/mod.rs
//! HTML fragments for project cards. Every value taken from the sheet goes
//! through [`escape_html`] before it is concatenated.

pub mod page;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::record::{Field, FieldMap, Record};

pub use page::{Loading, Page};

pub const NO_TITLE: &str = "案件名なし";
pub const NO_PERIOD: &str = "期間未定";
pub const NO_VALUE: &str = "-";
pub const NO_DATA: &str = "プロジェクトデータがありません。";

/// Newlines, literal `\n` sequences and half/full-width commas.
static TECH_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n|\\n|[、,，]").expect("technology delimiter regex"));
/// Newlines and literal `\n` sequences only.
static LINE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n|\\n").expect("line delimiter regex"));

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Omit meta items with no value instead of showing a placeholder.
    pub hide_missing_meta: bool,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split a multi-valued cell, dropping blank and `-` entries.
fn split_items<'a>(value: &'a str, delims: &Regex) -> Vec<&'a str> {
    delims
        .split(value)
        .map(str::trim)
        .filter(|item| !item.is_empty() && *item != NO_VALUE)
        .collect()
}

pub fn technologies<'a>(record: &'a Record, fields: &FieldMap) -> Vec<&'a str> {
    record
        .resolve(fields, Field::Technologies)
        .map(|v| split_items(v, &TECH_SPLIT))
        .unwrap_or_default()
}

pub fn line_items<'a>(record: &'a Record, fields: &FieldMap, field: Field) -> Vec<&'a str> {
    record
        .resolve(fields, field)
        .map(|v| split_items(v, &LINE_SPLIT))
        .unwrap_or_default()
}

fn push_meta(
    out: &mut String,
    icon: &str,
    value: Option<&str>,
    placeholder: &str,
    suffix: &str,
    hide_missing: bool,
) {
    let text = match value {
        Some(v) => escape_html(v),
        None if hide_missing => return,
        None => escape_html(placeholder),
    };
    out.push_str("<span>");
    out.push_str(icon);
    out.push(' ');
    out.push_str(&text);
    out.push_str(suffix);
    out.push_str("</span>");
}

fn push_list_section(out: &mut String, heading: &str, class: &str, items: &[&str]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("<h4>{}</h4><ul class=\"{}\">", heading, class));
    for item in items {
        out.push_str(&format!("<li>{}</li>", escape_html(item)));
    }
    out.push_str("</ul>");
}

/// One `<div class="project">` card.
pub fn render_project(record: &Record, fields: &FieldMap, opts: &RenderOptions) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(&format!(
        "<div class=\"project\" data-index=\"{}\" data-line=\"{}\">",
        escape_html(&record.index.to_string()),
        escape_html(&record.line.to_string()),
    ));

    let title = record.resolve(fields, Field::Title).unwrap_or(NO_TITLE);
    out.push_str(&format!("<h3>{}</h3>", escape_html(title)));

    let hide = opts.hide_missing_meta;
    out.push_str("<div class=\"project-meta\">");
    push_meta(&mut out, "📅", record.resolve(fields, Field::Period), NO_PERIOD, "", hide);
    push_meta(&mut out, "👥", record.resolve(fields, Field::Headcount), NO_VALUE, "人", hide);
    push_meta(&mut out, "🏢", record.resolve(fields, Field::Industry), NO_VALUE, "", hide);
    push_meta(&mut out, "💼", record.resolve(fields, Field::Role), NO_VALUE, "", hide);
    out.push_str("</div>");

    let tech = technologies(record, fields);
    if !tech.is_empty() {
        out.push_str("<h4>使用技術</h4><div class=\"tech-stack\">");
        for t in &tech {
            out.push_str(&format!("<span class=\"tech-badge\">{}</span>", escape_html(t)));
        }
        out.push_str("</div>");
    }

    push_list_section(&mut out, "作業内容", "work-items", &line_items(record, fields, Field::Work));
    push_list_section(&mut out, "担当フェーズ", "phases", &line_items(record, fields, Field::Phase));

    out.push_str("</div>");
    out
}

/// Markup for the projects container; a "no data" notice when `records` is empty.
pub fn render_projects(records: &[Record], fields: &FieldMap, opts: &RenderOptions) -> String {
    if records.is_empty() {
        return format!("<p class=\"no-data\">{}</p>", NO_DATA);
    }
    records
        .iter()
        .map(|r| render_project(r, fields, opts))
        .collect::<Vec<_>>()
        .join("\n")
}
