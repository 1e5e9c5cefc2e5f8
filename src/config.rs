// src/config.rs
//! Run configuration: an optional YAML file, then `SHEETFOLIO_*` environment
//! overrides. Every field has a default that reproduces the original page.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

use crate::fetch::{is_valid_id, Source};
use crate::filter::{DisplayRange, NonNumericPolicy};
use crate::parse::{HeaderMode, LineMode, TableOptions};
use crate::record::FieldMap;
use crate::render::RenderOptions;

pub const CONFIG_ENV: &str = "SHEETFOLIO_CONFIG";
const ENV_PREFIX: &str = "SHEETFOLIO_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub spreadsheet_id: String,
    pub sheet_id: String,
    /// Explicit CSV URL; takes precedence over the ids.
    pub url: Option<String>,
    /// Local CSV file; takes precedence over everything else.
    pub file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1iwP323oeDeCseDJpslj07ulrQT77lSF6".to_string(),
            sheet_id: "228151703".to_string(),
            url: None,
            file: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Write here instead of stdout.
    pub path: Option<PathBuf>,
    /// HTML template with `{{loading}}` and `{{projects}}` placeholders.
    pub template: Option<PathBuf>,
    /// Emit only the two containers, no document wrapper.
    pub fragment: bool,
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            template: None,
            fragment: false,
            title: "プロジェクト経歴".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub range: DisplayRange,
    pub non_numeric: NonNumericPolicy,
    pub header: HeaderMode,
    pub line_mode: LineMode,
    /// Columns of which at least one must be non-empty for a row to count.
    pub identity: Vec<String>,
    pub fields: FieldMap,
    pub render: RenderOptions,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            range: DisplayRange::default(),
            non_numeric: NonNumericPolicy::default(),
            header: HeaderMode::default(),
            line_mode: LineMode::default(),
            identity: vec!["項番".to_string()],
            fields: FieldMap::default(),
            render: RenderOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing YAML config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// File (argument, else `SHEETFOLIO_CONFIG`, else defaults), then
    /// environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.or(from_env.as_deref()) {
            Some(p) => {
                info!(path = %p.display(), "loading config");
                Self::from_file(p)?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SPREADSHEET_ID`, `SHEET_ID`, `RANGE_START`, `RANGE_END` and
    /// `CSV_FILE` from `lookup`. A blank range value clears that bound.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SPREADSHEET_ID") {
            self.source.spreadsheet_id = v;
        }
        if let Some(v) = lookup("SHEET_ID") {
            self.source.sheet_id = v;
        }
        if let Some(v) = lookup("RANGE_START") {
            self.range.start = parse_bound("RANGE_START", &v)?;
        }
        if let Some(v) = lookup("RANGE_END") {
            self.range.end = parse_bound("RANGE_END", &v)?;
        }
        if let Some(v) = lookup("CSV_FILE") {
            self.source.file = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.range.start, self.range.end) {
            if start > end {
                bail!("display range start {} is greater than end {}", start, end);
            }
        }
        if self.source.file.is_none() && self.source.url.is_none() {
            for (name, id) in [
                ("spreadsheet_id", &self.source.spreadsheet_id),
                ("sheet_id", &self.source.sheet_id),
            ] {
                if id.trim().is_empty() {
                    bail!("source.{} must not be empty", name);
                }
                if !is_valid_id(id) {
                    bail!(
                        "source.{} may only contain letters, digits, '-' and '_': {:?}",
                        name,
                        id
                    );
                }
            }
        }
        if let HeaderMode::Detect { max_scan, markers } = &self.header {
            if *max_scan == 0 {
                bail!("header.max_scan must be at least 1");
            }
            if markers.is_empty() {
                bail!("header.markers must contain at least one marker");
            }
        }
        Ok(())
    }

    pub fn source(&self) -> Result<Source> {
        if let Some(path) = &self.source.file {
            return Ok(Source::File(path.clone()));
        }
        if let Some(raw) = &self.source.url {
            let url = Url::parse(raw).with_context(|| format!("invalid source.url {}", raw))?;
            return Ok(Source::Url(url));
        }
        Ok(Source::Published {
            spreadsheet_id: self.source.spreadsheet_id.clone(),
            sheet_id: self.source.sheet_id.clone(),
        })
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            header: self.header.clone(),
            line_mode: self.line_mode,
            identity: self.identity.clone(),
        }
    }
}

fn parse_bound(key: &str, raw: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .with_context(|| format!("{}{} is not an integer: {}", ENV_PREFIX, key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::MarkerSets;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_reproduce_original_page() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.header, HeaderMode::Fixed);
        assert!(config.range.is_unbounded());
        assert_eq!(config.identity, vec!["項番"]);
        assert_eq!(
            config.source().unwrap().url().unwrap().unwrap().as_str(),
            "https://docs.google.com/spreadsheets/d/1iwP323oeDeCseDJpslj07ulrQT77lSF6/export?format=csv&gid=228151703"
        );
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let yaml = r#"
source:
  spreadsheet_id: sheet-abc
  sheet_id: "7"
range:
  start: 3
header:
  mode: detect
  max_scan: 30
  markers:
    - [項番]
    - [業種, プロジェクト名]
non_numeric: include
line_mode: quote_aware
identity: [項番, 案件名]
render:
  hide_missing_meta: true
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.source.spreadsheet_id, "sheet-abc");
        assert_eq!(config.range, DisplayRange::new(Some(3), None));
        assert_eq!(config.non_numeric, NonNumericPolicy::Include);
        assert_eq!(config.line_mode, LineMode::QuoteAware);
        assert!(config.render.hide_missing_meta);
        assert_eq!(
            config.header,
            HeaderMode::Detect {
                max_scan: 30,
                markers: MarkerSets(vec![
                    vec!["項番".to_string()],
                    vec!["業種".to_string(), "プロジェクト名".to_string()],
                ]),
            }
        );
        assert_eq!(config.fields, FieldMap::default());
        assert_eq!(config.output.title, OutputConfig::default().title);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml_str("sources: {}\n").is_err());
    }

    #[test]
    fn reads_config_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "output:\n  fragment: true")?;
        let config = Config::from_file(file.path())?;
        assert!(config.output.fragment);
        Ok(())
    }

    #[test]
    fn environment_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup_from(&[
                ("SPREADSHEET_ID", "other"),
                ("SHEET_ID", "0"),
                ("RANGE_START", " 2 "),
                ("RANGE_END", "5"),
                ("CSV_FILE", "local.csv"),
            ]))
            .unwrap();
        assert_eq!(config.source.spreadsheet_id, "other");
        assert_eq!(config.range, DisplayRange::new(Some(2), Some(5)));
        assert_eq!(config.source().unwrap(), Source::File("local.csv".into()));
    }

    #[test]
    fn blank_bound_clears_and_garbage_fails() {
        let mut config = Config::default();
        config.range = DisplayRange::new(Some(1), Some(9));
        config
            .apply_overrides(lookup_from(&[("RANGE_END", "")]))
            .unwrap();
        assert_eq!(config.range, DisplayRange::new(Some(1), None));
        assert!(config
            .apply_overrides(lookup_from(&[("RANGE_START", "one")]))
            .is_err());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.range = DisplayRange::new(Some(5), Some(2));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.sheet_id = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.header = HeaderMode::Detect {
            max_scan: 0,
            markers: MarkerSets::default(),
        };
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.header = HeaderMode::Detect {
            max_scan: 10,
            markers: MarkerSets(vec![]),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_ids_that_are_not_plain_tokens() {
        for id in ["..", "abc?x=1", "a/b", "x y"] {
            let mut config = Config::default();
            config.source.spreadsheet_id = id.to_string();
            assert!(config.validate().is_err(), "{id:?}");
        }
        let mut config = Config::default();
        config.source.sheet_id = "0#top".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn url_source_takes_precedence_over_ids() {
        let mut config = Config::default();
        config.source.url = Some("http://localhost:9/sheet.csv".to_string());
        config.source.spreadsheet_id.clear();
        config.validate().unwrap();
        assert!(matches!(config.source().unwrap(), Source::Url(_)));
    }
}
