// src/pipeline.rs
//! One load cycle: fetch → parse → filter → render. Load errors are caught
//! here, once, and become the failure state of the returned [`Page`].

use anyhow::{Context, Result};
use reqwest::Client;
use std::fs;
use tracing::{error, info};

use crate::config::{Config, OutputConfig};
use crate::fetch;
use crate::filter::filter_range;
use crate::parse::parse_table;
use crate::record::Record;
use crate::render::{render_projects, Page};

/// Records that survive parsing and the display range.
pub fn select_records(csv: &str, config: &Config) -> Vec<Record> {
    let table = parse_table(csv, &config.table_options());
    info!(
        header_line = ?table.header_line,
        records = table.records.len(),
        "parsed sheet"
    );
    filter_range(
        table.records,
        &config.range,
        &config.fields.sequence,
        config.non_numeric,
    )
}

/// Projects container markup for `csv`.
pub fn render_csv(csv: &str, config: &Config) -> String {
    let records = select_records(csv, config);
    info!(displayed = records.len(), "rendering projects");
    render_projects(&records, &config.fields, &config.render)
}

async fn load_projects(client: &Client, config: &Config) -> Result<String> {
    let source = config.source()?;
    let csv = fetch::load_source(client, &source).await?;
    Ok(render_csv(&csv, config))
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn load_page(client: &Client, config: &Config) -> Page {
    match load_projects(client, config).await {
        Ok(markup) => Page::loaded(markup),
        Err(e) => {
            error!(error = %format!("{:#}", e), "データの読み込みエラー");
            Page::failed(&e)
        }
    }
}

/// Final output text for `page` according to the output settings.
pub fn compose_output(page: &Page, output: &OutputConfig) -> Result<String> {
    if output.fragment {
        return Ok(page.to_fragment());
    }
    match &output.template {
        Some(path) => {
            let template = fs::read_to_string(path)
                .with_context(|| format!("reading template {}", path.display()))?;
            Ok(page.apply_template(&template))
        }
        None => Ok(page.to_document(&output.title)),
    }
}
