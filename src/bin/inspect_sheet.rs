use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use sheetfolio::{
    config::Config,
    fetch::{self, Source},
    filter::{sequence_number, SequenceNumber},
    parse::parse_table,
    pipeline,
    record::Record,
};
use std::{collections::BTreeSet, env, path::PathBuf, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Serialize)]
struct Report<'a> {
    source: String,
    header_line: Option<usize>,
    header: &'a [String],
    records: Vec<RecordReport<'a>>,
}

#[derive(Serialize)]
struct RecordReport<'a> {
    #[serde(flatten)]
    record: &'a Record,
    sequence: Option<String>,
    displayed: bool,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Optional CSV path; otherwise the configured source is used.
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [CSV_FILE]", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(args.get(1).map(PathBuf::from)).await {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print the detected header and every parsed record as JSON.
async fn inspect(csv: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load(None)?;
    if let Some(path) = csv {
        config.source.file = Some(path);
    }
    let source = config.source()?;
    let text = fetch::load_source(&Client::new(), &source).await?;

    let table = parse_table(&text, &config.table_options());
    let shown: BTreeSet<usize> = pipeline::select_records(&text, &config)
        .iter()
        .map(|r| r.index)
        .collect();

    let records = table
        .records
        .iter()
        .map(|r| RecordReport {
            record: r,
            sequence: match sequence_number(r, &config.fields.sequence) {
                SequenceNumber::Explicit(n) => Some(n.to_string()),
                SequenceNumber::Positional(_) => None,
                SequenceNumber::Invalid(raw) => Some(raw.to_string()),
            },
            displayed: shown.contains(&r.index),
        })
        .collect();

    let report = Report {
        source: describe(&source),
        header_line: table.header_line,
        header: &table.header,
        records,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn describe(source: &Source) -> String {
    match source {
        Source::File(path) => path.display().to_string(),
        other => other
            .url()
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_default(),
    }
}
