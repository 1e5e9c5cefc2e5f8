// src/parse/lines.rs
use serde::{Deserialize, Serialize};

/// How raw CSV text is cut into lines before cell parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMode {
    /// Every `\n` ends a line.
    #[default]
    Physical,
    /// A `\n` inside a quoted field belongs to the field.
    QuoteAware,
}

/// A non-blank line of the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number in the source text where this line starts.
    pub number: usize,
    pub text: &'a str,
}

/// Cut `text` into lines, dropping those that are blank after trimming.
pub fn split_lines(text: &str, mode: LineMode) -> Vec<SourceLine<'_>> {
    let raw: Vec<SourceLine<'_>> = match mode {
        LineMode::Physical => text
            .split('\n')
            .enumerate()
            .map(|(i, text)| SourceLine { number: i + 1, text })
            .collect(),
        LineMode::QuoteAware => split_quote_aware(text),
    };

    raw.into_iter().filter(|l| !l.text.trim().is_empty()).collect()
}

fn split_quote_aware(text: &str) -> Vec<SourceLine<'_>> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut start_number = 1;
    let mut number = 1;

    for (i, ch) in text.char_indices() {
        match ch {
            // `""` flips twice, so escaped quotes leave the state unchanged
            '"' => in_quotes = !in_quotes,
            '\n' => {
                if !in_quotes {
                    out.push(SourceLine {
                        number: start_number,
                        text: &text[start..i],
                    });
                    start = i + 1;
                    start_number = number + 1;
                }
                number += 1;
            }
            _ => {}
        }
    }
    let tail = &text[start..];
    if in_quotes {
        // An unclosed quote only swallows the rest of its own line.
        out.extend(tail.split('\n').enumerate().map(|(i, text)| SourceLine {
            number: start_number + i,
            text,
        }));
    } else {
        out.push(SourceLine {
            number: start_number,
            text: tail,
        });
    }
    out
}
