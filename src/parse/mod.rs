// src/parse/mod.rs
pub mod header;
pub mod line;
pub mod lines;
pub mod table;

pub use header::{detect_header, MarkerSets};
pub use line::parse_line;
pub use lines::{split_lines, LineMode, SourceLine};
pub use table::{parse_table, HeaderMode, Table, TableOptions};
