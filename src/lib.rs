// src/lib.rs
pub mod config;
pub mod fetch;
pub mod filter;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod render;
