// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;
pub mod text;
pub mod time;

pub use text::{strip_glyphs, strip_html, truncate_chars};
pub use time::{format_display, parse_timestamp};
