//! Output module
//!
//! Prints events and attribute values to a writer in the format the user
//! selected.
//!
//! # Formats
//!
//! - `table` - boxed table, or one key/value table per event for `show`
//! - `value` - selected columns joined by spaces
//! - `csv` - header row plus one record per event
//! - `json` / `yaml` - full events; a single event is printed unwrapped

mod printer;
mod render;

pub use printer::{validate_columns, OutputFormat, Printer};
pub use render::{csv_field, csv_record, render_table};
