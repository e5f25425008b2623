//! Event and attribute printing

use super::render::{csv_record, render_table};
use crate::error::{Error, Result};
use crate::event::Event;
use serde::Serialize;
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Boxed table
    #[default]
    Table,
    /// Space separated values, one event per line
    Value,
    /// Pretty printed JSON
    Json,
    /// YAML documents
    Yaml,
    /// CSV with a header row
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Value => "value",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject column names outside `supported`
pub fn validate_columns<S: AsRef<str>>(columns: &[S], supported: &[&str]) -> Result<()> {
    for column in columns {
        let column = column.as_ref();
        if supported.is_empty() {
            return Err(Error::invalid_value(
                "column",
                "columns are not supported for this command",
            ));
        }
        if !supported.contains(&column) {
            return Err(Error::invalid_value(
                "column",
                format!(
                    "invalid \"{column}\" column name, supported values for the column: {}",
                    supported.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

/// Writes events in one output format
pub struct Printer<W> {
    out: W,
    format: OutputFormat,
    columns: Vec<String>,
}

impl<W: Write> Printer<W> {
    /// Create a printer writing `columns` in `format`
    pub fn new(out: W, format: OutputFormat, columns: Vec<String>) -> Self {
        Self {
            out,
            format,
            columns,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print events as a listing, one row per event
    pub fn print_events(&mut self, events: &[Event]) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                let header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
                let rows: Vec<Vec<String>> = events.iter().map(|e| self.row(e)).collect();
                self.out.write_all(render_table(&header, &rows).as_bytes())?;
            }
            OutputFormat::Value => {
                for event in events {
                    let line = self.row(event).join(" ");
                    writeln!(self.out, "{line}")?;
                }
            }
            OutputFormat::Csv => {
                let header = csv_record(&self.columns);
                self.out.write_all(header.as_bytes())?;
                for event in events {
                    let record = csv_record(&self.row(event));
                    self.out.write_all(record.as_bytes())?;
                }
            }
            OutputFormat::Json => self.write_json(events)?,
            OutputFormat::Yaml => self.write_yaml(events)?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Print events one by one; tables become per-event key/value tables
    pub fn print_event_details(&mut self, events: &[Event]) -> Result<()> {
        if self.format != OutputFormat::Table {
            return self.print_events(events);
        }

        for event in events {
            let columns = event.columns();
            let rows: Vec<Vec<String>> = self
                .columns
                .iter()
                .filter_map(|key| columns.get(key).map(|v| vec![key.clone(), v.clone()]))
                .collect();
            self.out
                .write_all(render_table(&["Key", "Value"], &rows).as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Print attribute values
    pub fn print_attributes(&mut self, values: &[String]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, values)
                    .map_err(|e| Error::output(format!("Failed to write JSON: {e}")))?;
                writeln!(self.out)?;
            }
            OutputFormat::Yaml => {
                serde_yaml::to_writer(&mut self.out, values)
                    .map_err(|e| Error::output(format!("Failed to write YAML: {e}")))?;
            }
            OutputFormat::Table | OutputFormat::Value | OutputFormat::Csv => {
                for value in values {
                    writeln!(self.out, "{value}")?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn row(&self, event: &Event) -> Vec<String> {
        let columns = event.columns();
        self.columns
            .iter()
            .map(|key| columns.get(key).cloned().unwrap_or_default())
            .collect()
    }

    fn write_json(&mut self, events: &[Event]) -> Result<()> {
        match events {
            [] => return Ok(()),
            [event] => write_json_value(&mut self.out, event)?,
            events => write_json_value(&mut self.out, &events)?,
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn write_yaml(&mut self, events: &[Event]) -> Result<()> {
        let result = match events {
            [] => return Ok(()),
            [event] => serde_yaml::to_writer(&mut self.out, event),
            events => serde_yaml::to_writer(&mut self.out, &events),
        };
        result.map_err(|e| Error::output(format!("Failed to write YAML: {e}")))
    }
}

fn write_json_value<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(out, value)
        .map_err(|e| Error::output(format!("Failed to write JSON: {e}")))
}
