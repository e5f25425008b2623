//! CLI commands and argument parsing

use crate::error::{Error, Result};
use crate::event::parse_time;
use crate::output::OutputFormat;
use crate::query::{
    AttributeListOptions, DateFilter, DateQuery, GetOptions, ListOptions, SortSpec,
};
use crate::types::OptionStringExt;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command line client for the Hermes audit event API
#[derive(Parser, Debug)]
#[command(name = "hermes-audit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Audit API endpoint, e.g. https://hermes.example.com/v1
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Pre-issued auth token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Column to print (repeatable)
    #[arg(short = 'c', long = "column", global = true)]
    pub columns: Vec<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List audit events
    List(ListArgs),

    /// Show audit events by id
    Show(ShowArgs),

    /// List the distinct values of an event attribute
    Attributes(AttributesArgs),
}

/// Project scope flags shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Project or domain ID (admin only)
    #[arg(long, conflicts_with = "all_projects")]
    pub project_id: Option<String>,

    /// Include all projects and domains (admin only), alias for --project-id '*'
    #[arg(short = 'A', long)]
    pub all_projects: bool,
}

impl ScopeArgs {
    /// The effective project scope, falling back to `default`
    pub fn project_id(&self, default: Option<&str>) -> Option<String> {
        if self.all_projects {
            return Some("*".to_string());
        }
        self.project_id
            .clone()
            .none_if_empty()
            .or_else(|| default.map(str::to_string))
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Filter events by a target type
    #[arg(long)]
    pub target_type: Option<String>,

    /// Filter events by a target ID
    #[arg(long)]
    pub target_id: Option<String>,

    /// Filter events by an initiator ID
    #[arg(long)]
    pub initiator_id: Option<String>,

    /// Filter events by an initiator name
    #[arg(long)]
    pub initiator_name: Option<String>,

    /// Filter events by an action
    #[arg(long)]
    pub action: Option<String>,

    /// Filter events by an outcome
    #[arg(long)]
    pub outcome: Option<String>,

    /// Filter events by a request path
    #[arg(long)]
    pub request_path: Option<String>,

    /// Filter events by a source (observer type)
    #[arg(long)]
    pub source: Option<String>,

    /// Full text search
    #[arg(long)]
    pub search: Option<String>,

    /// Filter events by exact time
    #[arg(long, conflicts_with_all = ["time_start", "time_end"])]
    pub time: Option<String>,

    /// Filter events from time
    #[arg(long)]
    pub time_start: Option<String>,

    /// Filter events till time
    #[arg(long)]
    pub time_end: Option<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Limit the amount of events in output (0 = all)
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Sort key with optional :asc or :desc suffix (repeatable), e.g. time:desc
    #[arg(short, long)]
    pub sort: Vec<String>,

    /// Keep events repeated across page boundaries
    #[arg(long)]
    pub no_dedup: bool,
}

impl ListArgs {
    /// Build the listing query
    pub fn list_options(
        &self,
        default_project: Option<&str>,
        domain_id: Option<&str>,
    ) -> Result<ListOptions> {
        let mut options = ListOptions {
            observer_type: self.source.clone(),
            target_id: self.target_id.clone(),
            target_type: self.target_type.clone(),
            initiator_id: self.initiator_id.clone(),
            initiator_name: self.initiator_name.clone(),
            action: self.action.clone(),
            outcome: self.outcome.clone(),
            request_path: self.request_path.clone(),
            search: self.search.clone(),
            project_id: self.scope.project_id(default_project),
            domain_id: domain_id.map(str::to_string),
            sort: SortSpec::from_parts(&self.sort),
            ..Default::default()
        };

        if let Some(time) = self.time.as_deref() {
            options.time.push(DateQuery::exact(parse_flag_time("time", time)?));
        }
        if let Some(start) = self.time_start.as_deref() {
            options.time.push(DateQuery::bound(
                DateFilter::Gte,
                parse_flag_time("time-start", start)?,
            ));
        }
        if let Some(end) = self.time_end.as_deref() {
            options.time.push(DateQuery::bound(
                DateFilter::Lte,
                parse_flag_time("time-end", end)?,
            ));
        }

        Ok(options)
    }
}

fn parse_flag_time(flag: &str, value: &str) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    parse_time(value).map_err(|e| Error::invalid_value(flag, e.to_string()))
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Event IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

impl ShowArgs {
    pub fn get_options(&self, default_project: Option<&str>, domain_id: Option<&str>) -> GetOptions {
        GetOptions {
            project_id: self.scope.project_id(default_project),
            domain_id: domain_id.map(str::to_string),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AttributesArgs {
    /// Attribute name: observer_type, target_type, target_id, initiator_type,
    /// initiator_id, initiator_name, action or outcome
    pub name: String,

    /// Limit the amount of attributes in output
    #[arg(short, long, default_value_t = 0)]
    pub limit: u32,

    /// Limit the level of detail of hierarchical values
    #[arg(long, default_value_t = 0)]
    pub max_depth: u32,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

impl AttributesArgs {
    pub fn list_options(
        &self,
        default_project: Option<&str>,
        domain_id: Option<&str>,
    ) -> AttributeListOptions {
        AttributeListOptions {
            max_depth: self.max_depth,
            limit: self.limit,
            project_id: self.scope.project_id(default_project),
            domain_id: domain_id.map(str::to_string),
        }
    }
}
