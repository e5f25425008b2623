//! CLI runner - executes commands

use crate::cli::commands::{AttributesArgs, Cli, Commands, ListArgs, ShowArgs};
use crate::cli::progress::LogProgress;
use crate::client::AuditClient;
use crate::config::Config;
use crate::engine::{CancelFlag, EventCollector};
use crate::error::{Error, Result};
use crate::event::{Event, DEFAULT_COLUMNS};
use crate::output::{validate_columns, Printer};
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::List(args) => self.list(&config, args).await,
            Commands::Show(args) => self.show(&config, args).await,
            Commands::Attributes(args) => self.attributes(&config, args).await,
        }
    }

    /// Merge config file, environment and flags, in increasing priority
    fn load_config(&self) -> Result<Config> {
        let config = match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Config::from_file(path)?
            }
            None => Config::default(),
        };

        let mut config = config.with_env();
        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn client(&self, config: &Config) -> Result<AuditClient> {
        AuditClient::with_config(config.http_client_config()?)
    }

    /// Columns to print, falling back to `default`
    fn columns(&self, default: &[&str]) -> Vec<String> {
        if self.cli.columns.is_empty() {
            default.iter().map(|c| (*c).to_string()).collect()
        } else {
            self.cli.columns.clone()
        }
    }

    fn printer(&self, columns: Vec<String>) -> Printer<io::StdoutLock<'static>> {
        Printer::new(io::stdout().lock(), self.cli.format, columns)
    }

    async fn list(&self, config: &Config, args: &ListArgs) -> Result<()> {
        validate_columns(&self.cli.columns, Event::all_columns())?;
        let options = args.list_options(config.project_id.as_deref(), config.domain_id.as_deref())?;

        let cancel = CancelFlag::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current page");
                    cancel.cancel();
                }
            })
        };

        let collect = config
            .collect_config()
            .with_total_limit(args.limit)
            .with_precise(!args.no_dedup);
        let collector = EventCollector::new(self.client(config)?)
            .with_config(collect)
            .with_cancel_flag(cancel)
            .with_progress(Arc::new(LogProgress::new()));

        let mut events = Vec::new();
        let result = collector.collect_into(options, &mut events).await;
        interrupt.abort();

        match result {
            Ok(stats) => {
                debug!(?stats, "Listing finished");
            }
            Err(e) if e.is_cancelled() => {
                // print what was collected before the interrupt
                warn!(collected = events.len(), "Listing cancelled, output is incomplete");
                self.printer(self.columns(DEFAULT_COLUMNS)).print_events(&events)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        }

        self.printer(self.columns(DEFAULT_COLUMNS))
            .print_events(&events)
    }

    async fn show(&self, config: &Config, args: &ShowArgs) -> Result<()> {
        validate_columns(&self.cli.columns, Event::all_columns())?;
        let options = args.get_options(config.project_id.as_deref(), config.domain_id.as_deref());
        let client = self.client(config)?;

        let mut events = Vec::with_capacity(args.ids.len());
        for (i, id) in args.ids.iter().enumerate() {
            match client.get_event(id, &options).await {
                Ok(event) => events.push(event),
                Err(e) => warn!("Failed to get {id} event: {e}"),
            }
            if args.ids.len() > 1 {
                info!(fetched = i + 1, total = args.ids.len(), "Fetching events");
            }
        }

        self.printer(self.columns(Event::all_columns()))
            .print_event_details(&events)
    }

    async fn attributes(&self, config: &Config, args: &AttributesArgs) -> Result<()> {
        validate_columns(&self.cli.columns, &[])?;
        let options = args.list_options(config.project_id.as_deref(), config.domain_id.as_deref());

        let values = self
            .client(config)?
            .list_attributes(&args.name, &options)
            .await?;

        self.printer(Vec::new()).print_attributes(&values)
    }
}

/// Advice shown after a failed command
pub fn failure_hint(err: &Error) -> Option<&'static str> {
    err.is_retryable()
        .then_some("the failure looks transient, running the command again may succeed")
}
