use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod bulk;
mod config;
mod errors;
mod input;
mod models;

use config::settings::{parse_key_value, DefaultFields, PartialSettings, Settings};

#[derive(Parser)]
#[command(name = "jira-bulk-create")]
#[command(version = "0.1.0")]
#[command(about = "Create issues in Jira in bulk out of a CSV file", long_about = None)]
struct Cli {
    /// Trace headers, rows, payloads and responses
    #[arg(short, long)]
    verbose: bool,

    /// Ask for confirmation between phases and before each issue
    #[arg(long)]
    step: bool,

    /// TOML file with any of the settings below
    #[arg(long)]
    config: Option<PathBuf>,

    /// The CSV input file
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Encoding of the CSV input file (default: utf-8)
    #[arg(long)]
    input_file_encoding: Option<String>,

    /// CSV column separator (default: ,)
    #[arg(long)]
    csv_column_separator: Option<String>,

    /// Rename a column for the API call (e.g., --as Name:summary)
    #[arg(long = "as", value_name = "COLUMN:FIELD", value_parser = parse_key_value)]
    renames: Vec<(String, String)>,

    /// Convert a field to a Jira type (e.g., --convert count:NumberField)
    #[arg(long, value_name = "FIELD:TYPE", value_parser = parse_key_value)]
    convert: Vec<(String, String)>,

    /// Full URL to the Jira server (e.g., https://jira.company.com)
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    jira_user: Option<String>,

    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true)]
    jira_password: Option<String>,

    /// Accept invalid TLS certificates (self-signed servers)
    #[arg(long)]
    insecure: bool,

    /// Default assignee
    #[arg(long)]
    assignee: Option<String>,

    /// Default component
    #[arg(long)]
    component: Option<String>,

    /// Default description
    #[arg(long)]
    description: Option<String>,

    /// Default issue type
    #[arg(long)]
    issue_type: Option<String>,

    /// Default project key
    #[arg(long)]
    project_key: Option<String>,
}

impl Cli {
    fn overrides(&self) -> PartialSettings {
        let mut partial = PartialSettings::default();

        partial.jira.url = self.url.clone();
        partial.jira.user = self.jira_user.clone();
        partial.jira.password = self.jira_password.clone();
        partial.jira.insecure = self.insecure.then_some(true);

        partial.input.file = self.input_file.clone();
        partial.input.encoding = self.input_file_encoding.clone();
        partial.input.separator = self.csv_column_separator.clone();

        partial.columns.rename = self.renames.iter().cloned().collect();
        partial.columns.convert = self.convert.iter().cloned().collect();

        partial.defaults = DefaultFields {
            assignee: self.assignee.clone(),
            component: self.component.clone(),
            description: self.description.clone(),
            issue_type: self.issue_type.clone(),
            project_key: self.project_key.clone(),
        };

        partial
    }

    fn settings(&self) -> errors::Result<Settings> {
        let base = match &self.config {
            Some(path) => PartialSettings::load(path)?,
            None => PartialSettings::default(),
        };

        base.merge(self.overrides()).resolve()
    }
}

fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,jira_bulk_create=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    println!("{}", "Jira Bulk Create v0.1.0".bright_cyan().bold());
    println!();

    if let Err(e) = handle_create(&cli).await {
        eprintln!("\n{}", e);
        std::process::exit(1);
    }

    println!();
}

async fn handle_create(cli: &Cli) -> errors::Result<()> {
    let settings = cli.settings()?;

    println!(
        "{}",
        format!("Reading {}...", settings.input.file.display()).cyan().bold()
    );

    let table = input::reader::read_table(
        &settings.input.file,
        settings.input.separator,
        settings.input.encoding,
    )?;

    tracing::debug!(headers = ?table.headers, "found headers");
    if !settings.columns.renames.is_empty() {
        let renamed = models::row::rename_headers(&table.headers, &settings.columns.renames);
        tracing::debug!(headers = ?renamed, "renamed headers");
    }
    if cli.step {
        bulk::confirm("Headers read. Continue?")?;
    }

    let rows = models::row::normalize(&table, &settings.columns.renames, &settings.defaults)?;

    for (i, row) in rows.iter().enumerate() {
        tracing::debug!(row = i, fields = ?row, "normalized row");
    }
    println!(
        "{}",
        format!("  ✓ {} rows found", rows.len()).green()
    );
    println!();

    if cli.step {
        bulk::confirm("Start bulk create?")?;
    }

    println!("{}", "Creating issues in Jira...".cyan().bold());
    let sent = bulk::create_issues(&settings, &rows, cli.step).await?;

    println!();
    println!("{}", format!("✓ Sent {} issues", sent).green().bold());
    println!(
        "{}",
        "  Jira's answers are not checked; run with --verbose to see them".dimmed()
    );

    Ok(())
}
