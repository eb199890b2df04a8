//! athena-query — run one SQL query against AWS Athena from the command line.
//!
//! Credentials come from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
//! (a `.env` file is loaded first). Query settings come from `ATHENA_*`
//! variables, optionally prefixed by the `ATHENA_FETCH_PROFILE` profile.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use athena_fetch::{AthenaClient, AthenaConfig, Credentials};

// ── CLI ─────────────────────────────────────────────────────────────

/// Run a SQL query on Athena and print the result table.
#[derive(Parser, Debug)]
#[command(name = "athena-query", version, about)]
struct Cli {
    /// SQL to execute.
    sql: String,

    /// Database to run against (defaults to ATHENA_DATABASE or some_db_schema).
    #[arg(long, short = 'd')]
    database: Option<String>,

    /// Run as a statement (CREATE VIEW/TABLE, DDL) and print only the final status.
    #[arg(long)]
    statement: bool,

    /// Print the result table as JSON instead of an aligned text table.
    #[arg(long)]
    json: bool,

    /// Give up (and cancel the query) after this many seconds.
    /// Overrides ATHENA_TIMEOUT_SECONDS.
    #[arg(long)]
    timeout: Option<u64>,
}

/// Profiled env config with command-line overrides applied.
fn effective_config(cli: &Cli) -> AthenaConfig {
    let config = AthenaConfig::from_env();
    match cli.timeout {
        Some(seconds) => config.with_timeout_seconds(seconds),
        None => config,
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = effective_config(&cli);
    let database = cli.database.unwrap_or_else(|| config.database.clone());

    let credentials = Credentials::from_env().context("loading AWS credentials")?;
    let client = AthenaClient::new(credentials, config)
        .await
        .context("building Athena client")?;

    if cli.statement {
        let status = client.execute_statement_in(&cli.sql, &database).await?;
        println!("{status}");
        return Ok(());
    }

    let table = client.fetch_as_table_in(&cli.sql, &database).await?;
    info!(query_id = %table.metadata.query_id, rows = table.row_count(), "athena-query done");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("{table}");
    }

    Ok(())
}
