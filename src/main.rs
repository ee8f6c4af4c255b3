use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use devseed::config::{SeedOptions, SeedSettings, Settings};
use devseed::fixtures::FixtureFactory;
use devseed::pipeline::Pipeline;
use devseed::seed::SeedReport;
use devseed::store::MemoryStore;
use devseed::DevEnvironment;

#[derive(Parser, Debug)]
#[clap(name = "devseed", version)]
#[clap(about = "Provision and seed a Cosmos DB / Azure Storage development environment", long_about = None)]
struct Cli {
    /// Number of profiles to create
    #[clap(long, default_value_t = 10)]
    users: usize,

    /// Number of messages per profile
    #[clap(long, default_value_t = 10)]
    messages_per_user: usize,

    /// Load environment variables from this file instead of ./.env
    #[clap(long)]
    env_file: Option<PathBuf>,

    /// Accept self-signed certificates (the Cosmos DB emulator uses one)
    #[clap(long)]
    insecure: bool,

    /// Create the message collections without the inbox composite index
    #[clap(long)]
    no_composite_index: bool,

    /// Per-request timeout in seconds
    #[clap(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Seed an in-memory store without touching the network
    #[clap(long)]
    dry_run: bool,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

impl Cli {
    fn options(&self) -> SeedOptions {
        SeedOptions::default()
            .with_users(self.users)
            .with_messages_per_user(self.messages_per_user)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_accept_invalid_certs(self.insecure)
            .with_composite_index(!self.no_composite_index)
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("devseed={},warn", level)));

    // a subscriber may already be installed when run more than once in process
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

async fn run(cli: Cli) -> anyhow::Result<SeedReport> {
    match &cli.env_file {
        Some(path) => {
            dotenv::from_path(path).with_context(|| format!("cannot load {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }
    init_tracing(cli.debug);

    let options = cli.options();

    if cli.dry_run {
        let settings = SeedSettings::from_lookup(|name| std::env::var(name).ok());
        let store = MemoryStore::new();
        let report = Pipeline::new(&store, &store, &settings, &options)
            .run(FixtureFactory::from_entropy())
            .await?;
        return Ok(report);
    }

    let settings = Settings::from_env()?;
    tracing::debug!(?settings, ?options, "configuration loaded");

    let env = DevEnvironment::connect(&settings.connection, &options)?;
    let report = env
        .pipeline(&settings.seed, &options)
        .run(FixtureFactory::from_entropy())
        .await?;
    Ok(report)
}

/// Process exit status for the outcome of a run
fn exit_status(result: &anyhow::Result<SeedReport>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let result = run(Cli::parse()).await;

    match &result {
        Ok(report) => println!("{}", report),
        Err(err) => {
            tracing::error!(error = %err, "seeding failed");
            eprintln!("Error: {:#}", err);
        }
    }
    ExitCode::from(exit_status(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_exits_zero() {
        let cli = Cli::parse_from(["devseed", "--dry-run", "--users", "1", "--messages-per-user", "1"]);

        let result = run(cli).await;

        let report = result.as_ref().unwrap();
        assert_eq!(report.profiles, 1);
        assert_eq!(report.messages, 1);
        assert_eq!(exit_status(&result), 0);
    }

    #[tokio::test]
    async fn test_missing_env_file_exits_one() {
        let cli = Cli::parse_from([
            "devseed",
            "--dry-run",
            "--env-file",
            "/nonexistent/devseed/.env",
        ]);

        let result = run(cli).await;

        let err = result.as_ref().unwrap_err();
        assert_eq!(err.to_string(), "cannot load /nonexistent/devseed/.env");
        assert_eq!(exit_status(&result), 1);
    }
}
