//! `autos`: inspect how dashboard URLs map to filters and request keys.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use autos_core::DashboardConfig;
use autos_protocol::DomainFilters;
use autos_request_coordinator::request_key;
use autos_url_codec::UrlCodec;
use clap::Parser;
use clap::Subcommand;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "autos", version, about = "Vehicle dashboard URL tooling")]
pub struct Cli {
    /// Dashboard config (TOML); built-in defaults when omitted
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a query string and print the filters as JSON
    Parse(QueryArgs),

    /// Turn a filters JSON document into a query string
    Serialize(SerializeArgs),

    /// Print the request key the dashboard would fetch under
    Key(QueryArgs),

    /// Rewrite a query string into its canonical form
    Normalize(QueryArgs),
}

#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Query string, with or without the leading `?`
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Debug, Parser)]
pub struct SerializeArgs {
    /// Filters as JSON, or `-` to read from stdin
    #[arg(value_name = "JSON")]
    pub json: String,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        debug!(?config, "configuration loaded");
        let codec = UrlCodec::new(config.codec.clone()).context("invalid codec config")?;

        let output = match self.command {
            Command::Parse(args) => {
                let filters = codec.parse_query(&args.query);
                serde_json::to_string_pretty(&filters)?
            }
            Command::Serialize(args) => {
                let raw = read_argument(&args.json)?;
                let filters: DomainFilters =
                    serde_json::from_str(&raw).context("filters JSON is malformed")?;
                // Round-trip through the codec so unknown keys and
                // out-of-range pagination come out the way a URL would.
                let canonical = codec.parse(&codec.serialize(&filters.normalized()));
                codec.to_query(&canonical)
            }
            Command::Key(args) => {
                let filters = codec.parse_query(&args.query);
                request_key(&config.fetch.endpoint, &filters)?.to_string()
            }
            Command::Normalize(args) => codec.normalize_query(&args.query),
        };
        println!("{output}");
        Ok(())
    }
}

fn read_argument(value: &str) -> Result<String> {
    if value != "-" {
        return Ok(value.to_string());
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
