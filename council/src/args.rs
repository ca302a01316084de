use clap::Parser;

/// Command-line overrides for the deliberation server, layered on top of
/// the environment variables `config::Config::load` already reads.
#[derive(Debug, Parser)]
#[command(name = "llm-council", version, about = "Multi-model LLM deliberation server")]
pub struct Args {
    /// Bind host, overriding `COUNCIL_HOST`.
    #[arg(long, env = "COUNCIL_HOST")]
    pub host: Option<String>,

    /// Bind port, overriding `COUNCIL_PORT`.
    #[arg(long, env = "COUNCIL_PORT")]
    pub port: Option<u16>,

    /// Log filter, e.g. "info" or "server=debug,council=debug".
    #[arg(long, env = "COUNCIL_LOG", default_value = "info")]
    pub log_filter: String,
}
