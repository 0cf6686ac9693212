//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};

use gcal_mcp_core::TracingOutputFormat;

/// gcal-mcp - Google Calendar tools over the Model Context Protocol
///
/// Without a subcommand, serves MCP on stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "gcal-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format on stderr
    #[arg(long, value_enum, env = "GCAL_LOG_FORMAT", default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize access to Google Calendar and save the credentials file
    Auth {
        /// Redirect URI registered for the OAuth client. When given, the
        /// consent URL is printed and the redirected URL (or bare code) is
        /// read from stdin instead of running a loopback listener.
        redirect_uri: Option<String>,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}
