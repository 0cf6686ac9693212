//! The `gcal-mcp` command-line interface.
//!
//! `gcal-mcp` serves the calendar tools on stdio; `gcal-mcp auth` runs the
//! OAuth grant that writes the credentials file.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
