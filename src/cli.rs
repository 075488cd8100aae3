//! Command-line interface definitions for the daily brief generator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option carries a default, so the intended deployment (a scheduled
//! run with no arguments) works out of the box.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the daily brief generator.
///
/// # Examples
///
/// ```sh
/// # Scheduled run, all defaults
/// daily_brief
///
/// # Custom archive location
/// daily_brief -a /srv/site/data/briefs.json
///
/// # Live quotes plus market news (needs credentials)
/// daily_brief --quote-source live --credentials ~/.config/daily_brief/credentials.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the rolling JSON brief archive
    #[arg(short, long, default_value = "data/briefs.json")]
    pub archive_file: PathBuf,

    /// Which market quote source to use
    #[arg(long, value_enum, default_value = "daily")]
    pub quote_source: QuoteSourceKind,

    /// Path of the credential file for the live quote/news source
    #[arg(long, env = "DAILY_BRIEF_CREDENTIALS", default_value = "config/credentials.yaml")]
    pub credentials: PathBuf,
}

/// The two supported market sourcing strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QuoteSourceKind {
    /// End-of-day open/close series; no credentials required.
    Daily,
    /// Latest trade plus previous close; requires credentials and also
    /// supplies market news articles.
    Live,
}
