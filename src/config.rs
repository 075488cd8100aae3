//! Fixed run configuration and credential loading.
//!
//! The symbol, feed, and location tables below determine the shape and
//! ordering of every brief: one market item per symbol, one news item per
//! feed. Output ordering always follows these lists, never fetch completion
//! order.
//!
//! Credentials for the live quote source are read from a small YAML file.
//! They are only required when that source is selected; the daily-series
//! source needs none.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

/// Location rendered into every weather snapshot.
pub const LOCATION: &str = "Los Angeles, CA";
pub const LATITUDE: f64 = 34.05;
pub const LONGITUDE: f64 = -118.24;
/// Time zone the forecast source resolves "today" against.
pub const FORECAST_TIMEZONE: &str = "America/Los_Angeles";

/// Browser-like identification header. Some feed providers reject default
/// client identifiers outright.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Every external fetch is bounded by this timeout; a timeout degrades that
/// sub-result and execution continues.
pub const FETCH_TIMEOUT_SECS: u64 = 20;

/// A ticker symbol paired with its display label.
#[derive(Debug, Clone, Copy)]
pub struct SymbolSpec {
    pub code: &'static str,
    pub label: &'static str,
}

/// Index symbols served by the end-of-day series source.
pub const INDEX_SYMBOLS: &[SymbolSpec] = &[
    SymbolSpec { code: "^spx", label: "S&P 500" },
    SymbolSpec { code: "^dji", label: "Dow" },
    SymbolSpec { code: "^ndx", label: "Nasdaq 100" },
];

/// ETF proxies for the same indexes, tradable symbols the live quote
/// source understands.
pub const ETF_SYMBOLS: &[SymbolSpec] = &[
    SymbolSpec { code: "SPY", label: "S&P 500" },
    SymbolSpec { code: "DIA", label: "Dow" },
    SymbolSpec { code: "QQQ", label: "Nasdaq 100" },
];

/// A syndication feed paired with the category it reports under.
#[derive(Debug, Clone, Copy)]
pub struct FeedSpec {
    pub category: &'static str,
    pub url: &'static str,
}

pub const FEEDS: &[FeedSpec] = &[
    FeedSpec {
        category: "World",
        url: "https://feeds.bbci.co.uk/news/world/rss.xml",
    },
    FeedSpec {
        category: "Middle East/Global",
        url: "https://www.aljazeera.com/xml/rss/all.xml",
    },
    FeedSpec {
        category: "Tech",
        url: "https://www.bleepingcomputer.com/feed/",
    },
];

/// API credentials for the live quote/news source.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub api_key_id: String,
    pub api_secret_key: String,
}

/// Load credentials from a YAML file.
///
/// A missing or unreadable file is a fatal startup condition when the live
/// quote source is selected, so this propagates rather than degrading.
pub fn load_credentials(path: &Path) -> Result<Credentials, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        format!(
            "cannot read credential file {}: {}",
            path.display(),
            e
        )
    })?;
    let creds: Credentials = serde_yaml::from_str(&raw)?;
    Ok(creds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_tables_line_up() {
        // Both sourcing strategies must produce the same labels in the
        // same order, so a rendered brief looks identical either way.
        assert_eq!(INDEX_SYMBOLS.len(), ETF_SYMBOLS.len());
        for (a, b) in INDEX_SYMBOLS.iter().zip(ETF_SYMBOLS) {
            assert_eq!(a.label, b.label);
        }
    }

    #[test]
    fn credentials_parse_from_yaml() {
        let yaml = "api_key_id: AKXYZ\napi_secret_key: s3cret\n";
        let creds: Credentials = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(creds.api_key_id, "AKXYZ");
        assert_eq!(creds.api_secret_key, "s3cret");
    }

    #[test]
    fn missing_credential_file_is_an_error() {
        let err = load_credentials(Path::new("/nonexistent/credentials.yaml"));
        assert!(err.is_err());
    }
}
