//! # Daily Brief
//!
//! A scheduled aggregation pipeline that pulls market quotes, weather, and
//! news headlines from several external services, assembles them into one
//! dated brief record, and merges that record into a rolling JSON archive
//! capped at the 30 most recent days.
//!
//! ## Usage
//!
//! ```sh
//! daily_brief
//! daily_brief --quote-source live --credentials config/credentials.yaml
//! ```
//!
//! ## Architecture
//!
//! One run moves through four phases:
//! 1. **Startup**: parse CLI, build the shared HTTP client, verify the
//!    archive location is writable, load credentials if the live quote
//!    source was selected
//! 2. **Fetching**: markets, weather, and news snapshots, concurrently;
//!    every sub-fetch degrades to a placeholder on failure
//! 3. **Assembly**: compose the dated brief record (never fails)
//! 4. **Merge**: replace-or-append into the archive, enforce the dedup and
//!    retention invariants, write back atomically
//!
//! Anything downstream of startup follows one principle: best-effort
//! degrade, never abort. A brief with several "unavailable" fields beats
//! no brief at all.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod archive;
mod cli;
mod config;
mod error;
mod feeds;
mod markets;
mod models;
mod text;
mod utils;
mod weather;

use cli::{Cli, QuoteSourceKind};
use config::SymbolSpec;
use markets::{DailySeriesSource, LiveQuoteSource, QuoteSource};
use models::BriefRecord;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("daily_brief starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.archive_file, ?args.quote_source, "Parsed CLI arguments");

    // Early check: ensure the archive location is writable before any fetch
    let archive_dir = args
        .archive_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    if let Err(e) = utils::ensure_writable_dir(&archive_dir).await {
        error!(
            path = %archive_dir.display(),
            error = %e,
            "Archive directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = utils::build_client()?;

    // Credentials are a startup concern: missing credentials for the live
    // source terminate the run before any network traffic.
    let (source, symbols): (Box<dyn QuoteSource>, &[SymbolSpec]) = match args.quote_source {
        QuoteSourceKind::Daily => (
            Box::new(DailySeriesSource::new(client.clone())),
            config::INDEX_SYMBOLS,
        ),
        QuoteSourceKind::Live => {
            let credentials = config::load_credentials(&args.credentials).map_err(|e| {
                error!(path = %args.credentials.display(), error = %e, "Credential load failed");
                e
            })?;
            (
                Box::new(LiveQuoteSource::new(client.clone(), credentials)),
                config::ETF_SYMBOLS,
            )
        }
    };
    info!(source = source.name(), symbols = symbols.len(), feeds = config::FEEDS.len(), "Fetch phase starting");

    // ---- Fetch snapshots (independent, so side by side) ----
    let (market_items, weather_snapshot, news_items) = tokio::join!(
        markets::get_markets(source.as_ref(), symbols),
        weather::get_weather(&client),
        feeds::get_news(&client, config::FEEDS),
    );
    let market_news = source.fetch_market_news(symbols).await;

    // ---- Assemble today's brief ----
    let brief = BriefRecord::assemble(
        Local::now(),
        market_items,
        market_news,
        weather_snapshot,
        news_items,
    );
    let title = brief.title.clone();
    let market_count = brief.markets.len();
    let news_count = brief.news.len();
    info!(date = %brief.date, %title, "Brief assembled");

    // ---- Merge into the rolling archive ----
    let existing = archive::load_archive(&args.archive_file).await;
    let merged = archive::merge_brief(existing, brief);
    if let Err(e) = archive::store_archive(&args.archive_file, &merged).await {
        error!(path = %args.archive_file.display(), error = %e, "Failed to write archive");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        entries = merged.len(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    println!("Brief generated: {title} ({market_count} markets, {news_count} news)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::markets::{Quote, get_markets};
    use crate::models::WeatherSnapshot;
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate, TimeZone};

    const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Fixture feed</title>
    <item>
      <title>Rates hold steady</title>
      <link>https://example.com/rates</link>
      <description><![CDATA[<p>The central bank held rates. Markets were calm.</p>]]></description>
    </item>
  </channel>
</rss>"#;

    const FORECAST_JSON: &str = r#"{
        "current": {
            "temperature_2m": 68.42,
            "apparent_temperature": 67.07,
            "weather_code": 2
        },
        "daily": {
            "temperature_2m_max": [75.0],
            "temperature_2m_min": [58.21],
            "precipitation_probability_max": [10]
        }
    }"#;

    /// Two symbols answer, the third is offline.
    struct ScriptedSource;

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
            match symbol {
                "^spx" => Ok(Quote { price: 5696.4, change_pct: Some(0.62) }),
                "^dji" => Ok(Quote { price: 42215.73, change_pct: Some(-0.14) }),
                _ => Err(FetchError::Payload("series offline".to_string())),
            }
        }
    }

    fn seeded_record(date: NaiveDate) -> BriefRecord {
        BriefRecord {
            date: date.format("%Y-%m-%d").to_string(),
            generatedAt: format!("{}T07:00:00-07:00", date.format("%Y-%m-%d")),
            title: date.format("Morning Brief — %a %b %d, %Y").to_string(),
            markets: Vec::new(),
            marketNews: None,
            weather: WeatherSnapshot::unavailable(config::LOCATION),
            news: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_full_run_merges_into_full_archive() {
        // Snapshot phase: scripted quotes, fixture feed and forecast bodies,
        // one partial market failure along for the ride.
        let markets = get_markets(&ScriptedSource, config::INDEX_SYMBOLS).await;
        let news: Vec<_> = config::FEEDS
            .iter()
            .map(|spec| feeds::news_item_from_feed(spec, feeds::parse_feed_items(FEED_XML)))
            .collect();
        let weather_snapshot =
            weather::snapshot_from_json(config::LOCATION, FORECAST_JSON).unwrap();

        let now = Local.with_ymd_and_hms(2025, 5, 6, 7, 0, 0).unwrap();
        let brief = BriefRecord::assemble(now, markets, None, weather_snapshot, news);

        assert_eq!(brief.date, "2025-05-06");
        assert_eq!(brief.markets.len(), config::INDEX_SYMBOLS.len());
        assert_eq!(brief.markets[0].value, "5,696.40");
        assert_eq!(brief.markets[1].change, "▼ -0.14%");
        assert_eq!(brief.markets[2].value, "unavailable");
        assert_eq!(brief.news.len(), config::FEEDS.len());
        assert!(brief.news.iter().all(|i| i.headline == "Rates hold steady"));
        assert_eq!(brief.weather.conditions, "Partly cloudy");
        assert!(brief.marketNews.is_none());

        // Merge phase: the archive is already at capacity, so today's entry
        // displaces the oldest one and the cap holds.
        let path = std::env::temp_dir().join("daily_brief_full_run_test.json");
        let seed_start = NaiveDate::from_ymd_opt(2025, 4, 6).unwrap();
        let seeded: Vec<BriefRecord> = (0..archive::MAX_ENTRIES as u64)
            .map(|offset| seeded_record(seed_start.checked_add_days(Days::new(offset)).unwrap()))
            .collect();
        archive::store_archive(&path, &seeded).await.unwrap();

        let existing = archive::load_archive(&path).await;
        let merged = archive::merge_brief(existing, brief);
        archive::store_archive(&path, &merged).await.unwrap();

        let reloaded = archive::load_archive(&path).await;
        assert_eq!(reloaded.len(), archive::MAX_ENTRIES);
        assert_eq!(reloaded[0].date, "2025-05-06");
        assert_eq!(reloaded.last().unwrap().date, "2025-04-07");
        assert_eq!(
            reloaded.iter().filter(|r| r.date == "2025-05-06").count(),
            1
        );

        let _ = std::fs::remove_file(&path);
    }
}
