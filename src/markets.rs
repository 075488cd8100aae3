//! Market snapshot builder.
//!
//! Quotes come from a pluggable [`QuoteSource`]: either the credential-free
//! end-of-day series source or the live-quote source, which needs API
//! credentials and additionally supplies market news. Both produce the same
//! per-symbol contract, so a brief looks identical regardless of which one
//! ran.
//!
//! Failure isolation is per symbol: one symbol's fetch failure degrades
//! only that entry, and a total batch failure (the source itself erroring)
//! degrades every symbol to an "unavailable" placeholder without aborting
//! the rest of the brief.

use crate::config::{Credentials, SymbolSpec};
use crate::error::FetchError;
use crate::models::{Direction, MarketItem, NewsArticle};
use crate::text::truncate_with_ellipsis;
use crate::utils::{fetch_json, fetch_text};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Character budget for market-news summaries.
const MARKET_NEWS_SUMMARY_CHARS: usize = 180;
/// At most this many related symbols are kept per article.
const MARKET_NEWS_MAX_SYMBOLS: usize = 4;
/// Articles requested from the news endpoint per run.
const MARKET_NEWS_LIMIT: usize = 5;

/// A fetched quote: latest price plus percent change when computable.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    pub price: f64,
    pub change_pct: Option<f64>,
}

/// One market data source. Implementations return a typed failure per
/// symbol rather than raising, so callers can degrade that entry alone.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError>;

    /// Recent market news, for sources that carry a news endpoint.
    async fn fetch_market_news(
        &self,
        _symbols: &[SymbolSpec],
    ) -> Option<Vec<NewsArticle>> {
        None
    }
}

/// Build one [`MarketItem`] per configured symbol, in configuration order.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
pub async fn get_markets(source: &dyn QuoteSource, symbols: &[SymbolSpec]) -> Vec<MarketItem> {
    let fetches = symbols.iter().map(|spec| async move {
        match source.fetch_quote(spec.code).await {
            Ok(quote) => market_item(spec.label, quote),
            Err(e) => {
                warn!(symbol = spec.code, error = %e, "Quote fetch failed");
                MarketItem::unavailable(spec.label)
            }
        }
    });
    let items = join_all(fetches).await;

    let unavailable = items.iter().filter(|i| i.value == "unavailable").count();
    info!(count = items.len(), unavailable, "Built market items");
    items
}

fn market_item(label: &str, quote: Quote) -> MarketItem {
    let (change, direction) = match quote.change_pct {
        Some(pct) => {
            let (arrow, direction) = classify_change(pct);
            (format!("{} {:+.2}%", arrow, pct), Some(direction))
        }
        None => (String::new(), None),
    };
    MarketItem {
        label: label.to_string(),
        value: format_price(quote.price),
        change,
        direction,
    }
}

fn classify_change(pct: f64) -> (&'static str, Direction) {
    if pct > 0.0 {
        ("▲", Direction::Up)
    } else if pct < 0.0 {
        ("▼", Direction::Down)
    } else {
        ("→", Direction::Flat)
    }
}

/// Format a price with thousands separators and two decimals.
///
/// Non-finite values render as the "unavailable" placeholder; a quote
/// source should never emit them, but a bad one must not abort the run.
fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "unavailable".to_string();
    }
    let raw = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some(parts) => parts,
        None => (raw.as_str(), "00"),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    if value < 0.0 {
        format!("-{int_grouped}.{frac_part}")
    } else {
        format!("{int_grouped}.{frac_part}")
    }
}

/// End-of-day series source (stooq-style CSV download, no credentials).
///
/// Percent change is `(close − open) / open × 100` over the most recent
/// daily row, 0% when the open is 0.
pub struct DailySeriesSource {
    client: reqwest::Client,
}

impl DailySeriesSource {
    pub fn new(client: reqwest::Client) -> Self {
        DailySeriesSource { client }
    }
}

#[async_trait]
impl QuoteSource for DailySeriesSource {
    fn name(&self) -> &'static str {
        "daily-series"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let url = format!("https://stooq.com/q/d/l/?s={symbol}&i=d");
        let csv = fetch_text(&self.client, &url).await?;
        parse_daily_series(&csv)
    }
}

/// Parse the last row of a `Date,Open,High,Low,Close,Volume` series.
fn parse_daily_series(csv: &str) -> Result<Quote, FetchError> {
    let last = csv
        .trim()
        .lines()
        .last()
        .ok_or_else(|| FetchError::Payload("empty series".to_string()))?;
    let fields: Vec<&str> = last.split(',').collect();
    if fields.len() < 6 || fields[0] == "Date" {
        return Err(FetchError::Payload(format!("unexpected series row: {last}")));
    }

    // `"NaN"` and `"inf"` parse as f64; a series row carrying them is a
    // malformed payload, not a quote.
    let open: f64 = fields[1]
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| FetchError::Payload(format!("bad open: {}", fields[1])))?;
    let close: f64 = fields[4]
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| FetchError::Payload(format!("bad close: {}", fields[4])))?;

    let change_pct = if open == 0.0 {
        0.0
    } else {
        (close - open) / open * 100.0
    };
    Ok(Quote {
        price: close,
        change_pct: Some(change_pct),
    })
}

/// Live-quote source: latest trade plus the last two daily bars.
///
/// Percent change is `(latest − previous_close) / previous_close × 100`.
/// With fewer than two bars the price is emitted with an empty change
/// string rather than failing.
pub struct LiveQuoteSource {
    client: reqwest::Client,
    credentials: Credentials,
}

const LIVE_DATA_BASE: &str = "https://data.alpaca.markets";

#[derive(Debug, Deserialize)]
struct LatestTradeResponse {
    trade: TradePoint,
}

#[derive(Debug, Deserialize)]
struct TradePoint {
    #[serde(rename = "p")]
    price: f64,
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Vec<Bar>,
}

#[derive(Debug, Deserialize)]
struct Bar {
    #[serde(rename = "c")]
    close: f64,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<NewsEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsEntry {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    symbols: Vec<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    created_at: String,
}

impl LiveQuoteSource {
    pub fn new(client: reqwest::Client, credentials: Credentials) -> Self {
        LiveQuoteSource {
            client,
            credentials,
        }
    }

    fn authed(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("APCA-API-KEY-ID", &self.credentials.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.credentials.api_secret_key)
    }

    async fn latest_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = format!("{LIVE_DATA_BASE}/v2/stocks/{symbol}/trades/latest");
        let latest: LatestTradeResponse = fetch_json(self.authed(&url)).await?;
        Ok(latest.trade.price)
    }

    async fn previous_close(&self, symbol: &str) -> Result<Option<f64>, FetchError> {
        let url = format!("{LIVE_DATA_BASE}/v2/stocks/{symbol}/bars");
        let request = self
            .authed(&url)
            .query(&[("timeframe", "1Day"), ("limit", "2"), ("sort", "desc")]);
        let bars: BarsResponse = fetch_json(request).await?;
        Ok(bars.bars.get(1).map(|bar| bar.close))
    }
}

#[async_trait]
impl QuoteSource for LiveQuoteSource {
    fn name(&self) -> &'static str {
        "live-quote"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let price = self.latest_price(symbol).await?;
        // A bars failure only costs the change figure, not the quote.
        let previous_close = match self.previous_close(symbol).await {
            Ok(close) => close,
            Err(e) => {
                warn!(symbol, error = %e, "Daily bars fetch failed");
                None
            }
        };
        let change_pct = previous_close
            .filter(|close| *close != 0.0)
            .map(|close| (price - close) / close * 100.0);
        Ok(Quote { price, change_pct })
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch_market_news(&self, symbols: &[SymbolSpec]) -> Option<Vec<NewsArticle>> {
        let codes = symbols
            .iter()
            .map(|s| s.code)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{LIVE_DATA_BASE}/v1beta1/news");
        let limit = MARKET_NEWS_LIMIT.to_string();
        let request = self
            .authed(&url)
            .query(&[("symbols", codes.as_str()), ("limit", limit.as_str())]);

        match fetch_json::<NewsResponse>(request).await {
            Ok(response) => {
                let articles: Vec<NewsArticle> =
                    response.news.into_iter().map(news_article).collect();
                info!(count = articles.len(), "Fetched market news");
                Some(articles)
            }
            Err(e) => {
                warn!(error = %e, "Market news fetch failed");
                None
            }
        }
    }
}

fn news_article(entry: NewsEntry) -> NewsArticle {
    NewsArticle {
        headline: entry.headline.trim().to_string(),
        source: entry.source,
        symbols: entry
            .symbols
            .into_iter()
            .take(MARKET_NEWS_MAX_SYMBOLS)
            .collect(),
        summary: truncate_with_ellipsis(&entry.summary, MARKET_NEWS_SUMMARY_CHARS),
        url: entry.url,
        created: entry.created_at,
    }
}
