//! Data models for the daily brief and its archive.
//!
//! This module defines the core data structures used throughout the application:
//! - [`BriefRecord`]: one day's aggregated snapshot of markets, weather, and news
//! - [`MarketItem`]: a formatted per-symbol price/change record
//! - [`WeatherSnapshot`]: current conditions plus today's outlook
//! - [`NewsItem`]: one headline per configured feed
//! - [`NewsArticle`]: a market-news article from the live quote source
//!
//! The models use camelCase field names to match the JSON contract consumed
//! by the presentation layer, hence the `#[allow(non_snake_case)]` attributes.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One day's aggregated brief. Identity key is `date`: the archive holds at
/// most one record per calendar day, and a rerun for the same day fully
/// replaces the earlier record.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BriefRecord {
    /// Calendar date in `YYYY-MM-DD` format (local time zone).
    pub date: String,
    /// Full RFC 3339 timestamp with offset, taken at invocation time.
    pub generatedAt: String,
    /// Human-readable title embedding weekday, month, day, and year.
    pub title: String,
    /// One entry per configured symbol, in configuration order.
    pub markets: Vec<MarketItem>,
    /// Market news articles; only present when the live quote source ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketNews: Option<Vec<NewsArticle>>,
    pub weather: WeatherSnapshot,
    /// One entry per configured feed, in configuration order.
    pub news: Vec<NewsItem>,
}

impl BriefRecord {
    /// Compose one record for the current date from pre-built snapshots.
    ///
    /// Pure composition: every input has already degraded to a placeholder
    /// on failure, so assembly itself never fails.
    pub fn assemble(
        now: DateTime<Local>,
        markets: Vec<MarketItem>,
        market_news: Option<Vec<NewsArticle>>,
        weather: WeatherSnapshot,
        news: Vec<NewsItem>,
    ) -> Self {
        BriefRecord {
            date: now.format("%Y-%m-%d").to_string(),
            generatedAt: now.to_rfc3339(),
            title: now.format("Morning Brief — %a %b %d, %Y").to_string(),
            markets,
            marketNews: market_news,
            weather,
            news,
        }
    }
}

/// Direction of a market move, used alongside the arrow glyph in `change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// A formatted per-symbol market record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketItem {
    pub label: String,
    /// Formatted price (thousands separators, 2 decimals) or `"unavailable"`.
    pub value: String,
    /// Signed percent with a leading arrow glyph; empty when unknown.
    pub change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl MarketItem {
    /// Placeholder for a symbol whose quote could not be fetched.
    pub fn unavailable(label: &str) -> Self {
        MarketItem {
            label: label.to_string(),
            value: "unavailable".to_string(),
            change: String::new(),
            direction: None,
        }
    }
}

/// Current conditions and today's outlook for the configured location.
///
/// Fields absent from the upstream payload stay `None` and serialize as
/// null rather than being defaulted to a placeholder number.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub conditions: String,
    pub temp: Option<String>,
    pub feelsLike: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub precipChance: Option<String>,
}

impl WeatherSnapshot {
    /// Placeholder when the forecast source failed entirely. Degradation is
    /// at snapshot granularity because the source returns one document.
    pub fn unavailable(location: &str) -> Self {
        WeatherSnapshot {
            location: location.to_string(),
            conditions: "unavailable".to_string(),
            temp: None,
            feelsLike: None,
            high: None,
            low: None,
            precipChance: None,
        }
    }
}

/// The most recent story from one configured feed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsItem {
    pub category: String,
    pub headline: String,
    /// Sentence-bounded summary, at most 200 characters.
    pub summary: String,
    pub url: String,
}

impl NewsItem {
    /// Placeholder for a feed that yielded no items.
    pub fn unavailable(category: &str) -> Self {
        NewsItem {
            category: category.to_string(),
            headline: "unavailable".to_string(),
            summary: String::new(),
            url: String::new(),
        }
    }
}

/// A market-news article from the live quote source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsArticle {
    pub headline: String,
    pub source: String,
    /// At most four ticker symbols the article relates to.
    pub symbols: Vec<String>,
    /// Ellipsis-truncated summary, at most 180 characters.
    pub summary: String,
    pub url: String,
    /// Publication timestamp as reported by the source.
    pub created: String,
}
