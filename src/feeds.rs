//! Syndication feed reader.
//!
//! Fetches each configured RSS feed, takes its most recent item, and
//! normalizes it into a [`NewsItem`]. Feed unavailability is an expected,
//! non-fatal condition: any network, status, or parse failure yields an
//! empty item list, and the caller degrades that feed to an "unavailable"
//! placeholder while its siblings proceed.

use crate::config::FeedSpec;
use crate::models::NewsItem;
use crate::text::{extract_text, summarize};
use crate::utils::{fetch_text, truncate_for_log};
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Character budget for feed summaries.
const SUMMARY_MAX_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    items: Vec<FeedItem>,
}

/// One `<item>` from a feed's `<channel>`; absent fields default to empty.
#[derive(Debug, Default, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parse a feed document into its channel items, in document order.
///
/// Anything that is not an RSS document with a `channel` element (Atom,
/// HTML error pages, truncated XML) parses to an empty list.
pub fn parse_feed_items(xml: &str) -> Vec<FeedItem> {
    match quick_xml::de::from_str::<Rss>(xml) {
        Ok(rss) => rss.channel.items,
        Err(e) => {
            warn!(error = %e, preview = %truncate_for_log(xml, 200), "Feed XML did not parse");
            Vec::new()
        }
    }
}

/// Fetch and parse one feed; any failure yields an empty item list.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_feed_items(client: &reqwest::Client, url: &str) -> Vec<FeedItem> {
    match fetch_text(client, url).await {
        Ok(xml) => {
            let items = parse_feed_items(&xml);
            debug!(count = items.len(), "Parsed feed items");
            items
        }
        Err(e) => {
            warn!(error = %e, "Feed fetch failed");
            Vec::new()
        }
    }
}

/// Normalize the most recent item of a feed, or degrade if it had none.
pub fn news_item_from_feed(spec: &FeedSpec, items: Vec<FeedItem>) -> NewsItem {
    let Some(first) = items.into_iter().next() else {
        return NewsItem::unavailable(spec.category);
    };

    let description = first.description.as_deref().unwrap_or("").trim();
    let summary = if description.is_empty() {
        String::new()
    } else {
        summarize(&extract_text(description), SUMMARY_MAX_CHARS)
    };

    NewsItem {
        category: spec.category.to_string(),
        headline: first.title.as_deref().unwrap_or("").trim().to_string(),
        summary,
        url: first.link.as_deref().unwrap_or("").trim().to_string(),
    }
}

/// Build one [`NewsItem`] per configured feed, in configuration order.
///
/// Feeds are fetched concurrently; ordering comes from the configuration
/// list, not from completion order.
#[instrument(level = "info", skip_all)]
pub async fn get_news(client: &reqwest::Client, feeds: &[FeedSpec]) -> Vec<NewsItem> {
    let fetches = feeds
        .iter()
        .map(|spec| async move { news_item_from_feed(spec, fetch_feed_items(client, spec.url).await) });
    let items = join_all(fetches).await;

    let unavailable = items.iter().filter(|i| i.headline == "unavailable").count();
    info!(count = items.len(), unavailable, "Built news items");
    items
}
