//! Shared HTTP plumbing and file system helpers.
//!
//! Every upstream fetch in the application goes through the helpers here:
//! one [`reqwest::Client`] built at startup carries the bounded timeout and
//! the browser-like identification header, and the `fetch_*` functions fold
//! non-success statuses and malformed payloads into [`FetchError`] so the
//! snapshot builders can degrade uniformly.

use crate::config;
use crate::error::FetchError;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Build the single HTTP client shared by all snapshot builders.
///
/// The client carries the 20-second timeout and the browser-like
/// User-Agent; it is constructed once in `main` and passed in explicitly,
/// so there is no import-time global state.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config::FETCH_TIMEOUT_SECS))
        .user_agent(config::USER_AGENT)
        .build()
}

/// Send a prepared request and return its body as text, treating non-2xx
/// statuses as failures.
///
/// Taking a [`reqwest::RequestBuilder`] lets callers attach query
/// parameters or auth headers before the shared status handling.
pub async fn send_text(request: reqwest::RequestBuilder) -> Result<String, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(response.text().await?)
}

/// Fetch a URL as text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    send_text(client.get(url)).await
}

/// Send a prepared request and decode its JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let body = send_text(request).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Payload(e.to_string()))
}

/// Truncate a string for logging purposes.
///
/// Long payload previews are cut to at most `max` bytes with an ellipsis
/// and byte count appended. Previews come from arbitrary upstream bytes,
/// so the cut lands on the nearest char boundary at or below `max`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then performs a write test by creating
/// and immediately deleting a probe file. Run before any network fetch so
/// an unwritable archive location fails fast.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Archive directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
