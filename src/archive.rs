//! Rolling brief archive.
//!
//! The archive is the sole durable artifact: a pretty-printed JSON array of
//! [`BriefRecord`], unique by date, sorted newest-first, capped at
//! [`MAX_ENTRIES`]. A separate presentation layer renders it, so those
//! invariants hold after every write.
//!
//! A missing or corrupt file loads as an empty archive; the process is
//! idempotent and rerunnable, so losing a corrupt history beats aborting
//! the run. Writes go to a temp file first and are renamed into place,
//! which keeps a concurrent second run from leaving a half-written file.

use crate::models::BriefRecord;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Retention cap: the archive keeps the 30 most recent distinct dates.
pub const MAX_ENTRIES: usize = 30;

/// Load the persisted archive; a missing or corrupt file yields an empty one.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_archive(path: &Path) -> Vec<BriefRecord> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            info!(error = %e, "No existing archive; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Archive is not valid JSON; starting empty");
            Vec::new()
        }
    }
}

/// Merge a new brief into the archive.
///
/// Any existing entry for the same date is replaced whole, entries are
/// sorted descending by date (lexicographic works for `YYYY-MM-DD`), and
/// the result is truncated to [`MAX_ENTRIES`]. Merging the same record
/// twice yields the same archive as merging it once.
pub fn merge_brief(archive: Vec<BriefRecord>, brief: BriefRecord) -> Vec<BriefRecord> {
    std::iter::once(brief)
        .chain(archive)
        .unique_by(|entry| entry.date.clone())
        .sorted_by(|a, b| b.date.cmp(&a.date))
        .take(MAX_ENTRIES)
        .collect()
}

/// Persist the archive: pretty-printed UTF-8 JSON with a trailing newline,
/// written to a temp file and renamed into place.
#[instrument(level = "info", skip_all, fields(path = %path.display(), entries = archive.len()))]
pub async fn store_archive(path: &Path, archive: &[BriefRecord]) -> Result<(), Box<dyn Error>> {
    let mut json = serde_json::to_string_pretty(archive)?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).await?;
    fs::rename(&tmp_path, path).await?;

    info!("Wrote brief archive");
    Ok(())
}
