//! Reading documents from files, stdin and cache directories.
//!
//! Two cache layouts are understood:
//! - summaries: `<dir>/<id>_anything.md` files or `<dir>/<id>/summary.txt`;
//! - transcripts: `<dir>/<id>/transcript.txt`, where `<id>` is an 11
//!   character video id.
//!
//! Results are sorted by source id so batch order never depends on the
//! directory listing order.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, warn};

use crate::summary::RawDocument;
use crate::{Result, TldwError};

/// Length of a video id in the transcript cache.
pub const VIDEO_ID_LEN: usize = 11;

/// Reads a file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    let path_buf = PathBuf::from(path);
    if !path_buf.exists() {
        Err(TldwError::FileNotFound(path_buf))
    } else {
        Ok(fs::read_to_string(&path_buf)?)
    }
}

/// Collects summary documents from a cache directory.
///
/// A document that cannot be read (e.g. not UTF-8) is logged and skipped.
pub fn discover_summaries(dir: &Path) -> Result<Vec<RawDocument>> {
    if !dir.is_dir() {
        return Err(TldwError::FileNotFound(dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        match summary_document(&path) {
            Ok(Some(doc)) => documents.push(doc),
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable summary"),
        }
    }

    documents.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    debug!(dir = %dir.display(), count = documents.len(), "discovered summaries");
    Ok(documents)
}

fn summary_document(path: &Path) -> Result<Option<RawDocument>> {
    if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Ok(None);
        };
        let id = stem.split('_').next().unwrap_or(stem);
        return Ok(Some(RawDocument::new(id, fs::read_to_string(path)?)));
    }

    if path.is_dir() {
        let summary_file = path.join("summary.txt");
        if let Some(id) = path.file_name().and_then(|s| s.to_str())
            && summary_file.is_file()
        {
            return Ok(Some(RawDocument::new(id, fs::read_to_string(&summary_file)?)));
        }
    }

    Ok(None)
}

/// A cached transcript awaiting registration in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub video_id: String,
    /// Transcript modification time in milliseconds since the Unix epoch.
    pub modified_at: i64,
}

/// Lists transcript cache entries.
pub fn discover_transcripts(dir: &Path) -> Result<Vec<TranscriptEntry>> {
    if !dir.is_dir() {
        return Err(TldwError::FileNotFound(dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !path.is_dir() || name.chars().count() != VIDEO_ID_LEN {
            continue;
        }
        let transcript = path.join("transcript.txt");
        if !transcript.is_file() {
            continue;
        }
        let modified_at = fs::metadata(&transcript)?
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        entries.push(TranscriptEntry { video_id: name.to_string(), modified_at });
    }

    entries.sort_by(|a, b| a.video_id.cmp(&b.video_id));
    Ok(entries)
}
