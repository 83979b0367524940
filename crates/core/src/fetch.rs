//! Video metadata lookup.
//!
//! The core never depends on metadata being available: a [`MetadataFetcher`]
//! answers `None` for anything that goes wrong (missing binary, timeout,
//! non-zero exit, unparsable output) and logs the reason.

use std::future::Future;
use std::path::PathBuf;

use serde_json::Value;

use crate::Result;
use crate::store::{VideoRecord, count_from_value};

const UNKNOWN: &str = "Unknown";

/// Metadata for one video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    /// Seconds.
    pub duration: u64,
    pub view_count: u64,
    pub like_count: u64,
}

impl VideoMetadata {
    /// Parses the JSON document printed by `yt-dlp -j`.
    ///
    /// Missing fields fall back to `Unknown` / 0; `channel` falls back to
    /// `uploader` first.
    pub fn from_ytdlp_json(json: &str) -> Result<Self> {
        let data: Value = serde_json::from_str(json)?;
        let text = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
        let count = |key: &str| data.get(key).and_then(count_from_value).unwrap_or(0);

        Ok(Self {
            title: text("title").unwrap_or_else(|| UNKNOWN.to_string()),
            channel: text("channel")
                .or_else(|| text("uploader"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            duration: count("duration"),
            view_count: count("view_count"),
            like_count: count("like_count"),
        })
    }

    /// Builds a fresh store record with no summary.
    pub fn into_record(self, id: &str, analyzed_at: i64) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: self.title,
            channel: self.channel,
            duration: self.duration,
            view_count: self.view_count,
            like_count: self.like_count,
            insights_count: 0,
            analyzed_at,
            ..Default::default()
        }
    }
}

/// Source of video metadata.
pub trait MetadataFetcher {
    /// Looks up a video; `None` means "unavailable".
    fn fetch(&self, video_id: &str) -> impl Future<Output = Option<VideoMetadata>> + Send;
}

/// Settings for the yt-dlp fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Executable to run.
    pub binary: String,
    /// Optional Netscape cookies file passed with `--cookies`.
    pub cookies: Option<PathBuf>,
    /// Per-video timeout in seconds.
    pub timeout: u64,
    /// Pause between consecutive lookups in milliseconds.
    pub delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { binary: "yt-dlp".to_string(), cookies: None, timeout: 30, delay_ms: 1000 }
    }
}

#[cfg(feature = "fetch")]
pub use ytdlp::YtDlpFetcher;

#[cfg(feature = "fetch")]
mod ytdlp {
    use std::time::Duration;

    use tokio::process::Command;
    use tracing::{debug, warn};

    use super::{FetchConfig, MetadataFetcher, VideoMetadata};

    /// Fetches metadata by running `yt-dlp -j https://youtu.be/<id>`.
    #[derive(Debug, Clone, Default)]
    pub struct YtDlpFetcher {
        config: FetchConfig,
    }

    impl YtDlpFetcher {
        pub fn new(config: FetchConfig) -> Self {
            Self { config }
        }

        pub fn config(&self) -> &FetchConfig {
            &self.config
        }

        fn command(&self, video_id: &str) -> Command {
            let mut cmd = Command::new(&self.config.binary);
            if let Some(cookies) = &self.config.cookies {
                cmd.arg("--cookies").arg(cookies);
            }
            cmd.arg("-j").arg(format!("https://youtu.be/{}", video_id)).kill_on_drop(true);
            cmd
        }
    }

    impl MetadataFetcher for YtDlpFetcher {
        async fn fetch(&self, video_id: &str) -> Option<VideoMetadata> {
            let timeout = self.config.timeout;
            debug!(video_id, binary = %self.config.binary, "fetching metadata");

            let output = match tokio::time::timeout(Duration::from_secs(timeout), self.command(video_id).output()).await
            {
                Err(_) => {
                    warn!(video_id, timeout, "metadata fetch timed out");
                    return None;
                }
                Ok(Err(e)) => {
                    warn!(video_id, error = %e, "failed to run metadata fetcher");
                    return None;
                }
                Ok(Ok(output)) => output,
            };

            if !output.status.success() {
                warn!(video_id, status = ?output.status.code(), "metadata fetcher exited with failure");
                return None;
            }

            match VideoMetadata::from_ytdlp_json(&String::from_utf8_lossy(&output.stdout)) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!(video_id, error = %e, "unparsable metadata output");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.binary, "yt-dlp");
        assert_eq!(config.delay_ms, 1000);
    }

    #[test]
    fn test_parse_ytdlp_output() {
        let json = r#"{"title": "Rockets", "uploader": "Space Channel", "duration": 612.0, "view_count": 1200, "like_count": null}"#;
        let metadata = VideoMetadata::from_ytdlp_json(json).unwrap();
        assert_eq!(metadata.title, "Rockets");
        assert_eq!(metadata.channel, "Space Channel");
        assert_eq!(metadata.duration, 612);
        assert_eq!(metadata.view_count, 1200);
        assert_eq!(metadata.like_count, 0);
    }

    #[test]
    fn test_parse_ytdlp_defaults() {
        let metadata = VideoMetadata::from_ytdlp_json("{}").unwrap();
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.channel, "Unknown");
    }

    #[test]
    fn test_parse_ytdlp_invalid_json() {
        assert!(VideoMetadata::from_ytdlp_json("not json").is_err());
    }

    #[test]
    fn test_into_record() {
        let metadata = VideoMetadata { title: "T".into(), channel: "C".into(), duration: 5, ..Default::default() };
        let record = metadata.into_record("abc", 42);
        assert_eq!(record.id, "abc");
        assert_eq!(record.analyzed_at, 42);
        assert!(record.summary.is_none());
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_missing_binary_is_unavailable() {
        let fetcher = YtDlpFetcher::new(FetchConfig {
            binary: "/nonexistent/yt-dlp-binary".to_string(),
            timeout: 5,
            ..Default::default()
        });
        let result = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetcher.fetch("dQw4w9WgXcQ"))
        })
        .join()
        .unwrap();
        assert_eq!(result, None);
    }
}
