use crate::config::AuditConfig;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use codeflow_protocol::{Analysis, AuditRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const LOG_PREFIX: &str = "log_";
const LOG_EXTENSION: &str = ".json";
const TRUNCATION_MARKER: &str = "...";

/// Directory of pretty-printed JSON records, one file per generation.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
    max_code_chars: usize,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>, max_code_chars: usize) -> Self {
        Self {
            dir: dir.into(),
            max_code_chars,
        }
    }

    /// `None` when auditing is disabled.
    pub fn from_config(config: &AuditConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(&config.dir, config.max_code_chars))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a record stamped with the current time.
    pub fn record(
        &self,
        code: &str,
        svg_url: &str,
        mermaid_code: &str,
        analysis: &Analysis,
    ) -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            code: truncate_code(code, self.max_code_chars),
            language: analysis.language.clone(),
            svg_url: svg_url.to_string(),
            mermaid_code: mermaid_code.to_string(),
            analysis: analysis.clone(),
        }
    }

    /// Write `record` to a fresh file and return its path.
    ///
    /// Never overwrites: when the millisecond-stamped name is taken a
    /// numeric suffix is appended.
    pub async fn append(&self, record: &AuditRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(record)?;

        let stamp = file_stamp(record);
        let mut suffix = 0u32;
        loop {
            let path = self.dir.join(file_name(&stamp, suffix));
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&bytes).await?;
                    file.flush().await?;
                    log::debug!("Audit record written to {}", path.display());
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Up to `limit` records, newest first. Unreadable files are skipped.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let mut names = match self.list_names().await {
            Ok(names) => names,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        names.sort_by(|a, b| b.1.cmp(&a.1));

        let mut records = Vec::new();
        for (name, _) in names {
            if records.len() >= limit {
                break;
            }
            let path = self.dir.join(&name);
            match read_record(&path).await {
                Ok(record) => records.push(record),
                Err(err) => log::warn!("Skipping unreadable audit file {}: {err}", path.display()),
            }
        }
        Ok(records)
    }

    pub async fn latest(&self) -> Result<Option<AuditRecord>> {
        Ok(self.recent(1).await?.into_iter().next())
    }

    async fn list_names(&self) -> std::io::Result<Vec<(String, (String, u32))>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(key) = parse_file_name(&name) {
                names.push((name, key));
            }
        }
        Ok(names)
    }
}

async fn read_record(path: &Path) -> Result<AuditRecord> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn truncate_code(code: &str, max_chars: usize) -> String {
    match code.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &code[..cut]),
        None => code.to_string(),
    }
}

fn file_stamp(record: &AuditRecord) -> String {
    let at = DateTime::parse_from_rfc3339(&record.timestamp)
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    at.format("%Y%m%d_%H%M%S_%3f").to_string()
}

fn file_name(stamp: &str, suffix: u32) -> String {
    if suffix == 0 {
        format!("{LOG_PREFIX}{stamp}{LOG_EXTENSION}")
    } else {
        format!("{LOG_PREFIX}{stamp}_{suffix}{LOG_EXTENSION}")
    }
}

/// Sort key `(stamp, suffix)` for names written by [`AuditLog::append`].
///
/// Second-resolution names (`log_YYYYmmdd_HHMMSS.json`) are accepted too.
fn parse_file_name(name: &str) -> Option<(String, u32)> {
    let stem = name.strip_prefix(LOG_PREFIX)?.strip_suffix(LOG_EXTENSION)?;
    let parts: Vec<&str> = stem.split('_').collect();
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !parts.iter().all(|p| all_digits(p)) {
        return None;
    }
    match parts.as_slice() {
        [date, time] => Some((format!("{date}_{time}_000"), 0)),
        [date, time, millis] => Some((format!("{date}_{time}_{millis}"), 0)),
        [date, time, millis, suffix] => {
            Some((format!("{date}_{time}_{millis}"), suffix.parse().ok()?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analysis() -> Analysis {
        Analysis {
            total_complexity: 3,
            function_count: 1,
            total_lines: 4,
            chunks: 1,
            language: "python".into(),
        }
    }

    #[test]
    fn test_truncate_code() {
        assert_eq!(truncate_code("short", 500), "short");
        assert_eq!(truncate_code("abcdef", 3), "abc...");
        assert_eq!(truncate_code("ääää", 2), "ää...");
        assert_eq!(truncate_code("abc", 3), "abc");
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("log_20260102_030405_006.json"),
            Some(("20260102_030405_006".into(), 0))
        );
        assert_eq!(
            parse_file_name("log_20260102_030405_006_12.json"),
            Some(("20260102_030405_006".into(), 12))
        );
        assert_eq!(
            parse_file_name("log_20260102_030405.json"),
            Some(("20260102_030405_000".into(), 0))
        );
        assert_eq!(parse_file_name("log_notes.json"), None);
        assert_eq!(parse_file_name("readme.md"), None);
    }

    #[tokio::test]
    async fn test_same_millisecond_does_not_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path(), 500);
        let mut record = log.record("x = 1", "url", "graph TD", &analysis());
        record.timestamp = "2026-01-02T03:04:05.006Z".into();

        let first = log.append(&record).await.unwrap();
        record.mermaid_code = "graph LR".into();
        let second = log.append(&record).await.unwrap();

        assert_ne!(first, second);
        assert!(second.ends_with("log_20260102_030405_006_1.json"));

        let recent = log.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].mermaid_code, "graph LR");
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("absent"), 500);
        assert!(log.recent(5).await.unwrap().is_empty());
        assert!(log.latest().await.unwrap().is_none());
    }
}
