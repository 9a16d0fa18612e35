use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use tube_sync::DirectoryUploadReport;

/// Output of `missing-backups`: a header line, then one UUID per line.
///
/// The reconciler returns an unordered set; UUIDs are sorted here only so
/// repeated runs diff cleanly.
pub fn format_missing_backups(bucket: &str, missing: &HashSet<String>) -> String {
    let mut uuids: Vec<&String> = missing.iter().collect();
    uuids.sort();

    let mut out = format!(
        "{} video(s) without an original in bucket '{}':\n",
        uuids.len(),
        bucket
    );
    for uuid in uuids {
        out.push_str(uuid);
        out.push('\n');
    }
    out
}

/// Output of `upload-dir`: `<uuid>\t<path>` per file, skipped files included.
pub fn format_directory_report(report: &DirectoryUploadReport) -> String {
    let mut out = String::new();
    for outcome in &report.uploaded {
        out.push_str(&format!("{}\t{}\n", outcome.uuid, outcome.path.display()));
    }
    for (path, uuid) in &report.skipped {
        out.push_str(&format!("{}\t{}\t(already uploaded)\n", uuid, path.display()));
    }
    out
}

/// Parse `--published-at`: RFC 3339, or a bare date taken as midnight UTC.
pub fn parse_published_at(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", value))
}

/// Initialize tracing for the CLI.
///
/// Logs go to stderr; stdout carries command output only.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
