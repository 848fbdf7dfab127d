//! Line-oriented flat-file format shared by every persisted list.
//!
//! Each data line is `entry # annotation`. Lines starting with `#` are
//! comments, blank lines are skipped. Domain lists additionally treat `*`
//! prefixed entries as wildcard patterns, which are not resolvable and so
//! are excluded from the records returned here.
//!
//! Reads degrade: a missing or unreadable file is logged and treated as
//! empty so a damaged prior state never aborts a run. Writes are strict:
//! the whole file is rendered in memory first and flushed with a single
//! write, so a failure can never leave a partial file behind.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::order;
use crate::provenance::{DomainRecord, Provenance};
use crate::{CoreError, Result};

/// Annotation used when a data line carries no `# source` part.
const UNKNOWN_SOURCE: &str = "unknown source";

/// Split a data line into entry and annotation.
fn split_line(line: &str) -> (&str, &str) {
    line.split_once(" # ")
        .map_or((line, UNKNOWN_SOURCE), |(entry, ann)| {
            (entry.trim(), ann.trim())
        })
}

/// Iterate the data lines of a file, skipping comments and blanks.
///
/// Returns `None` (after a warning) when the file is missing or unreadable;
/// callers degrade to empty state.
fn read_data_lines(path: &Path) -> Option<Vec<String>> {
    if !path.exists() {
        warn!(path = %path.display(), "list file missing, treating as empty");
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Some(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from)
                .collect(),
        ),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read list file, treating as empty");
            None
        }
    }
}

/// Read a domain list (`domain # source`).
///
/// Wildcard entries are skipped (they cannot be resolved), domains are
/// lowercased, and on duplicate domains the first occurrence wins so the
/// mapper's first-write-wins attribution is deterministic in file order.
#[must_use]
pub fn read_domains(path: &Path) -> Vec<DomainRecord> {
    let Some(lines) = read_data_lines(path) else {
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    let mut records: Vec<DomainRecord> = Vec::new();
    for line in &lines {
        let (entry, source) = split_line(line);
        if entry.starts_with('*') {
            continue;
        }
        let record = DomainRecord::new(entry, source);
        if seen.insert(record.domain.clone()) {
            records.push(record);
        }
    }

    info!(path = %path.display(), domains = records.len(), "loaded domain list");
    records
}

/// Read a persisted IP list (`ip_or_cidr # provenance`).
#[must_use]
pub fn read_entries(path: &Path) -> BTreeMap<String, Provenance> {
    let Some(lines) = read_data_lines(path) else {
        return BTreeMap::new();
    };

    let mut entries = BTreeMap::new();
    for line in &lines {
        let (entry, annotation) = split_line(line);
        entries.insert(entry.to_string(), Provenance::parse(annotation));
    }

    info!(path = %path.display(), entries = entries.len(), "loaded persisted entries");
    entries
}

/// Render a persisted list to its full file content.
///
/// Pure function of its inputs so tests can assert byte-identical output;
/// [`write_entries`] supplies the current timestamp.
#[must_use]
pub fn render(title: &str, timestamp: &str, entries: &BTreeMap<String, Provenance>) -> String {
    let mut keys: Vec<String> = entries.keys().cloned().collect();
    order::sort_entries(&mut keys);

    let mut out = String::new();
    out.push_str(&format!("# {title}\n"));
    out.push_str(&format!("# Last updated: {timestamp}\n"));
    out.push_str(&format!("# Total entries: {}\n", keys.len()));
    out.push_str("# Format: <ip_or_cidr> # <provenance>\n");
    out.push_str("#\n");

    for key in &keys {
        let provenance = &entries[key];
        out.push_str(&format!("{key} # {provenance}\n"));
    }
    out
}

/// Write a persisted list, sorted and with a header.
pub fn write_entries(
    path: &Path,
    title: &str,
    entries: &BTreeMap<String, Provenance>,
) -> Result<()> {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let content = render(title, &timestamp, entries);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Write {
                path: path.display().to_string(),
                source: e,
            })?;
        }
    }

    std::fs::write(path, content).map_err(|e| CoreError::Write {
        path: path.display().to_string(),
        source: e,
    })?;

    info!(path = %path.display(), entries = entries.len(), "wrote persisted list");
    Ok(())
}
