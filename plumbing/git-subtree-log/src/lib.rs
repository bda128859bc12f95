//! Reconstruct the list of subtrees from commit history.
//!
//! `git subtree` records two trailer-like lines in the message of every
//! squash/merge commit it creates:
//!
//! ```text
//! git-subtree-dir: vendor/lib
//! git-subtree-split: 4130409eb0c3c5e8b5f0ad9d7b1d2e1f5c6a7b8c
//! ```
//!
//! The newest such commit for a directory describes the current state of that
//! subtree. Nothing else is stored anywhere, so the listing is rebuilt from
//! history each time.

mod table;

pub use table::{write_porcelain, write_table};

use git_upstream_remote::UpstreamRemote;
use git2::{Error, ErrorCode, Repository, Sort};
use std::{
    collections::HashSet,
    path::{Component, Path},
};

pub const DIR_MARKER: &str = "git-subtree-dir:";
pub const SPLIT_MARKER: &str = "git-subtree-split:";

/// Placeholder shown when a prefix has no `<prefix>-upstream` remote.
pub const UNKNOWN_REMOTE: &str = "unknown";

/// Number of hash characters shown in listings.
pub const SHORT_HASH_LEN: usize = 10;

/// A single commit as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub message: String,
}

/// The most recent merge/split boundary known for one subtree prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeRecord {
    pub prefix: String,
    pub upstream_commit: String,
    pub local_commit: String,
    pub remote_url: String,
}

pub trait SubtreeLog {
    /// Return every commit reachable from `HEAD`, newest first.
    fn scan_history(&self) -> Result<Vec<LogEntry>, Error>;

    /// Fill in `remote_url` for each record from its upstream remote.
    fn resolve_remotes(&self, records: &mut [SubtreeRecord]);

    /// Return one record per subtree that still exists in the working tree,
    /// most recently updated first.
    fn subtree_records(&self) -> Result<Vec<SubtreeRecord>, Error>;
}

impl SubtreeLog for Repository {
    fn scan_history(&self) -> Result<Vec<LogEntry>, Error> {
        // An unborn HEAD only surfaces as a generic error from the revwalk.
        match self.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        let mut revwalk = self.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        revwalk.push_head()?;

        let mut entries = Vec::new();
        for oid in revwalk {
            let commit = self.find_commit(oid?)?;
            entries.push(LogEntry {
                hash: commit.id().to_string(),
                message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            });
        }

        Ok(entries)
    }

    fn resolve_remotes(&self, records: &mut [SubtreeRecord]) {
        for record in records {
            record.remote_url = self
                .upstream_url(&record.prefix)
                .unwrap_or_else(|| UNKNOWN_REMOTE.to_string());
        }
    }

    fn subtree_records(&self) -> Result<Vec<SubtreeRecord>, Error> {
        let workdir = self
            .workdir()
            .ok_or_else(|| Error::from_str("Repository has no working directory"))?;

        let history = self.scan_history()?;
        let mut records = retain_existing(parse_history(&history), workdir);
        self.resolve_remotes(&mut records);

        Ok(records)
    }
}

/// Extract the subtree metadata carried by one commit, if any.
///
/// Both markers must be present with non-empty values; anything else is not
/// a subtree commit as far as the listing is concerned.
pub fn parse_entry(entry: &LogEntry) -> Option<SubtreeRecord> {
    let mut prefix = None;
    let mut split = None;

    for line in entry.message.lines() {
        let line = line.trim_start();
        if let Some(v) = line.strip_prefix(DIR_MARKER) {
            prefix.get_or_insert_with(|| v.trim());
        } else if let Some(v) = line.strip_prefix(SPLIT_MARKER) {
            split.get_or_insert_with(|| v.trim());
        }
    }

    let prefix = prefix.filter(|p| !p.is_empty())?;
    let split = split.filter(|s| !s.is_empty())?;

    Some(SubtreeRecord {
        prefix: prefix.to_string(),
        upstream_commit: split.to_string(),
        local_commit: entry.hash.clone(),
        remote_url: UNKNOWN_REMOTE.to_string(),
    })
}

/// Keep the first record seen for each prefix, preserving order.
pub fn dedup_by_prefix(records: impl IntoIterator<Item = SubtreeRecord>) -> Vec<SubtreeRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.prefix.clone()))
        .collect()
}

/// Drop records whose prefix is no longer a directory under `workdir`.
///
/// Prefixes that would resolve outside `workdir` are dropped as well.
pub fn retain_existing(mut records: Vec<SubtreeRecord>, workdir: &Path) -> Vec<SubtreeRecord> {
    records.retain(|r| is_relative_prefix(&r.prefix) && workdir.join(&r.prefix).is_dir());
    records
}

/// Return `true` if `prefix` names a path inside the working tree.
pub fn is_relative_prefix(prefix: &str) -> bool {
    Path::new(prefix)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Parse newest-first history into one record per prefix.
///
/// Pure: touches neither the repository nor the filesystem.
pub fn parse_history(entries: &[LogEntry]) -> Vec<SubtreeRecord> {
    dedup_by_prefix(entries.iter().filter_map(parse_entry))
}

/// Abbreviate a hash for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}
