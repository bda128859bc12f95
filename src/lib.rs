//! Git subtrees paired with upstream remotes.
//!
//! Each subtree directory (the *prefix*) is tracked against a remote named
//! after it:
//!
//! ```text
//! vendor/lib   ->   remote vendor/lib-upstream
//! ```
//!
//! Nothing is stored besides that remote. The list of subtrees is rebuilt
//! from the `git-subtree-dir:`/`git-subtree-split:` lines `git subtree`
//! writes into its commits.

mod cleanup;
pub mod cli;
pub mod config;
pub mod error;
mod exec;
pub mod pager;
pub mod prompt;

pub use error::{Error, Result};
pub use git_subtree_log::{SubtreeRecord, write_table};

use cleanup::ScratchDir;
use git_subtree_log::SubtreeLog;
use git_upstream_remote::{UpstreamRemote, normalize_prefix};
use git2::{BranchType, ErrorCode, Repository};
use std::{
    io::{BufRead, Write},
    path::Path,
};
use tracing::info;

/// External review tool used to open pull requests.
pub const REVIEW_TOOL: &str = "gh";

pub trait Subtree {
    /// Merge `branch` of `url` into `prefix` as a single squashed commit, then
    /// register the `<prefix>-upstream` remote.
    ///
    /// An existing remote of that name is kept, so repeating the command does
    /// not fail at the registration step.
    fn subtree_add(&self, prefix: &str, url: &str, branch: &str) -> Result<()>;

    /// Return the subtrees recorded in history, most recently updated first.
    fn subtree_list(&self) -> Result<Vec<SubtreeRecord>>;

    /// Fetch `branch` from the upstream remote and merge it, squashed, into `prefix`.
    fn subtree_pull(&self, prefix: &str, branch: &str) -> Result<()>;

    /// Fetch `branch` from the upstream remote and return a recursive unified
    /// diff from its tree to the local `prefix` directory.
    ///
    /// The upstream snapshot lives in a temporary directory that is removed
    /// before this returns, whether or not it succeeds. An interrupt while it
    /// exists removes it and exits with status 130.
    fn subtree_diff(&self, prefix: &str, branch: &str) -> Result<Vec<u8>>;

    /// Split the history of `prefix` into a new local branch and return its name.
    ///
    /// Fails with [`Error::BranchExists`] without touching the repository if
    /// the branch is already there.
    fn subtree_branch(&self, prefix: &str, maybe_name: Option<&str>) -> Result<String>;

    /// Split `prefix` into `subtree-<prefix>-patch`, push it to the upstream
    /// remote and open a draft pull request there.
    fn subtree_pr(&self, prefix: &str) -> Result<()>;

    /// Ask for confirmation on `output`/`input`, then remove `prefix`, commit
    /// the removal and delete the upstream remote.
    fn subtree_rm<R: BufRead, W: Write>(&self, prefix: &str, input: R, output: W) -> Result<()>;
}

impl Subtree for Repository {
    fn subtree_add(&self, prefix: &str, url: &str, branch: &str) -> Result<()> {
        let workdir = require_workdir(self)?;
        let prefix = normalize_prefix(prefix);

        exec::run(&mut exec::git(
            workdir,
            ["subtree", "add", "--prefix", prefix, "--squash", url, branch],
        ))?;
        info!(prefix, url, branch, "added subtree");

        self.ensure_upstream_remote(prefix, url)?;
        Ok(())
    }

    fn subtree_list(&self) -> Result<Vec<SubtreeRecord>> {
        require_workdir(self)?;
        Ok(self.subtree_records()?)
    }

    fn subtree_pull(&self, prefix: &str, branch: &str) -> Result<()> {
        let workdir = require_workdir(self)?;
        let prefix = normalize_prefix(prefix);
        let remote = self.upstream_remote_name(prefix);

        exec::run(&mut exec::git(
            workdir,
            ["subtree", "pull", "--prefix", prefix, "--squash", remote.as_str(), branch],
        ))?;
        info!(prefix, %remote, branch, "pulled subtree");

        Ok(())
    }

    fn subtree_diff(&self, prefix: &str, branch: &str) -> Result<Vec<u8>> {
        let workdir = require_workdir(self)?;
        let prefix = normalize_prefix(prefix);
        let remote = self.upstream_remote_name(prefix);

        exec::run(&mut exec::git(workdir, ["fetch", remote.as_str(), branch]))?;

        let snapshot = ScratchDir::new()?;
        extract_fetch_head(workdir, snapshot.path())?;

        let mut diff = exec::command(workdir, "diff", ["-ruN"]);
        diff.arg(snapshot.path()).arg(format!("{prefix}/"));

        // 0: identical, 1: differences found
        let patch = exec::output(&mut diff, &[0, 1])?;
        snapshot.close()?;

        Ok(patch)
    }

    fn subtree_branch(&self, prefix: &str, maybe_name: Option<&str>) -> Result<String> {
        let workdir = require_workdir(self)?;
        let prefix = normalize_prefix(prefix);
        let name = maybe_name.map_or_else(|| patch_branch_name(prefix), str::to_owned);

        if branch_exists(self, &name)? {
            return Err(Error::BranchExists { name });
        }

        exec::run(&mut exec::git(
            workdir,
            ["subtree", "split", "--prefix", prefix, "--branch", name.as_str()],
        ))?;
        info!(prefix, branch = %name, "split subtree");

        Ok(name)
    }

    fn subtree_pr(&self, prefix: &str) -> Result<()> {
        let workdir = require_workdir(self)?;
        exec::require(REVIEW_TOOL)?;

        let prefix = normalize_prefix(prefix);
        let remote = self.upstream_remote_name(prefix);
        let repo_url = self
            .upstream_url(prefix)
            .ok_or_else(|| git2::Error::from_str(&format!("remote '{remote}' not found")))?;

        let branch = self.subtree_branch(prefix, None)?;

        exec::run(&mut exec::git(workdir, ["push", remote.as_str(), branch.as_str()]))?;
        exec::run(&mut exec::command(
            workdir,
            REVIEW_TOOL,
            [
                "pr",
                "create",
                "--draft",
                "--fill",
                "--head",
                branch.as_str(),
                "--repo",
                repo_url.as_str(),
            ],
        ))?;
        info!(prefix, %branch, "opened draft pull request");

        Ok(())
    }

    fn subtree_rm<R: BufRead, W: Write>(&self, prefix: &str, input: R, output: W) -> Result<()> {
        let workdir = require_workdir(self)?;
        let prefix = normalize_prefix(prefix);
        let remote = self.upstream_remote_name(prefix);

        let question = format!("Remove subtree '{prefix}' and remote '{remote}'?");
        if !prompt::confirm(input, output, &question)? {
            return Err(Error::Declined {
                prefix: prefix.to_string(),
            });
        }

        exec::run(&mut exec::git(workdir, ["rm", "-r", "-q", "--", prefix]))?;
        let message = format!("Remove subtree '{prefix}'");
        exec::run(&mut exec::git(workdir, ["commit", "-q", "-m", message.as_str()]))?;
        info!(prefix, "removed subtree");

        self.remove_upstream_remote(prefix)?;
        Ok(())
    }
}

/// Default branch name used by `branch` and `pr`.
pub fn patch_branch_name(prefix: &str) -> String {
    format!("subtree-{}-patch", normalize_prefix(prefix))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_workdir(repo: &Repository) -> Result<&Path> {
    repo.workdir().ok_or(Error::BareRepository)
}

fn branch_exists(repo: &Repository, name: &str) -> Result<bool> {
    match repo.find_branch(name, BranchType::Local) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Unpack the tree of `FETCH_HEAD` into `dest`.
fn extract_fetch_head(workdir: &Path, dest: &Path) -> Result<()> {
    let mut tar = exec::command(workdir, "tar", ["-x", "-C"]);
    tar.arg(dest);

    exec::pipe(
        &mut exec::git(workdir, ["archive", "--format=tar", "FETCH_HEAD"]),
        &mut tar,
    )
}
