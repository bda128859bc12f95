//! Integration tests for the `Subtree` trait methods on `Repository`.

use git_subtrees::{Error, Subtree};
use git2::{BranchType, Repository, Signature};
use std::{fs, path::Path, process::Command};
use tempfile::TempDir;

fn setup_repo() -> (Repository, TempDir) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test").unwrap();
    config.set_str("user.email", "test@test").unwrap();
    // `git subtree pull` merges without a message; never open an editor.
    config.set_str("core.editor", "true").unwrap();

    commit_all(&repo, "init");

    (repo, dir)
}

/// Stage everything in the working tree and commit it on `HEAD`.
fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let sig = Signature::now("Test", "test@test").unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parents: Vec<git2::Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

fn subtree_message(prefix: &str, split: &str) -> String {
    format!("Squashed '{prefix}/' changes\n\ngit-subtree-dir: {prefix}\ngit-subtree-split: {split}\n")
}

fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn local_branch_count(repo: &Repository) -> usize {
    repo.branches(Some(BranchType::Local)).unwrap().count()
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_is_empty_without_subtree_commits() {
    let (repo, _dir) = setup_repo();
    assert!(repo.subtree_list().unwrap().is_empty());
}

#[test]
fn list_keeps_most_recent_record_per_prefix() {
    let (repo, dir) = setup_repo();
    write_file(dir.path(), "x/file.txt", "x");

    commit_all(&repo, &subtree_message("x", "h1"));
    commit_all(&repo, &subtree_message("x", "h2"));
    let newest = commit_all(&repo, &subtree_message("x", "h3"));

    let records = repo.subtree_list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].prefix, "x");
    assert_eq!(records[0].upstream_commit, "h3");
    assert_eq!(records[0].local_commit, newest.to_string());
}

#[test]
fn list_drops_removed_subtrees() {
    let (repo, dir) = setup_repo();
    write_file(dir.path(), "kept/file.txt", "k");

    commit_all(&repo, &subtree_message("gone", "h1"));
    commit_all(&repo, &subtree_message("kept", "h2"));

    let prefixes: Vec<_> = repo
        .subtree_list()
        .unwrap()
        .into_iter()
        .map(|r| r.prefix)
        .collect();
    assert_eq!(prefixes, ["kept"]);
}

#[test]
fn list_reports_unknown_remote() {
    let (repo, dir) = setup_repo();
    write_file(dir.path(), "z/file.txt", "z");
    write_file(dir.path(), "w/file.txt", "w");

    commit_all(&repo, &subtree_message("z", "hz"));
    commit_all(&repo, &subtree_message("w", "hw"));
    repo.remote("w-upstream", "https://example.com/w.git").unwrap();

    let records = repo.subtree_list().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].prefix, "w");
    assert_eq!(records[0].remote_url, "https://example.com/w.git");
    assert_eq!(records[1].prefix, "z");
    assert_eq!(records[1].remote_url, "unknown");
}

#[test]
fn list_ignores_malformed_commits() {
    let (repo, dir) = setup_repo();
    write_file(dir.path(), "m/file.txt", "m");

    commit_all(&repo, "git-subtree-dir: m\n");
    commit_all(&repo, "just a regular commit\n");

    assert!(repo.subtree_list().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// branch
// ---------------------------------------------------------------------------

#[test]
fn branch_refuses_existing_default_name() {
    let (repo, _dir) = setup_repo();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("subtree-lib-patch", &head, false).unwrap();
    let before = local_branch_count(&repo);

    let err = repo.subtree_branch("lib", None).unwrap_err();
    assert!(matches!(err, Error::BranchExists { ref name } if name == "subtree-lib-patch"));
    assert_eq!(local_branch_count(&repo), before);
}

#[test]
fn branch_refuses_existing_custom_name() {
    let (repo, _dir) = setup_repo();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch("taken", &head, false).unwrap();

    let err = repo.subtree_branch("lib/", Some("taken")).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

#[test]
fn rm_declined_changes_nothing() {
    let (repo, dir) = setup_repo();
    write_file(dir.path(), "lib/file.txt", "lib");
    let head = commit_all(&repo, "add lib");
    repo.remote("lib-upstream", "https://example.com/lib.git").unwrap();

    for answer in ["n\n", "yes\n", "\n", ""] {
        let mut prompt = Vec::new();
        let err = repo
            .subtree_rm("lib", answer.as_bytes(), &mut prompt)
            .unwrap_err();

        assert!(matches!(err, Error::Declined { .. }));
        assert!(String::from_utf8(prompt).unwrap().contains("[y/N]"));
    }

    assert!(dir.path().join("lib/file.txt").exists());
    assert!(repo.find_remote("lib-upstream").is_ok());
    assert_eq!(repo.head().unwrap().target(), Some(head));
}

// ---------------------------------------------------------------------------
// bare repository
// ---------------------------------------------------------------------------

#[test]
fn bare_repo_rejects_all_operations() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init_bare(dir.path()).unwrap();

    let bare = |r: git_subtrees::Result<()>| matches!(r, Err(Error::BareRepository));

    assert!(bare(repo.subtree_add("lib", "https://example.com/lib.git", "main")));
    assert!(bare(repo.subtree_list().map(drop)));
    assert!(bare(repo.subtree_pull("lib", "main")));
    assert!(bare(repo.subtree_diff("lib", "main").map(drop)));
    assert!(bare(repo.subtree_branch("lib", None).map(drop)));
    assert!(bare(repo.subtree_pr("lib")));
    assert!(bare(repo.subtree_rm("lib", "y\n".as_bytes(), Vec::new())));
}

// ---------------------------------------------------------------------------
// full round trip through `git subtree`
// ---------------------------------------------------------------------------

/// `git subtree` ships separately on some systems.
fn has_git_subtree() -> bool {
    Command::new("git")
        .args(["subtree", "-h"])
        .output()
        .map(|out| out.status.code() == Some(129))
        .unwrap_or(false)
}

#[test]
fn add_pull_diff_branch_rm_round_trip() {
    if !has_git_subtree() {
        eprintln!("git subtree not available, skipping");
        return;
    }

    let (upstream, up_dir) = setup_repo();
    write_file(up_dir.path(), "a.txt", "one\n");
    let first = commit_all(&upstream, "first");
    let branch = upstream.head().unwrap().shorthand().unwrap().to_string();
    let url = up_dir.path().to_str().unwrap().to_string();

    let (repo, dir) = setup_repo();

    // add
    repo.subtree_add("lib", &url, &branch).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("lib/a.txt")).unwrap(),
        "one\n"
    );
    assert_eq!(
        repo.find_remote("lib-upstream").unwrap().url(),
        Some(url.as_str())
    );

    let records = repo.subtree_list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].upstream_commit, first.to_string());
    assert_eq!(records[0].remote_url, url);

    // Adding again fails in git, not at remote registration.
    let err = repo.subtree_add("lib", &url, &branch).unwrap_err();
    assert!(matches!(err, Error::CommandFailed { .. }));
    assert!(repo.find_remote("lib-upstream").is_ok());

    // diff
    write_file(up_dir.path(), "a.txt", "one\ntwo\n");
    let second = commit_all(&upstream, "second");

    let patch = String::from_utf8(repo.subtree_diff("lib", &branch).unwrap()).unwrap();
    assert!(patch.contains("a.txt"));
    assert!(patch.contains("two"));

    // pull
    repo.subtree_pull("lib", &branch).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("lib/a.txt")).unwrap(),
        "one\ntwo\n"
    );
    let records = repo.subtree_list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].upstream_commit, second.to_string());

    let patch = repo.subtree_diff("lib", &branch).unwrap();
    assert!(patch.is_empty());

    // branch
    assert_eq!(repo.subtree_branch("lib", None).unwrap(), "subtree-lib-patch");
    assert!(
        repo.find_branch("subtree-lib-patch", BranchType::Local)
            .is_ok()
    );
    assert!(matches!(
        repo.subtree_branch("lib", None),
        Err(Error::BranchExists { .. })
    ));

    // rm
    repo.subtree_rm("lib", "y\n".as_bytes(), Vec::new()).unwrap();
    assert!(!dir.path().join("lib").exists());
    assert!(repo.find_remote("lib-upstream").is_err());
    assert!(repo.subtree_list().unwrap().is_empty());
}
