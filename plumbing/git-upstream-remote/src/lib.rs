//! The `<prefix>-upstream` remote convention.
//!
//! Every subtree prefix is paired with a remote named after it, so that later
//! pulls, diffs and pushes only need the prefix:
//!
//! ```text
//! vendor/lib  ->  vendor/lib-upstream
//! ```

use git2::{Error, ErrorCode, Repository};
use tracing::{info, warn};

/// Suffix appended to a prefix to form its remote name.
pub const UPSTREAM_SUFFIX: &str = "-upstream";

pub trait UpstreamRemote {
    /// Return the remote name tracked for `prefix`.
    fn upstream_remote_name(&self, prefix: &str) -> String {
        remote_name(prefix)
    }

    /// Return the URL of the remote tracked for `prefix`, if one is configured.
    ///
    /// Lookup failures are treated the same as a missing remote.
    fn upstream_url(&self, prefix: &str) -> Option<String>;

    /// Register the remote for `prefix` pointing at `url`.
    ///
    /// A remote that already exists under the same name is left untouched, so
    /// calling this twice is not an error. Returns the remote name.
    fn ensure_upstream_remote(&self, prefix: &str, url: &str) -> Result<String, Error>;

    /// Delete the remote for `prefix`.
    ///
    /// Returns `false` when there was no such remote.
    fn remove_upstream_remote(&self, prefix: &str) -> Result<bool, Error>;
}

impl UpstreamRemote for Repository {
    fn upstream_url(&self, prefix: &str) -> Option<String> {
        let remote = self.find_remote(&remote_name(prefix)).ok()?;
        remote.url().map(str::to_owned)
    }

    fn ensure_upstream_remote(&self, prefix: &str, url: &str) -> Result<String, Error> {
        let name = remote_name(prefix);

        match self.remote(&name, url) {
            Ok(_) => info!(remote = %name, url, "registered upstream remote"),
            Err(e) if e.code() == ErrorCode::Exists => {
                warn!(remote = %name, "remote already exists, keeping it")
            }
            Err(e) => return Err(e),
        }

        Ok(name)
    }

    fn remove_upstream_remote(&self, prefix: &str) -> Result<bool, Error> {
        let name = remote_name(prefix);

        match self.remote_delete(&name) {
            Ok(()) => {
                info!(remote = %name, "removed upstream remote");
                Ok(true)
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                warn!(remote = %name, "no such remote, nothing to remove");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

/// Strip trailing slashes so `vendor/lib/` and `vendor/lib` name the same subtree.
pub fn normalize_prefix(prefix: &str) -> &str {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() { prefix } else { trimmed }
}

fn remote_name(prefix: &str) -> String {
    format!("{}{UPSTREAM_SUFFIX}", normalize_prefix(prefix))
}
