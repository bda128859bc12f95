use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "git-subtrees")]
#[command(author, version, about = "Manage git subtrees paired with <prefix>-upstream remotes", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Add a subtree with squashed upstream history and register its remote
    Add {
        /// Local directory to hold the subtree
        prefix: String,

        /// Remote URL or path of the upstream repository
        url: String,

        /// Upstream branch to merge
        branch: String,
    },

    /// List subtrees recorded in history
    Ls,

    /// Fetch the upstream remote and merge it, squashed, into the subtree
    #[command(visible_alias = "update")]
    Pull {
        /// Subtree directory
        prefix: String,

        /// Upstream branch to merge
        branch: String,
    },

    /// Show differences between the upstream branch and the local subtree
    Diff {
        /// Subtree directory
        prefix: String,

        /// Upstream branch to compare against
        branch: String,
    },

    /// Split the subtree's history into a new branch
    Branch {
        /// Subtree directory
        prefix: String,

        /// Name of the branch to create [default: subtree-<prefix>-patch]
        name: Option<String>,
    },

    /// Push the split subtree upstream and open a draft pull request
    Pr {
        /// Subtree directory
        prefix: String,
    },

    /// Remove the subtree directory and its upstream remote
    Rm {
        /// Subtree directory
        prefix: String,
    },
}
