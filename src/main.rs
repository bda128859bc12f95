use clap::Parser;
use git_subtrees::{
    Subtree,
    cli::{Cli, Commands},
    config::{Config, LOG_ENV},
    pager, write_table,
};
use git_upstream_remote::UpstreamRemote;
use git2 as git;
use std::{io, process::ExitCode};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli, &Config::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, config: &Config) -> git_subtrees::Result<()> {
    // Subtree prefixes are relative to the top of the working tree.
    let repo = git::Repository::discover(".")?;

    match cli.command {
        Commands::Add {
            prefix,
            url,
            branch,
        } => {
            repo.subtree_add(&prefix, &url, &branch)?;
            println!("Added subtree: {}", prefix);
            println!("  remote: {} -> {}", repo.upstream_remote_name(&prefix), url);
        }

        Commands::Ls => {
            let records = repo.subtree_list()?;
            let mut table = Vec::new();
            write_table(&mut table, &records)?;
            pager::print(&table)?;
        }

        Commands::Pull { prefix, branch } => {
            repo.subtree_pull(&prefix, &branch)?;
        }

        Commands::Diff { prefix, branch } => {
            let patch = repo.subtree_diff(&prefix, &branch)?;
            pager::page(&config.pager, &patch)?;
        }

        Commands::Branch { prefix, name } => {
            let branch = repo.subtree_branch(&prefix, name.as_deref())?;
            println!("Created branch: {}", branch);
        }

        Commands::Pr { prefix } => {
            repo.subtree_pr(&prefix)?;
        }

        Commands::Rm { prefix } => {
            repo.subtree_rm(&prefix, io::stdin().lock(), io::stderr())?;
            println!("Removed subtree: {}", prefix);
        }
    }

    Ok(())
}
