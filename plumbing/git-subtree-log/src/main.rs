use clap::Parser;
use git_subtree_log::{SubtreeLog, write_porcelain, write_table};
use git2 as git;
use std::{io, process};

#[derive(Parser)]
#[command(name = "git-subtree-log")]
#[command(author, version, about = "List subtrees recorded in commit history", long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Fixed-width table with abbreviated hashes
    Table,
    /// Tab-separated fields with full hashes
    Porcelain,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let repo = git::Repository::discover(".")?;
    let records = repo.subtree_records()?;

    let mut out = io::stdout().lock();
    match cli.format {
        OutputFormat::Table => write_table(&mut out, &records)?,
        OutputFormat::Porcelain => write_porcelain(&mut out, &records)?,
    }

    Ok(())
}
