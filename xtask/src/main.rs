use clap::{CommandFactory, Parser, Subcommand};
use git_subtrees::cli::Cli as SubtreesCli;
use std::{fs, path::PathBuf, process};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for git-subtrees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the git-subtrees(1) man page
    Man {
        /// Output directory
        #[arg(default_value = "target/man")]
        out_dir: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Man { out_dir } => {
            fs::create_dir_all(&out_dir)?;

            let cmd = SubtreesCli::command();
            let path = out_dir.join(format!("{}.1", cmd.get_name()));

            let mut buf = Vec::new();
            clap_mangen::Man::new(cmd).render(&mut buf)?;
            fs::write(&path, buf)?;

            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
