mod error;
mod generate;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "sfdelta")]
#[command(about = "Generate a Salesforce deployment package from the changes between two git revisions", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to read the revisions from
    #[arg(long, short = 'r', default_value = ".")]
    repo: PathBuf,

    /// Revision the delta starts from
    #[arg(long, short = 'f')]
    from: String,

    /// Revision the delta ends at
    #[arg(long, short = 't', default_value = "HEAD")]
    to: String,

    /// Directory receiving the manifests and copied sources
    #[arg(long, short = 'o', default_value = "output")]
    output: PathBuf,

    /// Copy the changed sources next to the manifests
    #[arg(long, short = 'd')]
    generate_delta: bool,

    /// Only consider changes below this directory (repeatable)
    #[arg(long, short = 's')]
    source: Vec<String>,

    /// API version written into the manifests
    #[arg(long, short = 'a')]
    api_version: Option<String>,

    /// Glob of paths to leave out entirely (repeatable)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Glob of paths whose deletions are left out (repeatable)
    #[arg(long)]
    ignore_destructive_pattern: Vec<String>,

    /// JSON file with metadata type overrides
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Config file (default: sfdelta.toml at the repository root)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON run summary instead of text
    #[arg(long)]
    json: bool,

    /// Log debug output to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match generate::run(&cli) {
        Ok(delta) => {
            if cli.json {
                println!("{}", output::success_json(&delta, &cli.output));
            } else {
                print!("{}", output::format_text(&delta, &cli.output));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                println!("{}", output::failure_json(&e, &cli.output));
            } else {
                print_error(&e);
            }
            ExitCode::FAILURE
        }
    }
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
