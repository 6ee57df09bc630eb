mod cli_args;
mod commands;
mod walker;

use clap::Parser;
use cli_args::{Cli, Commands};
use repocontext_core::types::RepoContextError;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { path } => commands::init::run(&path),
        Commands::Build { path } => commands::build::run(&path),
        Commands::Query { name, path } => commands::query::run(&path, &name),
    };

    if let Err(e) = result {
        eprintln!("repocontext: error: {e}");
        std::process::exit(exit_code_for(&e));
    }
}

fn exit_code_for(err: &RepoContextError) -> i32 {
    match err {
        RepoContextError::Schema(_) => 2,
        RepoContextError::Integrity(_) => 3,
        RepoContextError::Cancelled => 130,
        _ => 1,
    }
}
