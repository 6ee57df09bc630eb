use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "repocontext", about = "Repository context index for LLM prompt assembly")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .repocontext/ with an empty manifest and schema.
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Walk, parse, resolve the call graph, chunk, and persist.
    Build {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Look up a symbol by name.
    Query {
        #[arg(long)]
        name: String,
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}
