use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a source file
    Run {
        /// Path to the source file
        file: PathBuf,

        /// Grammar-description file to load alongside the program
        #[arg(long)]
        grammar: Option<PathBuf>,
    },

    /// Check a source file for lex and syntax errors
    Check {
        /// Path to the source file to check
        file: PathBuf,

        /// Grammar-description file to load alongside the program
        #[arg(long)]
        grammar: Option<PathBuf>,
    },

    /// Start an interactive REPL session
    Repl,
}
