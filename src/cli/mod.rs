//! Command line entry points
//!
//! - `serve`: HTTP API
//! - `ask`: one-shot inference printing the answer

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

/// RAG orchestrator - retrieval-augmented workflows over LLM and vector search backends
#[derive(Parser)]
#[command(name = "rag-orchestrator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single question and exit
    Ask(ask::AskArgs),
}
