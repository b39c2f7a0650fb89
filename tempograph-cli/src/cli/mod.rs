//! Command-line interface orchestration for the instance generators.
//!
//! Offers three commands: `replay` turns a registered real-world dataset
//! into an instance under the TTL replay model, `cliques` synthesizes a
//! clustered random-graph instance pair, and `suite` batch-generates the
//! full benchmark set into one directory.

mod commands;

pub use commands::{
    Cli, CliError, CliquesArgs, Command, ExecutionSummary, InstanceReport, ReplayArgs, SuiteArgs,
    render_summary, run_cli,
};

#[cfg(test)]
mod tests;
