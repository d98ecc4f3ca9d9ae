//! User-facing channels other than the HTTP API.

pub mod cli;

pub use cli::{CliChannel, CliCommand, CliOutcome};
