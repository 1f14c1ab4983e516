// ABOUTME: Library half of the copilot binary
// ABOUTME: Provider wiring, input resolution, subcommand execution, diagnostics and the server

pub mod bootstrap;
pub mod commands;
pub mod diagnostics;
pub mod input;
pub mod samples;
pub mod server;

pub use bootstrap::{build_pipeline, build_provider};
pub use commands::Runner;
pub use server::run_server;
