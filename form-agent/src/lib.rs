pub mod cache;
pub mod cli;
pub mod gemini;
pub mod load_config;
pub mod report;
pub mod session;

pub use cli::{run, Cli, Commands};
