pub mod cli;
pub mod load_config;
pub mod local_content;

pub use cli::{run, Cli, Commands};
