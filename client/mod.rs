pub mod cli_args;
pub mod demo;
pub mod formatter;
pub mod guide_client;

pub use cli_args::{CliArgs, CliCommand};
pub use formatter::OutputFormatter;
pub use guide_client::{ConnectOptions, GuideClient};
