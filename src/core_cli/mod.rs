pub mod command;
#[allow(clippy::module_inception)]
pub mod core_cli;
pub mod shell;

pub use self::core_cli::Cli;
