mod show;

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::args::GlobalArgs;

pub trait Command {
    async fn execute(&self, args: &GlobalArgs) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum WsnavCommand {
    /// Print the visible tree of a workspace loaded from a JSON file
    Show(self::show::Show),
}

impl Command for WsnavCommand {
    async fn execute(&self, args: &GlobalArgs) -> Result<ExitCode> {
        match self {
            Self::Show(command) => command.execute(args).await,
        }
    }
}
