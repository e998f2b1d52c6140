use super::super::args::{Cli, Command};
use crate::exit_codes::SUCCESS;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Ports(args) => super::ports::run(args),
        Command::Stats(args) => super::stats::run(args),
        Command::Kill(args) => super::kill::run(args),
        Command::Inspect(args) => super::inspect::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
