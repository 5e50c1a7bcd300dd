mod cli;
mod commands;
mod paths;
mod run;
mod settings;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = cli.config.as_deref();
    match cli.command {
        Some(Command::Generate(args)) => commands::generate(args, config),
        Some(Command::Inspect(args)) => commands::inspect(args, config),
        Some(Command::Survey(args)) => commands::survey(args, config),
        None => run::run(cli.run, config),
    }
}
